//! Wrapper configuration
//!
//! Two layers:
//! 1. [`DebounceOptions`] / [`Settings`] - what the engine runs with
//! 2. [`RateConfig`] - TOML file sections for hosts that configure limiters
//!    from disk, with lenient duration coercion

use crate::throttle::ThrottleOptions;
use crate::{Error, Result};
use serde::{Deserialize, Deserializer};
use std::path::Path;
use std::time::Duration;

/// Caller-facing debounce options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceOptions {
    /// Invoke on the leading edge of a burst (default: false)
    pub leading: bool,
    /// Invoke on the trailing edge of a burst (default: true)
    pub trailing: bool,
    /// Longest a burst may suppress invocation (default: unbounded)
    pub max_wait: Option<Duration>,
}

impl Default for DebounceOptions {
    fn default() -> Self {
        Self {
            leading: false,
            trailing: true,
            max_wait: None,
        }
    }
}

/// Resolved, immutable engine settings
///
/// All durations are whole milliseconds to match the engine clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Quiet period before a trailing invocation
    pub wait_ms: i64,
    pub leading: bool,
    pub trailing: bool,
    /// Max-wait, already clamped to be at least `wait_ms`
    pub max_wait_ms: Option<i64>,
    /// Timers run on frame ticks instead of fixed delays
    pub frame_scheduled: bool,
}

impl Settings {
    /// Resolve options against the supplied wait
    ///
    /// An absent wait counts as zero here; whether it was absent only matters
    /// for scheduler selection, which the caller passes in as `frame_scheduled`.
    pub fn resolve(wait: Option<Duration>, options: &DebounceOptions, frame_scheduled: bool) -> Self {
        let wait_ms = wait.map(duration_ms).unwrap_or(0);
        Self {
            wait_ms,
            leading: options.leading,
            trailing: options.trailing,
            max_wait_ms: options.max_wait.map(|max| duration_ms(max).max(wait_ms)),
            frame_scheduled,
        }
    }
}

fn duration_ms(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

/// Coerce a loosely typed config value to a non-negative millisecond count
///
/// Numbers are clamped at zero (fractions truncated), numeric strings are
/// parsed, and anything else becomes zero.
pub fn coerce_ms(value: &toml::Value) -> u64 {
    match value {
        toml::Value::Integer(n) => (*n).max(0) as u64,
        toml::Value::Float(f) => float_ms(*f),
        toml::Value::String(s) => s.trim().parse::<f64>().map(float_ms).unwrap_or(0),
        _ => 0,
    }
}

fn float_ms(f: f64) -> u64 {
    if f.is_finite() && f > 0.0 {
        f as u64
    } else {
        0
    }
}

fn lenient_ms<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<toml::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(coerce_ms))
}

fn default_true() -> bool {
    true
}

fn default_frame_interval_ms() -> u64 {
    16
}

/// Rate limiter configuration file
///
/// ```toml
/// [debounce]
/// wait_ms = 200
/// leading = false
/// trailing = true
/// max_wait_ms = 1000
///
/// [throttle]
/// wait_ms = 100
///
/// [frames]
/// interval_ms = 16
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RateConfig {
    #[serde(default)]
    pub debounce: DebounceSection,
    #[serde(default)]
    pub throttle: ThrottleSection,
    #[serde(default)]
    pub frames: FrameSection,
}

/// `[debounce]` table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DebounceSection {
    /// Absent means "no wait supplied", which allows frame scheduling
    #[serde(default, deserialize_with = "lenient_ms")]
    pub wait_ms: Option<u64>,
    #[serde(default)]
    pub leading: bool,
    #[serde(default = "default_true")]
    pub trailing: bool,
    #[serde(default, deserialize_with = "lenient_ms")]
    pub max_wait_ms: Option<u64>,
}

impl Default for DebounceSection {
    fn default() -> Self {
        Self {
            wait_ms: None,
            leading: false,
            trailing: true,
            max_wait_ms: None,
        }
    }
}

impl DebounceSection {
    pub fn wait(&self) -> Option<Duration> {
        self.wait_ms.map(Duration::from_millis)
    }

    pub fn options(&self) -> DebounceOptions {
        DebounceOptions {
            leading: self.leading,
            trailing: self.trailing,
            max_wait: self.max_wait_ms.map(Duration::from_millis),
        }
    }
}

/// `[throttle]` table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ThrottleSection {
    #[serde(default, deserialize_with = "lenient_ms")]
    pub wait_ms: Option<u64>,
    #[serde(default = "default_true")]
    pub leading: bool,
    #[serde(default = "default_true")]
    pub trailing: bool,
}

impl Default for ThrottleSection {
    fn default() -> Self {
        Self {
            wait_ms: None,
            leading: true,
            trailing: true,
        }
    }
}

impl ThrottleSection {
    pub fn wait(&self) -> Option<Duration> {
        self.wait_ms.map(Duration::from_millis)
    }

    pub fn options(&self) -> ThrottleOptions {
        ThrottleOptions {
            leading: self.leading,
            trailing: self.trailing,
        }
    }
}

/// `[frames]` table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FrameSection {
    /// Frame tick interval (default: 16ms, roughly 60 FPS)
    #[serde(default = "default_frame_interval_ms")]
    pub interval_ms: u64,
}

impl Default for FrameSection {
    fn default() -> Self {
        Self {
            interval_ms: default_frame_interval_ms(),
        }
    }
}

impl FrameSection {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

impl RateConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
