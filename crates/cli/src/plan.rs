//! Resolve command-line flags and the config file into a limiter

use anyhow::{Context, Result};
use clap::ValueEnum;
use debounce::{throttle_builder, Builder, DebounceOptions, Debounced, RateConfig, ThrottleOptions};
use std::path::Path;
use std::time::Duration;
use timer::FrameLoop;

/// Which preset to run lines through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Debounce,
    Throttle,
}

/// What to do with a burst still pending when input ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OnEof {
    /// Emit the trailing line right away
    #[default]
    Flush,
    /// Drop it
    Cancel,
}

/// Flag values that take precedence over the config file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub wait_ms: Option<u64>,
    pub leading: Option<bool>,
    pub trailing: Option<bool>,
    pub max_wait_ms: Option<u64>,
    /// Omit the wait and schedule on frame ticks
    pub frames: bool,
    pub frame_interval_ms: Option<u64>,
}

/// Fully resolved limiter setup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimiterPlan {
    pub mode: Mode,
    /// `None` when no wait was supplied anywhere
    pub wait: Option<Duration>,
    pub leading: bool,
    pub trailing: bool,
    /// Debounce only
    pub max_wait: Option<Duration>,
    /// Set when a frame loop should be offered to the limiter
    pub frame_interval: Option<Duration>,
}

/// Load the config file if one was given
pub fn load_config(path: Option<&Path>) -> Result<RateConfig> {
    match path {
        Some(path) => RateConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(RateConfig::default()),
    }
}

impl LimiterPlan {
    /// Merge flags over config values
    pub fn resolve(mode: Mode, config: &RateConfig, overrides: &Overrides) -> Self {
        let (wait, leading, trailing, max_wait) = match mode {
            Mode::Debounce => {
                let options = config.debounce.options();
                (
                    config.debounce.wait(),
                    options.leading,
                    options.trailing,
                    overrides
                        .max_wait_ms
                        .map(Duration::from_millis)
                        .or(options.max_wait),
                )
            }
            Mode::Throttle => {
                let options = config.throttle.options();
                (config.throttle.wait(), options.leading, options.trailing, None)
            }
        };

        let (wait, frame_interval) = if overrides.frames {
            let interval = overrides
                .frame_interval_ms
                .map(|ms| Duration::from_millis(ms.max(1)))
                .unwrap_or_else(|| config.frames.interval());
            (None, Some(interval))
        } else {
            (overrides.wait_ms.map(Duration::from_millis).or(wait), None)
        };

        Self {
            mode,
            wait,
            leading: overrides.leading.unwrap_or(leading),
            trailing: overrides.trailing.unwrap_or(trailing),
            max_wait,
            frame_interval,
        }
    }

    /// Build the limiter around `func`
    pub fn build<F>(&self, func: F, frames: Option<FrameLoop>) -> debounce::Result<Debounced<String, String>>
    where
        F: Fn(String) -> String + Send + Sync + 'static,
    {
        let mut builder = match self.mode {
            Mode::Debounce => {
                let builder = Builder::new().options(DebounceOptions {
                    leading: self.leading,
                    trailing: self.trailing,
                    max_wait: self.max_wait,
                });
                match self.wait {
                    Some(wait) => builder.wait(wait),
                    None => builder,
                }
            }
            Mode::Throttle => throttle_builder(
                self.wait,
                ThrottleOptions {
                    leading: self.leading,
                    trailing: self.trailing,
                },
            ),
        };

        if let Some(frames) = frames {
            builder = builder.frames(frames);
        }
        builder.func(func).build()
    }
}
