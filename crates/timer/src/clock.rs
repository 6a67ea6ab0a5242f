//! Millisecond clocks
//!
//! Timestamps are signed so that `now - earlier` can go negative when a wall
//! clock is set backward. Callers are expected to handle that case rather
//! than treat it as an error.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::time::Instant;

/// Source of the current time in milliseconds
pub trait Clock: Send + Sync {
    /// Current time in milliseconds
    fn now_ms(&self) -> i64;
}

/// Milliseconds elapsed since the clock was created
///
/// Backed by `tokio::time::Instant`, so a paused tokio runtime (see
/// `tokio::time::pause`) controls it exactly.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Create a clock whose zero is "now"
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> i64 {
        self.origin.elapsed().as_millis() as i64
    }
}

/// Wall-clock milliseconds since the UNIX epoch
///
/// Follows system time adjustments, including backward jumps.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_millis() as i64,
            // System time before 1970
            Err(e) => -(e.duration().as_millis() as i64),
        }
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// Create a clock reading `start_ms`
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: AtomicI64::new(start_ms),
        }
    }

    /// Jump to an absolute time (may move backward)
    pub fn set(&self, ms: i64) {
        self.now.store(ms, Ordering::SeqCst);
    }

    /// Move forward by `ms` (negative values move backward)
    pub fn advance(&self, ms: i64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
