//! Timer primitives for Cadence
//!
//! This crate provides the pieces a rate limiter needs from its environment:
//! - Millisecond clocks (monotonic, wall, manual)
//! - One-shot fixed-delay scheduling on the tokio runtime
//! - Frame-synchronized scheduling driven by a [`FrameLoop`]
//!
//! Both scheduling strategies implement [`Scheduler`], so callers pick one
//! at construction time with [`select_scheduler`] and never look back.

pub mod clock;
pub mod delay;
pub mod error;
pub mod frame;
pub mod scheduler;

// Re-exports
pub use clock::{Clock, ManualClock, MonotonicClock, SystemClock};
pub use delay::DelayScheduler;
pub use error::TimerError;
pub use frame::{FrameLoop, FrameScheduler};
pub use scheduler::{select_scheduler, Callback, Scheduler, TimerHandle};

/// Result type for timer operations
pub type Result<T> = std::result::Result<T, TimerError>;
