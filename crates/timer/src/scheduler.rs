//! Scheduling strategy interface

use crate::delay::DelayScheduler;
use crate::frame::{FrameLoop, FrameScheduler};
use crate::Result;
use std::sync::Arc;
use std::time::Duration;

/// Work to run when a timer fires
pub type Callback = Box<dyn FnOnce() + Send + 'static>;

/// Identity of a scheduled callback
///
/// Handles are only meaningful to the scheduler that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// Wrap a scheduler-specific id
    pub const fn from_id(id: u64) -> Self {
        Self(id)
    }

    /// Raw id, unique per issuing scheduler
    pub const fn id(&self) -> u64 {
        self.0
    }
}

/// A way of running a callback later
pub trait Scheduler: Send + Sync {
    /// Arm a one-shot callback.
    ///
    /// Frame-synchronized schedulers ignore `delay` and run the callback on
    /// the next frame instead.
    fn schedule(&self, callback: Callback, delay: Duration) -> TimerHandle;

    /// Disarm a callback. No-op if it already ran or was cancelled.
    fn cancel(&self, handle: TimerHandle);

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Pick the scheduling strategy for a new rate limiter
///
/// Frame scheduling is used only when no wait was supplied at all and the
/// environment offers a frame loop; everything else gets fixed delays.
pub fn select_scheduler(
    wait_supplied: bool,
    frames: Option<&FrameLoop>,
) -> Result<Arc<dyn Scheduler>> {
    match frames {
        Some(frames) if !wait_supplied => Ok(Arc::new(FrameScheduler::new(frames.clone()))),
        _ => Ok(Arc::new(DelayScheduler::new()?)),
    }
}
