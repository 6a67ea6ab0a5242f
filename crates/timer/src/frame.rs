//! Frame-synchronized scheduling
//!
//! A [`FrameLoop`] stands in for a display refresh: callbacks requested on it
//! run together on the next frame tick. Hosts either call [`FrameLoop::tick`]
//! from their own render loop or let [`FrameLoop::spawn`] tick on an interval.

use crate::scheduler::{Callback, Scheduler, TimerHandle};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Shared frame clock that runs queued callbacks once per tick
#[derive(Clone, Default)]
pub struct FrameLoop {
    inner: Arc<Mutex<FrameQueue>>,
}

#[derive(Default)]
struct FrameQueue {
    /// Next request id
    next_id: u64,
    /// Callbacks waiting for the next frame, in request order
    callbacks: BTreeMap<u64, Callback>,
    /// Frames ticked so far
    frames: u64,
}

impl FrameLoop {
    /// Create a frame loop with nothing queued
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a frame loop ticked by a background task every `interval`
    pub fn spawn(interval: Duration) -> (Self, JoinHandle<()>) {
        let frames = Self::new();
        let driver = frames.clone();

        let task = tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            debug!("Starting frame loop (interval: {:?})", interval);
            loop {
                timer.tick().await;
                driver.tick();
            }
        });

        (frames, task)
    }

    /// Queue a callback for the next frame, returning its request id
    pub fn request(&self, callback: Callback) -> u64 {
        let mut queue = self.inner.lock();
        queue.next_id += 1;
        let id = queue.next_id;
        queue.callbacks.insert(id, callback);
        id
    }

    /// Drop a queued callback. Returns false if it already ran or never existed.
    pub fn cancel(&self, id: u64) -> bool {
        self.inner.lock().callbacks.remove(&id).is_some()
    }

    /// Run every callback queued before this tick
    ///
    /// Callbacks requested while the tick runs wait for the next one. Returns
    /// how many callbacks ran.
    pub fn tick(&self) -> usize {
        let due = {
            let mut queue = self.inner.lock();
            queue.frames += 1;
            std::mem::take(&mut queue.callbacks)
        };

        let count = due.len();
        for (_, callback) in due {
            callback();
        }

        if count > 0 {
            trace!("Frame ran {} callback(s)", count);
        }
        count
    }

    /// Callbacks waiting for the next frame
    pub fn queued(&self) -> usize {
        self.inner.lock().callbacks.len()
    }

    /// Frames ticked so far
    pub fn frames(&self) -> u64 {
        self.inner.lock().frames
    }
}

/// Scheduler that fires on the next frame and ignores delays
///
/// Keeps at most one frame request outstanding: arming a new callback cancels
/// the previous one first.
pub struct FrameScheduler {
    frames: FrameLoop,
    /// Most recent request made through this scheduler
    outstanding: Mutex<Option<u64>>,
}

impl FrameScheduler {
    /// Create a scheduler on top of a frame loop
    pub fn new(frames: FrameLoop) -> Self {
        Self {
            frames,
            outstanding: Mutex::new(None),
        }
    }
}

impl Scheduler for FrameScheduler {
    fn schedule(&self, callback: Callback, _delay: Duration) -> TimerHandle {
        let mut outstanding = self.outstanding.lock();
        if let Some(previous) = outstanding.take() {
            self.frames.cancel(previous);
        }

        let id = self.frames.request(callback);
        *outstanding = Some(id);
        TimerHandle::from_id(id)
    }

    fn cancel(&self, handle: TimerHandle) {
        let mut outstanding = self.outstanding.lock();
        self.frames.cancel(handle.id());
        if *outstanding == Some(handle.id()) {
            *outstanding = None;
        }
    }

    fn name(&self) -> &'static str {
        "frame"
    }
}
