//! Fixed-delay scheduling on the tokio runtime

use crate::scheduler::{Callback, Scheduler, TimerHandle};
use crate::{Result, TimerError};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tracing::trace;

/// One-shot timers backed by spawned tokio tasks
///
/// Every `schedule` spawns a task that sleeps for the requested delay and then
/// runs the callback. Outstanding tasks are tracked by id so `cancel` can
/// abort them before they fire.
pub struct DelayScheduler {
    /// Runtime the timer tasks are spawned on
    runtime: Handle,

    /// Outstanding timer tasks (id -> abort handle)
    tasks: Arc<DashMap<u64, AbortHandle>>,

    /// Next handle id
    next_id: AtomicU64,
}

impl DelayScheduler {
    /// Create a scheduler bound to the current tokio runtime
    pub fn new() -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| TimerError::NoRuntime)?;
        Ok(Self::with_runtime(runtime))
    }

    /// Create a scheduler bound to an explicit runtime
    pub fn with_runtime(runtime: Handle) -> Self {
        Self {
            runtime,
            tasks: Arc::new(DashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Number of timers armed and not yet fired or cancelled
    pub fn outstanding(&self) -> usize {
        self.tasks.len()
    }
}

impl Scheduler for DelayScheduler {
    fn schedule(&self, callback: Callback, delay: Duration) -> TimerHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let tasks = Arc::clone(&self.tasks);

        let task = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            tasks.remove(&id);
            callback();
        });

        self.tasks.insert(id, task.abort_handle());
        // A zero delay on a multi-threaded runtime can finish before the insert
        if task.is_finished() {
            self.tasks.remove(&id);
        }

        trace!("Armed delay timer {} ({:?})", id, delay);
        TimerHandle::from_id(id)
    }

    fn cancel(&self, handle: TimerHandle) {
        if let Some((_, task)) = self.tasks.remove(&handle.id()) {
            task.abort();
            trace!("Cancelled delay timer {}", handle.id());
        }
    }

    fn name(&self) -> &'static str {
        "delay"
    }
}
