//! Common utilities for timing tests

#![allow(dead_code)]

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::time::Instant;

/// Records every real invocation as (elapsed ms, argument)
#[derive(Clone)]
pub struct Recorder {
    start: Instant,
    calls: Arc<Mutex<Vec<(u64, u32)>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Function to wrap: records the call and returns `arg * 10`
    pub fn func(&self) -> impl Fn(u32) -> u32 + Send + Sync + 'static {
        let recorder = self.clone();
        move |arg| {
            let elapsed = recorder.start.elapsed().as_millis() as u64;
            recorder.calls.lock().push((elapsed, arg));
            arg * 10
        }
    }

    pub fn calls(&self) -> Vec<(u64, u32)> {
        self.calls.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn args(&self) -> Vec<u32> {
        self.calls.lock().iter().map(|(_, arg)| *arg).collect()
    }
}
