//! Invocation record and the timing predicates
//!
//! Everything in here is pure bookkeeping; the engine owns the record behind a
//! lock and performs the side effects (timers, invoking the function).

use crate::config::Settings;
use timer::TimerHandle;

/// A timer the engine is currently waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ArmedTimer {
    pub(crate) handle: TimerHandle,
    /// Expiries carrying any other generation are stale
    pub(crate) generation: u64,
}

/// Call history of one wrapper
///
/// `timer` present means a burst is being tracked. `pending` present means a
/// call arrived since the last invocation.
pub(crate) struct InvocationRecord<A, R> {
    /// Payload of the most recent call
    pub(crate) pending: Option<A>,
    /// Result of the most recent real invocation
    pub(crate) last_result: Option<R>,
    pub(crate) last_call_time: Option<i64>,
    /// Starts at zero, not absent
    pub(crate) last_invoke_time: i64,
    pub(crate) timer: Option<ArmedTimer>,
    /// Bumped every time a timer is armed
    pub(crate) generation: u64,
}

impl<A, R> InvocationRecord<A, R> {
    pub(crate) fn new() -> Self {
        Self {
            pending: None,
            last_result: None,
            last_call_time: None,
            last_invoke_time: 0,
            timer: None,
            generation: 0,
        }
    }

    /// Whether a call or expiry at `time` should invoke the function
    pub(crate) fn should_invoke(&self, time: i64, settings: &Settings) -> bool {
        let Some(last_call_time) = self.last_call_time else {
            return true;
        };

        let since_last_call = time - last_call_time;
        let since_last_invoke = time - self.last_invoke_time;

        since_last_call >= settings.wait_ms
            // Clock moved backward
            || since_last_call < 0
            || settings
                .max_wait_ms
                .is_some_and(|max_wait| since_last_invoke >= max_wait)
    }

    /// How long to re-arm for when an expiry at `time` does not invoke
    ///
    /// Trailing edge lands `wait` after the last call, unless max-wait cuts
    /// the burst off sooner. May be negative when max-wait is already overdue.
    pub(crate) fn remaining_wait(&self, time: i64, settings: &Settings) -> i64 {
        let since_last_call = time - self.last_call_time.unwrap_or(time);
        let time_waiting = settings.wait_ms - since_last_call;

        match settings.max_wait_ms {
            Some(max_wait) => time_waiting.min(max_wait - (time - self.last_invoke_time)),
            None => time_waiting,
        }
    }

    pub(crate) fn record_call(&mut self, args: A, time: i64) {
        self.pending = Some(args);
        self.last_call_time = Some(time);
    }

    /// Hand out the pending payload for an invocation happening at `time`
    pub(crate) fn take_for_invoke(&mut self, time: i64) -> Option<A> {
        self.last_invoke_time = time;
        self.pending.take()
    }

    /// End the burst, returning the payload to invoke with if the trailing
    /// edge should fire
    pub(crate) fn trailing_edge(&mut self, time: i64, settings: &Settings) -> Option<A> {
        self.timer = None;

        if settings.trailing && self.pending.is_some() {
            return self.take_for_invoke(time);
        }
        self.pending = None;
        None
    }

    /// Forget the current burst, returning the timer that must be disarmed
    pub(crate) fn reset(&mut self) -> Option<ArmedTimer> {
        self.last_invoke_time = 0;
        self.pending = None;
        self.last_call_time = None;
        self.timer.take()
    }
}
