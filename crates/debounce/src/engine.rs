//! Debounce engine
//!
//! Every call and every timer expiry runs through the same decision logic:
//! - First call of a burst: leading edge. Arms the timer and invokes if
//!   `leading` is set.
//! - Calls inside a burst: recorded, the newest payload wins.
//! - Timer expiry after a quiet `wait`: trailing edge. Invokes with the newest
//!   payload if `trailing` is set.
//! - Timer expiry while calls keep arriving: re-arm for the remaining wait.
//! - Max-wait elapsed mid-burst: invoke right away and keep the burst going.
//!
//! The wrapped function always runs with the record unlocked, so it may call
//! back into its own wrapper.

use crate::config::{DebounceOptions, Settings};
use crate::state::{ArmedTimer, InvocationRecord};
use crate::{Error, Result};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;
use timer::{select_scheduler, Callback, Clock, FrameLoop, MonotonicClock, Scheduler};
use tracing::{debug, trace};

type Func<A, R> = Arc<dyn Fn(A) -> R + Send + Sync>;

/// A rate-limited wrapper around a function
///
/// Cloning yields another handle to the same wrapper. `A` is the call payload
/// (arguments and any context, stored and replaced as one value); `R` is what
/// the function returns.
pub struct Debounced<A, R> {
    engine: Arc<Engine<A, R>>,
}

impl<A, R> Clone for Debounced<A, R> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
        }
    }
}

impl<A, R> Debounced<A, R>
where
    A: Send + 'static,
    R: Clone + Send + 'static,
{
    /// Start building a wrapper
    pub fn builder() -> Builder<A, R> {
        Builder::new()
    }

    /// Call the wrapper
    ///
    /// Returns the result of the most recent real invocation, which is this
    /// call's own result only when it invoked synchronously. `None` until the
    /// function has run at least once.
    pub fn call(&self, args: A) -> Option<R> {
        self.engine.dispatch(args)
    }

    /// Drop the current burst without invoking
    ///
    /// The next call behaves like the first call on a fresh wrapper.
    pub fn cancel(&self) {
        self.engine.cancel();
    }

    /// Run the trailing invocation now if a burst is in progress
    pub fn flush(&self) -> Option<R> {
        self.engine.flush()
    }

    /// Whether a burst is in progress (a timer is armed)
    pub fn pending(&self) -> bool {
        self.engine.record.lock().timer.is_some()
    }

    pub fn settings(&self) -> &Settings {
        &self.engine.settings
    }

    /// Name of the timer strategy in use ("delay" or "frame")
    pub fn scheduler_name(&self) -> &'static str {
        self.engine.scheduler.name()
    }
}

struct Engine<A, R> {
    func: Func<A, R>,
    settings: Settings,
    clock: Arc<dyn Clock>,
    scheduler: Arc<dyn Scheduler>,
    record: Mutex<InvocationRecord<A, R>>,
    /// Handed to timer callbacks so a dropped wrapper is never revived
    this: Weak<Engine<A, R>>,
}

impl<A, R> Engine<A, R>
where
    A: Send + 'static,
    R: Clone + Send + 'static,
{
    fn dispatch(&self, args: A) -> Option<R> {
        let time = self.clock.now_ms();
        let mut record = self.record.lock();

        let is_invoking = record.should_invoke(time, &self.settings);
        record.record_call(args, time);

        if is_invoking {
            if record.timer.is_none() {
                // Leading edge
                record.last_invoke_time = time;
                self.arm(&mut record, self.settings.wait_ms);
                if !self.settings.leading {
                    return record.last_result.clone();
                }
                let args = record.take_for_invoke(time);
                drop(record);
                debug!("Leading edge invocation at {}ms", time);
                return self.invoke(args);
            }

            if self.settings.max_wait_ms.is_some() {
                // Max-wait reached mid-burst; fires regardless of `leading`
                self.arm(&mut record, self.settings.wait_ms);
                let args = record.take_for_invoke(time);
                drop(record);
                debug!("Max-wait invocation at {}ms", time);
                return self.invoke(args);
            }
        }

        if record.timer.is_none() {
            self.arm(&mut record, self.settings.wait_ms);
        }
        record.last_result.clone()
    }

    fn timer_expired(&self, generation: u64) {
        let time = self.clock.now_ms();
        let mut record = self.record.lock();

        match record.timer {
            Some(armed) if armed.generation == generation => {}
            _ => {
                trace!("Ignoring stale timer expiry (generation {})", generation);
                return;
            }
        }

        if record.should_invoke(time, &self.settings) {
            let args = record.trailing_edge(time, &self.settings);
            drop(record);
            if args.is_some() {
                debug!("Trailing edge invocation at {}ms", time);
            }
            self.invoke(args);
            return;
        }

        let remaining = record.remaining_wait(time, &self.settings);
        trace!("Burst still active, re-arming for {}ms", remaining);
        self.arm(&mut record, remaining);
    }

    fn cancel(&self) {
        let mut record = self.record.lock();
        if let Some(armed) = record.reset() {
            self.scheduler.cancel(armed.handle);
            debug!("Cancelled pending burst");
        }
    }

    fn flush(&self) -> Option<R> {
        let mut record = self.record.lock();
        let Some(armed) = record.timer else {
            return record.last_result.clone();
        };

        self.scheduler.cancel(armed.handle);
        let time = self.clock.now_ms();
        let args = record.trailing_edge(time, &self.settings);
        drop(record);

        debug!("Flushed pending burst at {}ms", time);
        self.invoke(args)
    }

    /// Arm a fresh timer, disarming any previous one
    fn arm(&self, record: &mut InvocationRecord<A, R>, delay_ms: i64) {
        if let Some(previous) = record.timer.take() {
            self.scheduler.cancel(previous.handle);
        }

        record.generation += 1;
        let generation = record.generation;
        let engine = self.this.clone();
        let callback: Callback = Box::new(move || {
            if let Some(engine) = engine.upgrade() {
                engine.timer_expired(generation);
            }
        });

        let delay = Duration::from_millis(delay_ms.max(0) as u64);
        let handle = self.scheduler.schedule(callback, delay);
        record.timer = Some(ArmedTimer { handle, generation });
    }

    /// Run the function with `args`, or hand back the stored result if there
    /// is nothing to run with
    fn invoke(&self, args: Option<A>) -> Option<R> {
        match args {
            Some(args) => {
                let result = (self.func)(args);
                self.record.lock().last_result = Some(result.clone());
                Some(result)
            }
            None => self.record.lock().last_result.clone(),
        }
    }
}

impl<A, R> Drop for Engine<A, R> {
    fn drop(&mut self) {
        if let Some(armed) = self.record.get_mut().timer.take() {
            self.scheduler.cancel(armed.handle);
        }
    }
}

/// Builder for [`Debounced`]
pub struct Builder<A, R> {
    func: Option<Func<A, R>>,
    wait: Option<Duration>,
    options: DebounceOptions,
    clock: Option<Arc<dyn Clock>>,
    frames: Option<FrameLoop>,
    scheduler: Option<Arc<dyn Scheduler>>,
}

impl<A, R> Default for Builder<A, R> {
    fn default() -> Self {
        Self {
            func: None,
            wait: None,
            options: DebounceOptions::default(),
            clock: None,
            frames: None,
            scheduler: None,
        }
    }
}

impl<A, R> Builder<A, R>
where
    A: Send + 'static,
    R: Clone + Send + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Function to wrap
    pub fn func<F>(mut self, func: F) -> Self
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        self.func = Some(Arc::new(func));
        self
    }

    /// Quiet period. Leaving it unset allows frame scheduling.
    pub fn wait(mut self, wait: Duration) -> Self {
        self.wait = Some(wait);
        self
    }

    pub fn leading(mut self, leading: bool) -> Self {
        self.options.leading = leading;
        self
    }

    pub fn trailing(mut self, trailing: bool) -> Self {
        self.options.trailing = trailing;
        self
    }

    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.options.max_wait = Some(max_wait);
        self
    }

    /// Replace all edge and max-wait options at once
    pub fn options(mut self, options: DebounceOptions) -> Self {
        self.options = options;
        self
    }

    /// Clock to time calls with (default: [`MonotonicClock`])
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Make frame-synchronized scheduling available
    pub fn frames(mut self, frames: FrameLoop) -> Self {
        self.frames = Some(frames);
        self
    }

    /// Use a specific scheduler instead of selecting one
    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Build the wrapper
    ///
    /// Fails with [`Error::NotInvocable`] when no function was given, or with
    /// a timer error when fixed-delay scheduling is needed outside a tokio
    /// runtime.
    pub fn build(self) -> Result<Debounced<A, R>> {
        let func = self.func.ok_or(Error::NotInvocable)?;

        let (scheduler, frame_scheduled) = match self.scheduler {
            Some(scheduler) => (scheduler, false),
            None => {
                let frame_scheduled = self.wait.is_none() && self.frames.is_some();
                let scheduler = select_scheduler(self.wait.is_some(), self.frames.as_ref())?;
                (scheduler, frame_scheduled)
            }
        };

        let settings = Settings::resolve(self.wait, &self.options, frame_scheduled);
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(MonotonicClock::new()) as Arc<dyn Clock>);

        debug!(
            "Built {} wrapper (wait: {}ms, leading: {}, trailing: {}, max_wait: {:?})",
            scheduler.name(),
            settings.wait_ms,
            settings.leading,
            settings.trailing,
            settings.max_wait_ms
        );

        let engine = Arc::new_cyclic(|this| Engine {
            func,
            settings,
            clock,
            scheduler,
            record: Mutex::new(InvocationRecord::new()),
            this: this.clone(),
        });

        Ok(Debounced { engine })
    }
}

/// Debounce `func`: invoke it once calls have been quiet for `wait`
///
/// Passing `None` for `wait` means "not supplied"; see [`Builder::frames`].
pub fn debounce<A, R, F>(func: F, wait: Option<Duration>, options: DebounceOptions) -> Result<Debounced<A, R>>
where
    A: Send + 'static,
    R: Clone + Send + 'static,
    F: Fn(A) -> R + Send + Sync + 'static,
{
    let mut builder = Builder::new().func(func).options(options);
    if let Some(wait) = wait {
        builder = builder.wait(wait);
    }
    builder.build()
}
