//! Throttling: at most one invocation per `wait`

use crate::config::DebounceOptions;
use crate::engine::{Builder, Debounced};
use crate::Result;
use std::time::Duration;

/// Throttle options; both edges fire by default
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleOptions {
    pub leading: bool,
    pub trailing: bool,
}

impl Default for ThrottleOptions {
    fn default() -> Self {
        Self {
            leading: true,
            trailing: true,
        }
    }
}

impl ThrottleOptions {
    /// Debounce options equivalent to throttling every `wait`
    pub fn to_debounce(self, wait: Option<Duration>) -> DebounceOptions {
        DebounceOptions {
            leading: self.leading,
            trailing: self.trailing,
            max_wait: Some(wait.unwrap_or(Duration::ZERO)),
        }
    }
}

/// Builder preconfigured to throttle; set the function and build
pub fn throttle_builder<A, R>(wait: Option<Duration>, options: ThrottleOptions) -> Builder<A, R>
where
    A: Send + 'static,
    R: Clone + Send + 'static,
{
    let builder = Builder::new().options(options.to_debounce(wait));
    match wait {
        Some(wait) => builder.wait(wait),
        None => builder,
    }
}

/// Throttle `func` so it runs at most once every `wait`
pub fn throttle<A, R, F>(func: F, wait: Option<Duration>, options: ThrottleOptions) -> Result<Debounced<A, R>>
where
    A: Send + 'static,
    R: Clone + Send + 'static,
    F: Fn(A) -> R + Send + Sync + 'static,
{
    throttle_builder(wait, options).func(func).build()
}
