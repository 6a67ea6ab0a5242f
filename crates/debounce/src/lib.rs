//! Debounce and throttle wrappers for Cadence
//!
//! This crate provides:
//! - [`Debounced`]: wraps a function so bursts of calls collapse into leading
//!   and/or trailing invocations
//! - [`throttle`]: the same engine configured to invoke at most once per wait
//! - [`RateConfig`]: TOML configuration for hosts that set limits from disk
//!
//! Calls are never queued: the newest payload replaces older ones, and a call
//! that does not invoke gets back the last result instead.

pub mod config;
pub mod engine;
pub mod error;
mod state;
pub mod throttle;

// Re-exports
pub use config::{DebounceOptions, RateConfig, Settings};
pub use engine::{debounce, Builder, Debounced};
pub use error::Error;
pub use throttle::{throttle, throttle_builder, ThrottleOptions};

/// Result type for debounce operations
pub type Result<T> = std::result::Result<T, Error>;
