//! Timer error types

use thiserror::Error;

/// Errors raised while setting up a timer backend
#[derive(Debug, Error)]
pub enum TimerError {
    /// Fixed-delay scheduling spawns tokio tasks and needs a runtime to do it
    #[error("no tokio runtime available for fixed-delay scheduling")]
    NoRuntime,
}
