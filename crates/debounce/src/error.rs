//! Error types for building rate-limited wrappers

use thiserror::Error;
use timer::TimerError;

/// Errors raised while constructing a wrapper or loading its configuration
///
/// Failures of the wrapped function itself are never wrapped here; they reach
/// whoever triggered the invocation.
#[derive(Debug, Error)]
pub enum Error {
    /// Builder finished without a function to wrap
    #[error("expected a function to wrap")]
    NotInvocable,

    /// The selected timer backend could not be set up
    #[error(transparent)]
    Timer(#[from] TimerError),

    /// Configuration could not be parsed
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Configuration file could not be read
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}
