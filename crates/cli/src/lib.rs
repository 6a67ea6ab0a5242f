//! Cadence CLI library
//!
//! Shared by the `cadence` binary and its integration tests.

pub mod output;
pub mod pipeline;
pub mod plan;

pub use output::Format;
pub use pipeline::{Emitted, Summary};
pub use plan::{LimiterPlan, Mode, OnEof, Overrides};
