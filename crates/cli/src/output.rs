//! Rendering emitted lines and run summaries

use crate::pipeline::{Emitted, Summary};
use anyhow::Result;
use clap::ValueEnum;
use owo_colors::OwoColorize;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Human-readable, colored
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

pub fn render_event(format: Format, event: &Emitted) -> Result<String> {
    match format {
        Format::Text => Ok(format!(
            "{} {}",
            format!("[{:>6}ms]", event.elapsed_ms).dimmed(),
            event.line
        )),
        Format::Json => Ok(serde_json::to_string(event)?),
    }
}

pub fn render_summary(format: Format, summary: &Summary) -> Result<String> {
    match format {
        Format::Text => Ok(format!(
            "{} {} received, {} emitted",
            "Done:".bold(),
            summary.received,
            summary.emitted.green()
        )),
        Format::Json => Ok(serde_json::to_string(&serde_json::json!({ "summary": summary }))?),
    }
}
