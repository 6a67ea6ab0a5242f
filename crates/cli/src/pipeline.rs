//! Line pipeline: every input line is a call, every invocation is an emitted line

use crate::plan::{LimiterPlan, OnEof};
use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use timer::FrameLoop;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info};

/// A line that made it through the limiter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Emitted {
    /// 1-based emission counter
    pub seq: usize,
    /// Milliseconds since the pipeline started
    pub elapsed_ms: u64,
    pub line: String,
}

/// Totals for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub received: usize,
    pub emitted: usize,
}

/// Feed `input` line by line through the limiter described by `plan`
///
/// Emitted lines are sent on `events` as they happen, including those fired
/// later by timers. Returns once input is exhausted and the final burst has
/// been flushed or cancelled.
pub async fn run<I>(
    plan: &LimiterPlan,
    input: I,
    on_eof: OnEof,
    events: mpsc::UnboundedSender<Emitted>,
) -> Result<Summary>
where
    I: AsyncBufRead + Unpin,
{
    let start = Instant::now();
    let emitted = Arc::new(AtomicUsize::new(0));

    let frames = plan.frame_interval.map(FrameLoop::spawn);

    let counter = Arc::clone(&emitted);
    let emit = move |line: String| {
        let seq = counter.fetch_add(1, Ordering::SeqCst) + 1;
        let event = Emitted {
            seq,
            elapsed_ms: start.elapsed().as_millis() as u64,
            line: line.clone(),
        };
        // Receiver gone means nobody is printing; keep limiting regardless
        let _ = events.send(event);
        line
    };

    let limiter = plan
        .build(emit, frames.as_ref().map(|(frames, _)| frames.clone()))
        .context("Failed to build rate limiter")?;
    info!(
        "Rate limiting stdin ({:?}, {} scheduling)",
        plan.mode,
        limiter.scheduler_name()
    );

    let mut lines = input.lines();
    let mut received = 0;
    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        received += 1;
        limiter.call(line);
    }

    match on_eof {
        OnEof::Flush => {
            limiter.flush();
        }
        OnEof::Cancel => {
            if limiter.pending() {
                debug!("Dropping pending burst at end of input");
            }
            limiter.cancel();
        }
    }

    if let Some((_, driver)) = frames {
        driver.abort();
    }

    Ok(Summary {
        received,
        emitted: emitted.load(Ordering::SeqCst),
    })
}
