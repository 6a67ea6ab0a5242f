//! Cadence CLI - rate-limit stdin lines

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use cli_lib::output::{render_event, render_summary};
use cli_lib::{pipeline, Format, LimiterPlan, Mode, OnEof, Overrides};
use std::path::PathBuf;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Cadence - debounce or throttle a stream of lines
#[derive(Parser)]
#[command(name = "cadence")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML config with [debounce], [throttle] and [frames] tables
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text, global = true)]
    format: Format,

    /// What to do with a pending line when input ends
    #[arg(long, value_enum, default_value_t = OnEof::Flush, global = true)]
    on_eof: OnEof,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Emit a line once input has been quiet for the wait
    Debounce {
        #[command(flatten)]
        limits: LimitArgs,

        /// Emit at least this often while input keeps arriving
        #[arg(long)]
        max_wait_ms: Option<u64>,
    },
    /// Emit at most one line per wait
    Throttle {
        #[command(flatten)]
        limits: LimitArgs,
    },
}

#[derive(Args)]
struct LimitArgs {
    /// Wait in milliseconds
    #[arg(long, conflicts_with = "frames")]
    wait_ms: Option<u64>,

    /// Emit on the leading edge of a burst
    #[arg(long, conflicts_with = "no_leading")]
    leading: bool,

    /// Do not emit on the leading edge
    #[arg(long)]
    no_leading: bool,

    /// Do not emit on the trailing edge
    #[arg(long)]
    no_trailing: bool,

    /// Schedule on frame ticks instead of a fixed wait
    #[arg(long)]
    frames: bool,

    /// Frame tick interval in milliseconds (default: 16)
    #[arg(long, requires = "frames")]
    frame_interval_ms: Option<u64>,
}

impl LimitArgs {
    fn overrides(&self, max_wait_ms: Option<u64>) -> Overrides {
        let leading = match (self.leading, self.no_leading) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };

        Overrides {
            wait_ms: self.wait_ms,
            leading,
            trailing: self.no_trailing.then_some(false),
            max_wait_ms,
            frames: self.frames,
            frame_interval_ms: self.frame_interval_ms,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (stdout carries the emitted lines)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli_lib::plan::load_config(cli.config.as_deref())?;

    let (mode, overrides) = match &cli.command {
        Commands::Debounce { limits, max_wait_ms } => (Mode::Debounce, limits.overrides(*max_wait_ms)),
        Commands::Throttle { limits } => (Mode::Throttle, limits.overrides(None)),
    };
    let plan = LimiterPlan::resolve(mode, &config, &overrides);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let format = cli.format;
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match render_event(format, &event) {
                Ok(rendered) => println!("{}", rendered),
                Err(e) => tracing::warn!("Failed to render line {}: {}", event.seq, e),
            }
        }
    });

    let input = BufReader::new(tokio::io::stdin());
    let summary = pipeline::run(&plan, input, cli.on_eof, tx).await?;

    printer.await?;
    eprintln!("{}", render_summary(format, &summary)?);

    Ok(())
}
