use anyhow::Context;
use bench_harness::{BenchRunner, DEFAULT_TARGET_URL, ProgressTracker};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod cli_progress;

use cli::Cli;
use cli_progress::CliProgress;

const REQUESTS_TO_MAKE: usize = 1000;

// Not `#[tokio::main]`: the sequential strategies use the blocking client,
// and the concurrent one builds its own current-thread runtime.
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cli.bench_config(DEFAULT_TARGET_URL, REQUESTS_TO_MAKE);

    let (progress_tracker, progress_rx) = ProgressTracker::new();
    let renderer = CliProgress::new(cli.quiet)
        .spawn(progress_rx)
        .context("Failed to start progress renderer")?;

    let runner = BenchRunner::new(config)
        .with_strategies(cli.strategies())
        .with_progress(progress_tracker.clone());
    let result = runner.run_all();

    progress_tracker.shutdown();
    if renderer.join().is_err() {
        warn!("Progress renderer panicked");
    }

    let reports = result.context("Benchmark aborted")?;
    info!("Benchmark finished with {} reports", reports.len());

    Ok(())
}
