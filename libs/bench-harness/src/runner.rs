use common_errors::BenchResult;
use tracing::{info, instrument};

use crate::{
    concurrent::run_concurrent_on_current_thread,
    config::BenchConfig,
    progress::ProgressTracker,
    sequential::{run_with_session, run_without_session},
    strategy::{Strategy, StrategyReport},
};

/// Runs the selected strategies one after another, always in
/// [`Strategy::ALL`] order. The first fatal error ends the run.
pub struct BenchRunner {
    config: BenchConfig,
    strategies: Vec<Strategy>,
    progress_tracker: Option<ProgressTracker>,
}

impl BenchRunner {
    pub fn new(config: BenchConfig) -> Self {
        Self {
            config,
            strategies: Strategy::ALL.to_vec(),
            progress_tracker: None,
        }
    }

    pub fn with_progress(mut self, progress_tracker: ProgressTracker) -> Self {
        self.progress_tracker = Some(progress_tracker);
        self
    }

    /// Restrict the run to a subset; order and duplicates are normalised.
    pub fn with_strategies(
        mut self, strategies: impl IntoIterator<Item = Strategy>,
    ) -> Self {
        let mut strategies: Vec<_> = strategies.into_iter().collect();
        strategies.sort();
        strategies.dedup();
        self.strategies = strategies;
        self
    }

    pub fn strategies(&self) -> &[Strategy] { &self.strategies }

    /// Blocking. Must be called outside any async runtime.
    #[instrument(skip(self))]
    pub fn run_all(&self) -> BenchResult<Vec<StrategyReport>> {
        let progress = self.progress_tracker.clone().unwrap_or_default();

        info!(
            target_url = %self.config.target_url,
            requests = self.config.request_count,
            timeout = ?self.config.request_timeout,
            "Starting benchmark with {} strategies",
            self.strategies.len()
        );

        let mut reports = Vec::with_capacity(self.strategies.len());
        for strategy in &self.strategies {
            let report = match strategy {
                Strategy::WithoutSession => {
                    run_without_session(&self.config, &progress)?
                }
                Strategy::WithSession => {
                    run_with_session(&self.config, &progress)?
                }
                Strategy::Concurrent => {
                    run_concurrent_on_current_thread(&self.config, &progress)?
                }
            };
            reports.push(report);
        }

        Ok(reports)
    }
}
