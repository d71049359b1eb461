//! The two blocking strategies.
//!
//! Both issue requests one at a time on the calling thread and stop at the
//! first non-200 response. A transport error is fatal and ends the strategy
//! with `BenchError::Transport`. Must not be called from inside an async
//! runtime: the blocking client drives its own.

use common_errors::{BenchError, BenchResult};
use reqwest::blocking::Response;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    config::BenchConfig,
    outcome::{RequestOutcome, Tally},
    progress::ProgressTracker,
    strategy::{Strategy, StrategyReport},
    timer::{RunningTimer, TimerSpan},
};

/// Baseline: a new client, and so a new connection, for every request.
#[instrument(
    skip_all,
    fields(strategy = %Strategy::WithoutSession, requests = config.request_count)
)]
pub fn run_without_session(
    config: &BenchConfig, progress: &ProgressTracker,
) -> BenchResult<StrategyReport> {
    let strategy = Strategy::WithoutSession;
    let target = config.target()?;

    progress.started(strategy, config.request_count);
    let timer = TimerSpan::start();

    let batch =
        issue_sequentially(strategy, config.request_count, progress, |index| {
            let client = config.fresh_blocking_client()?;
            client
                .get(target.clone())
                .send()
                .map_err(|source| {
                    BenchError::transport(strategy.name(), index, source)
                })
        });

    conclude(strategy, config.request_count, timer, batch, progress)
}

/// Same batch through one keep-alive session, released before the timer
/// stops on every exit path.
#[instrument(
    skip_all,
    fields(strategy = %Strategy::WithSession, requests = config.request_count)
)]
pub fn run_with_session(
    config: &BenchConfig, progress: &ProgressTracker,
) -> BenchResult<StrategyReport> {
    let strategy = Strategy::WithSession;
    let target = config.target()?;

    progress.started(strategy, config.request_count);
    let timer = TimerSpan::start();

    let batch = config.blocking_session().and_then(|session| {
        issue_sequentially(strategy, config.request_count, progress, |index| {
            session.get(target.clone()).send().map_err(|source| {
                BenchError::transport(strategy.name(), index, source)
            })
        })
    });

    conclude(strategy, config.request_count, timer, batch, progress)
}

fn issue_sequentially<F>(
    strategy: Strategy, count: usize, progress: &ProgressTracker, mut send: F,
) -> BenchResult<Tally>
where
    F: FnMut(usize) -> BenchResult<Response>,
{
    let mut tally = Tally::default();

    for index in 0..count {
        let response = send(index)?;
        let outcome = RequestOutcome::from_status(response.status());

        if outcome.is_completed() {
            let body = response.bytes().map_err(|source| {
                BenchError::transport(strategy.name(), index, source)
            })?;
            debug!(index, bytes = body.len(), "Request completed");
        }

        tally.record(&outcome);
        progress.advance(strategy);

        if let RequestOutcome::Failed(failure) = outcome {
            warn!(index, %failure, "Request failed");
            progress.failure(strategy, Some(index), failure);
            if strategy.stops_on_failure() {
                debug!(index, "Skipping the rest of the batch");
                break;
            }
        }
    }

    Ok(tally)
}

fn conclude(
    strategy: Strategy, requested: usize, timer: RunningTimer,
    batch: BenchResult<Tally>, progress: &ProgressTracker,
) -> BenchResult<StrategyReport> {
    let span = timer.stop();

    match batch {
        Ok(tally) => {
            let report = StrategyReport::new(
                strategy,
                requested,
                tally,
                tally.issued,
                span.elapsed(),
            );
            info!(
                issued = report.issued,
                failed = report.failed,
                "{} finished in {:.2}s",
                strategy,
                span.elapsed().as_secs_f64()
            );
            progress.finished(report.clone());
            Ok(report)
        }
        Err(err) => {
            error!(
                code = err.code(),
                "{} aborted after {:.2}s: {}",
                strategy,
                span.elapsed().as_secs_f64(),
                err
            );
            progress.aborted(strategy, err.to_string());
            Err(err)
        }
    }
}
