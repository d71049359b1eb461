use common_errors::BenchResult;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, trace, warn};
use url::Url;

use crate::{
    config::BenchConfig,
    outcome::{RequestFailure, RequestOutcome, Tally, TaskState},
    progress::ProgressTracker,
    strategy::{Strategy, StrategyReport},
    timer::TimerSpan,
};

/// Launch the whole batch at once over one shared session and wait for
/// every task to settle.
///
/// A failing task reports itself and never cancels its siblings. Progress
/// advances once per joined task, including tasks that panicked. Without a
/// request timeout a request that never answers keeps this future pending.
#[instrument(
    skip_all,
    fields(strategy = %Strategy::Concurrent, requests = config.request_count)
)]
pub async fn run_concurrent(
    config: &BenchConfig, progress: &ProgressTracker,
) -> BenchResult<StrategyReport> {
    let strategy = Strategy::Concurrent;
    let target = config.target()?;

    progress.started(strategy, config.request_count);
    let timer = TimerSpan::start();

    let session = match config.async_session() {
        Ok(session) => session,
        Err(err) => {
            error!(code = err.code(), "{} aborted: {}", strategy, err);
            progress.aborted(strategy, err.to_string());
            return Err(err);
        }
    };

    let mut tasks = JoinSet::new();
    for index in 0..config.request_count {
        let session = session.clone();
        let target = target.clone();
        let progress = progress.clone();
        tasks.spawn(async move {
            let (state, outcome) = fetch(&session, target, index).await;
            debug_assert!(state.is_terminal());
            if let RequestOutcome::Failed(failure) = &outcome {
                warn!(index, %failure, "Request failed");
                progress.failure(strategy, Some(index), failure.clone());
            }
            outcome
        });
    }
    drop(session);

    let mut tally = Tally::default();
    let mut ticks = 0;
    while let Some(joined) = tasks.join_next().await {
        let outcome = joined.unwrap_or_else(|err| {
            let failure = RequestFailure::Aborted(err.to_string());
            warn!(%failure, "Request task died before settling");
            progress.failure(strategy, None, failure.clone());
            RequestOutcome::Failed(failure)
        });
        tally.record(&outcome);
        progress.advance(strategy);
        ticks += 1;
    }

    let span = timer.stop();
    let report = StrategyReport::new(
        strategy,
        config.request_count,
        tally,
        ticks,
        span.elapsed(),
    );
    info!(
        succeeded = report.succeeded,
        failed = report.failed,
        "{} finished in {:.2}s",
        strategy,
        span.elapsed().as_secs_f64()
    );
    progress.finished(report.clone());

    Ok(report)
}

/// Drive `run_concurrent` on a fresh single-threaded runtime, so all tasks
/// share one thread and yield only at I/O waits.
pub fn run_concurrent_on_current_thread(
    config: &BenchConfig, progress: &ProgressTracker,
) -> BenchResult<StrategyReport> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_concurrent(config, progress))
}

/// One exchange, moving its task state as the request goes out and again
/// once the body is read or the exchange fails.
async fn fetch(
    session: &reqwest::Client, target: Url, index: usize,
) -> (TaskState, RequestOutcome) {
    let mut state = TaskState::Created;
    let request = session.get(target);

    state = state.launch();
    trace!(index, ?state, "Sending request");
    let outcome = match request.send().await {
        Ok(response) => {
            let outcome = RequestOutcome::from_status(response.status());
            if outcome.is_completed() {
                // Body must be drained before the exchange counts as done.
                match response.text().await {
                    Ok(body) => {
                        debug!(index, bytes = body.len(), "Body read");
                        outcome
                    }
                    Err(err) => RequestOutcome::Failed(err.into()),
                }
            } else {
                outcome
            }
        }
        Err(err) => RequestOutcome::Failed(err.into()),
    };

    state = state.resolve(&outcome);
    debug!(index, ?state, "Request settled");
    (state, outcome)
}
