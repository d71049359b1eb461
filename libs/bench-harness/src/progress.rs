use tokio::sync::mpsc;

use crate::{
    outcome::RequestFailure,
    strategy::{Strategy, StrategyReport},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Started {
        strategy: Strategy,
        total: usize,
    },
    /// One request reached a terminal state.
    Advanced(Strategy),
    /// One request failed. `index` is unknown when the task itself died.
    Failed {
        strategy: Strategy,
        index: Option<usize>,
        failure: RequestFailure,
    },
    Finished(StrategyReport),
    /// A fatal error ended the strategy before it could report.
    Aborted {
        strategy: Strategy,
        error: String,
    },
    Shutdown,
}

/// Sending half of the progress side channel. Cheap to clone; sends never
/// block and are dropped silently once the consumer is gone.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ProgressTracker {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Tracker with no consumer attached.
    pub fn detached() -> Self { Self::new().0 }

    pub fn started(&self, strategy: Strategy, total: usize) {
        let _ = self.tx.send(ProgressEvent::Started { strategy, total });
    }

    pub fn advance(&self, strategy: Strategy) {
        let _ = self.tx.send(ProgressEvent::Advanced(strategy));
    }

    pub fn failure(
        &self, strategy: Strategy, index: Option<usize>,
        failure: RequestFailure,
    ) {
        let _ = self.tx.send(ProgressEvent::Failed {
            strategy,
            index,
            failure,
        });
    }

    pub fn finished(&self, report: StrategyReport) {
        let _ = self.tx.send(ProgressEvent::Finished(report));
    }

    pub fn aborted(&self, strategy: Strategy, error: String) {
        let _ = self.tx.send(ProgressEvent::Aborted { strategy, error });
    }

    pub fn shutdown(&self) { let _ = self.tx.send(ProgressEvent::Shutdown); }
}

impl Default for ProgressTracker {
    fn default() -> Self { Self::detached() }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;

    #[test]
    fn test_events_arrive_in_order() {
        let (tracker, mut rx) = ProgressTracker::new();

        tracker.started(Strategy::WithSession, 2);
        tracker.advance(Strategy::WithSession);
        tracker.failure(
            Strategy::WithSession,
            Some(1),
            RequestFailure::Status(StatusCode::NOT_FOUND),
        );
        tracker.shutdown();

        assert_eq!(
            rx.try_recv().unwrap(),
            ProgressEvent::Started {
                strategy: Strategy::WithSession,
                total: 2
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            ProgressEvent::Advanced(Strategy::WithSession)
        );
        assert!(matches!(
            rx.try_recv().unwrap(),
            ProgressEvent::Failed { index: Some(1), .. }
        ));
        assert_eq!(rx.try_recv().unwrap(), ProgressEvent::Shutdown);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_detached_tracker_ignores_sends() {
        let tracker = ProgressTracker::detached();

        tracker.started(Strategy::Concurrent, 10);
        tracker.advance(Strategy::Concurrent);
        tracker.shutdown();
    }

    #[tokio::test]
    async fn test_clones_share_one_consumer() {
        let (tracker, mut rx) = ProgressTracker::new();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let tracker = tracker.clone();
                tokio::spawn(async move {
                    tracker.advance(Strategy::Concurrent)
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }
        drop(tracker);

        let mut ticks = 0;
        while let Some(event) = rx.recv().await {
            assert_eq!(event, ProgressEvent::Advanced(Strategy::Concurrent));
            ticks += 1;
        }
        assert_eq!(ticks, 4);
    }
}
