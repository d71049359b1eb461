mod common;

use std::time::Duration;

use bench_harness::{
    BenchConfig, BenchError, ProgressEvent, ProgressTracker, RequestFailure,
    Strategy, run_with_session, run_without_session,
};
use common::{advances, drain, failures, finished};
use reqwest::StatusCode;
use test_utils::{Behavior, MockBackend, RefusedEndpoint};

fn config(url: String, requests: usize) -> BenchConfig {
    BenchConfig::builder()
        .target_url(url)
        .request_count(requests)
        .build()
}

#[test]
fn test_without_session_issues_every_request() {
    let backend = MockBackend::always_ok().unwrap();
    let (tracker, mut rx) = ProgressTracker::new();

    let report =
        run_without_session(&config(backend.url(), 5), &tracker).unwrap();

    assert_eq!(backend.hits(), 5);
    assert_eq!(report.strategy, Strategy::WithoutSession);
    assert_eq!(report.issued, 5);
    assert_eq!(report.succeeded, 5);
    assert_eq!(report.failed, 0);
    assert!(!report.stopped_early());

    let events = drain(&mut rx);
    assert_eq!(failures(&events, Strategy::WithoutSession), 0);
    assert_eq!(advances(&events, Strategy::WithoutSession), 5);
    assert_eq!(finished(&events), vec![Strategy::WithoutSession]);
}

#[test]
fn test_without_session_opens_a_connection_per_request() {
    let backend = MockBackend::always_ok().unwrap();

    run_without_session(&config(backend.url(), 4), &ProgressTracker::detached())
        .unwrap();

    assert_eq!(backend.hits(), 4);
    assert_eq!(backend.connections(), 4);
}

#[test]
fn test_without_session_stops_after_first_failure() {
    let backend = MockBackend::start(Behavior::FailOn(3)).unwrap();
    let (tracker, mut rx) = ProgressTracker::new();

    let report =
        run_without_session(&config(backend.url(), 5), &tracker).unwrap();

    assert_eq!(backend.hits(), 3);
    assert_eq!(report.issued, 3);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 1);
    assert!(report.stopped_early());

    let events = drain(&mut rx);
    assert_eq!(failures(&events, Strategy::WithoutSession), 1);
    assert!(events.contains(&ProgressEvent::Failed {
        strategy: Strategy::WithoutSession,
        index: Some(2),
        failure: RequestFailure::Status(StatusCode::INTERNAL_SERVER_ERROR),
    }));
}

#[test]
fn test_with_session_reuses_one_connection() {
    let backend = MockBackend::always_ok().unwrap();

    let report =
        run_with_session(&config(backend.url(), 6), &ProgressTracker::detached())
            .unwrap();

    assert_eq!(report.succeeded, 6);
    assert_eq!(backend.hits(), 6);
    assert_eq!(backend.connections(), 1);
}

#[test]
fn test_with_session_stops_after_first_failure() {
    let backend = MockBackend::start(Behavior::FailOn(1)).unwrap();
    let (tracker, mut rx) = ProgressTracker::new();

    let report = run_with_session(&config(backend.url(), 5), &tracker).unwrap();

    assert_eq!(backend.hits(), 1);
    assert_eq!(report.issued, 1);
    assert_eq!(report.failed, 1);

    let events = drain(&mut rx);
    assert_eq!(failures(&events, Strategy::WithSession), 1);
    assert_eq!(advances(&events, Strategy::WithSession), 1);
}

#[test]
fn test_zero_requests_touch_no_network() {
    let refused = RefusedEndpoint::reserve().unwrap();
    let tracker = ProgressTracker::detached();
    let config = config(refused.url(), 0);

    let without = run_without_session(&config, &tracker).unwrap();
    let with = run_with_session(&config, &tracker).unwrap();

    for report in [without, with] {
        assert_eq!(report.issued, 0);
        assert!(report.elapsed < Duration::from_secs(1));
    }
}

#[test]
fn test_transport_error_is_fatal() {
    let refused = RefusedEndpoint::reserve().unwrap();
    let (tracker, mut rx) = ProgressTracker::new();

    let err = run_without_session(&config(refused.url(), 3), &tracker)
        .unwrap_err();

    assert!(matches!(
        err,
        BenchError::Transport {
            strategy: "no-session",
            index: 0,
            ..
        }
    ));
    let events = drain(&mut rx);
    assert!(matches!(
        events.last(),
        Some(ProgressEvent::Aborted {
            strategy: Strategy::WithoutSession,
            ..
        })
    ));
    assert!(finished(&events).is_empty());
}

#[test]
fn test_timeout_turns_a_hang_into_a_fatal_error() {
    let backend = MockBackend::start(Behavior::Hang).unwrap();
    let config = BenchConfig::builder()
        .target_url(backend.url())
        .request_count(3)
        .request_timeout(Duration::from_millis(200))
        .build();

    let err =
        run_with_session(&config, &ProgressTracker::detached()).unwrap_err();

    assert!(err.is_timeout());
    assert_eq!(err.code(), "TIMEOUT");
    assert_eq!(backend.hits(), 1);
}

#[test]
fn test_repeated_runs_issue_the_same_requests() {
    let backend = MockBackend::always_ok().unwrap();
    let config = config(backend.url(), 4);
    let tracker = ProgressTracker::detached();

    let first = run_with_session(&config, &tracker).unwrap();
    let second = run_with_session(&config, &tracker).unwrap();

    assert_eq!(first.issued, second.issued);
    assert_eq!(backend.hits(), 8);
}

#[test]
fn test_truncated_body_is_a_fatal_transport_error() {
    let backend = MockBackend::start(Behavior::TruncateOn(2)).unwrap();
    let (tracker, mut rx) = ProgressTracker::new();

    let err = run_with_session(&config(backend.url(), 4), &tracker)
        .unwrap_err();

    assert!(matches!(
        err,
        BenchError::Transport {
            strategy: "session",
            index: 1,
            ..
        }
    ));
    assert_eq!(backend.hits(), 2);
    let events = drain(&mut rx);
    assert_eq!(advances(&events, Strategy::WithSession), 1);
    assert!(finished(&events).is_empty());
}
