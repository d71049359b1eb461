#![allow(dead_code)]

use bench_harness::{ProgressEvent, Strategy};
use tokio::sync::mpsc::UnboundedReceiver;

/// Everything sent so far. Strategies send synchronously, so once a run
/// has returned the channel holds its full history.
pub fn drain(rx: &mut UnboundedReceiver<ProgressEvent>) -> Vec<ProgressEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub fn advances(events: &[ProgressEvent], strategy: Strategy) -> usize {
    events
        .iter()
        .filter(|event| **event == ProgressEvent::Advanced(strategy))
        .count()
}

pub fn failures(events: &[ProgressEvent], strategy: Strategy) -> usize {
    events
        .iter()
        .filter(|event| {
            matches!(event, ProgressEvent::Failed { strategy: s, .. } if *s == strategy)
        })
        .count()
}

pub fn finished(events: &[ProgressEvent]) -> Vec<Strategy> {
    events
        .iter()
        .filter_map(|event| match event {
            ProgressEvent::Finished(report) => Some(report.strategy),
            _ => None,
        })
        .collect()
}
