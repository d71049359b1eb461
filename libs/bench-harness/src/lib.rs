//! Measures the wall-clock cost of issuing the same batch of GET requests
//! three ways: a fresh connection per request, one keep-alive session, and
//! all at once over a shared session on a single-threaded runtime.

pub mod concurrent;
pub mod config;
pub mod outcome;
pub mod progress;
pub mod runner;
pub mod sequential;
pub mod strategy;
pub mod timer;

pub use common_errors::{BenchError, BenchResult};
pub use concurrent::{run_concurrent, run_concurrent_on_current_thread};
pub use config::{BenchConfig, DEFAULT_REQUEST_COUNT, DEFAULT_TARGET_URL};
pub use outcome::{RequestFailure, RequestOutcome, Tally, TaskState};
pub use progress::{ProgressEvent, ProgressTracker};
pub use runner::BenchRunner;
pub use sequential::{run_with_session, run_without_session};
pub use strategy::{Strategy, StrategyReport};
pub use timer::{RunningTimer, TimerSpan};
