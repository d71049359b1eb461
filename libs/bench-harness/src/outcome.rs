use std::fmt;

use reqwest::StatusCode;

/// Why a single request did not complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestFailure {
    /// Server answered with something other than 200.
    Status(StatusCode),
    /// Connect, DNS, timeout or body-read error.
    Transport(String),
    /// The task never produced an outcome (panic or runtime cancellation).
    Aborted(String),
}

impl fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(status) => write!(f, "unexpected status {}", status),
            Self::Transport(message) => write!(f, "transport error: {}", message),
            Self::Aborted(message) => write!(f, "task aborted: {}", message),
        }
    }
}

impl From<reqwest::Error> for RequestFailure {
    fn from(err: reqwest::Error) -> Self { Self::Transport(err.to_string()) }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    Completed,
    Failed(RequestFailure),
}

impl RequestOutcome {
    /// Anything but 200 is a failure.
    pub fn from_status(status: StatusCode) -> Self {
        if status == StatusCode::OK {
            Self::Completed
        } else {
            Self::Failed(RequestFailure::Status(status))
        }
    }

    pub fn is_completed(&self) -> bool { matches!(self, Self::Completed) }
}

/// Lifecycle of one concurrent request task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Created,
    InFlight,
    Completed,
    Failed,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Next state once the request is handed to the connection.
    pub fn launch(self) -> Self {
        match self {
            Self::Created => Self::InFlight,
            other => other,
        }
    }

    /// Terminal state for a finished exchange. Terminal states never move.
    pub fn resolve(self, outcome: &RequestOutcome) -> Self {
        if self.is_terminal() {
            return self;
        }
        match outcome {
            RequestOutcome::Completed => Self::Completed,
            RequestOutcome::Failed(_) => Self::Failed,
        }
    }
}

/// Running totals for one strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub issued: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl Tally {
    pub fn record(&mut self, outcome: &RequestOutcome) {
        self.issued += 1;
        if outcome.is_completed() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }
}
