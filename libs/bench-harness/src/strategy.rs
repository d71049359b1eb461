use std::{fmt, time::Duration};

use crate::outcome::Tally;

/// The three measured ways of issuing the batch, in run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Strategy {
    WithoutSession,
    WithSession,
    Concurrent,
}

impl Strategy {
    pub const ALL: [Strategy; 3] =
        [Self::WithoutSession, Self::WithSession, Self::Concurrent];

    /// Short name used in logs, errors and progress bar prefixes.
    pub fn name(self) -> &'static str {
        match self {
            Self::WithoutSession => "no-session",
            Self::WithSession => "session",
            Self::Concurrent => "concurrent",
        }
    }

    /// Left-hand side of the timing line, padded so the colons line up.
    pub fn timing_label(self) -> &'static str {
        match self {
            Self::WithoutSession => "Requests without Session Took",
            Self::WithSession => "Requests with Session Took   ",
            Self::Concurrent => "aiohttp with Session Took    ",
        }
    }

    /// Sequential strategies stop at the first non-200 response.
    pub fn stops_on_failure(self) -> bool { !matches!(self, Self::Concurrent) }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of one strategy run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyReport {
    pub strategy: Strategy,
    pub requested: usize,
    pub issued: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Progress advancements emitted while running.
    pub progress_ticks: usize,
    pub elapsed: Duration,
}

impl StrategyReport {
    pub fn new(
        strategy: Strategy, requested: usize, tally: Tally,
        progress_ticks: usize, elapsed: Duration,
    ) -> Self {
        Self {
            strategy,
            requested,
            issued: tally.issued,
            succeeded: tally.succeeded,
            failed: tally.failed,
            progress_ticks,
            elapsed,
        }
    }

    /// True when the run stopped before issuing every request.
    pub fn stopped_early(&self) -> bool { self.issued < self.requested }
}

impl fmt::Display for StrategyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:.2}s",
            self.strategy.timing_label(),
            self.elapsed.as_secs_f64()
        )
    }
}
