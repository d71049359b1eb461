use std::time::{Duration, Instant};

/// Closed (start, end) pair of monotonic timestamps around one strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSpan {
    pub start: Instant,
    pub end: Instant,
}

impl TimerSpan {
    pub fn start() -> RunningTimer {
        RunningTimer {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration { self.end.duration_since(self.start) }
}

/// Open span; `stop` closes it.
#[derive(Debug)]
pub struct RunningTimer {
    start: Instant,
}

impl RunningTimer {
    pub fn stop(self) -> TimerSpan {
        TimerSpan {
            start: self.start,
            end: Instant::now(),
        }
    }
}
