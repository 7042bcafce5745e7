use std::time::Instant;

use crate::util::{format_elapsed, ZERO_ELAPSED};

/// A running stopwatch: a start instant and the last formatted reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stopwatch {
    started_at: Instant,
    display: String,
}

impl Stopwatch {
    pub fn start(now: Instant) -> Self {
        Self {
            started_at: now,
            display: ZERO_ELAPSED.to_string(),
        }
    }

    pub fn restart(&mut self, now: Instant) {
        self.started_at = now;
        self.display = ZERO_ELAPSED.to_string();
    }

    /// Recompute the display from `now`. Returns true if it changed.
    pub fn refresh(&mut self, now: Instant) -> bool {
        let next = format_elapsed(now.saturating_duration_since(self.started_at));
        if next != self.display {
            self.display = next;
            true
        } else {
            false
        }
    }

    pub fn display(&self) -> &str {
        &self.display
    }
}
