//! Time intervals covered by tasks, threads and processes

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A closed span between two timestamps
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeInterval {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// A zero-length interval, as recorded for a single logged event
    pub fn instant(at: NaiveDateTime) -> Self {
        Self { start: at, end: at }
    }

    pub fn duration(&self) -> Duration {
        self.end.signed_duration_since(self.start)
    }

    /// Widen the interval so that it covers `at`
    pub fn extend_to(&mut self, at: NaiveDateTime) {
        if at < self.start {
            self.start = at;
        }
        if at > self.end {
            self.end = at;
        }
    }

    /// The smallest interval covering both `self` and `other`
    pub fn union(&self, other: &TimeInterval) -> TimeInterval {
        TimeInterval {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at >= self.start && at <= self.end
    }
}
