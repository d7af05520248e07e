//! Phases: configured calendar windows of the review schedule
//!
//! Phases are loaded once from the timetable and never mutated afterwards.
//! A date belongs to a phase when it falls within `[start_date, end_date]`.

use crate::TimeInterval;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// A named calendar window of the overall schedule
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub name: String,
    /// First day of the phase (inclusive)
    pub start_date: NaiveDate,
    /// Last day of the phase (inclusive)
    pub end_date: NaiveDate,
}

impl Phase {
    pub fn new(name: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            start_date,
            end_date,
        }
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.contains_date(at.date())
    }

    /// The scheduled window: midnight of the first day to 23:59:59 of the last
    pub fn scheduled_window(&self) -> TimeInterval {
        let start = self.start_date.and_time(NaiveTime::MIN);
        let end = self.end_date.and_time(NaiveTime::MIN) + Duration::seconds(86_399);
        TimeInterval::new(start, end)
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// The configured phases, in timetable order
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhaseTable {
    phases: Vec<Phase>,
}

impl PhaseTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a phase, replacing an existing phase with the same name in place
    pub fn insert(&mut self, phase: Phase) {
        match self.phases.iter_mut().find(|p| p.is_named(&phase.name)) {
            Some(existing) => *existing = phase,
            None => self.phases.push(phase),
        }
    }

    /// Look up a phase by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&Phase> {
        self.phases.iter().find(|p| p.is_named(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Phase> {
        self.phases.iter()
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Phases ordered by start date; equal starts keep timetable order
    pub fn by_start(&self) -> Vec<&Phase> {
        let mut ordered: Vec<&Phase> = self.phases.iter().collect();
        ordered.sort_by_key(|p| p.start_date);
        ordered
    }

    /// The first phase (in timetable order) containing the date
    pub fn for_date(&self, date: NaiveDate) -> Option<&Phase> {
        self.phases.iter().find(|p| p.contains_date(date))
    }

    /// Earliest start and latest end across all phases
    pub fn dates_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let start = self.phases.iter().map(|p| p.start_date).min()?;
        let end = self.phases.iter().map(|p| p.end_date).max()?;
        Some((start, end))
    }
}

impl FromIterator<Phase> for PhaseTable {
    fn from_iter<I: IntoIterator<Item = Phase>>(iter: I) -> Self {
        let mut table = PhaseTable::new();
        for phase in iter {
            table.insert(phase);
        }
        table
    }
}
