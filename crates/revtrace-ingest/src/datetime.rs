//! Timestamp pattern resolution
//!
//! A file uses one timestamp pattern throughout. The pattern is resolved
//! from an explicit first sample and then applied to every later value.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

const DATE_TIME_PATTERNS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_PATTERNS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%Y/%m/%d", "%d/%m/%Y"];

/// A resolved timestamp pattern
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimestampFormat {
    /// Date and time of day
    DateTime(&'static str),
    /// Date only; values parse to midnight
    Date(&'static str),
}

impl TimestampFormat {
    /// Resolve the pattern matching `sample`, trying date-time patterns first
    pub fn resolve(sample: &str) -> Option<Self> {
        let sample = normalize(sample);
        DATE_TIME_PATTERNS
            .iter()
            .find(|p| NaiveDateTime::parse_from_str(&sample, p).is_ok())
            .map(|p| Self::DateTime(*p))
            .or_else(|| {
                DATE_PATTERNS
                    .iter()
                    .find(|p| NaiveDate::parse_from_str(&sample, p).is_ok())
                    .map(|p| Self::Date(*p))
            })
    }

    pub fn pattern(&self) -> &'static str {
        match self {
            Self::DateTime(p) | Self::Date(p) => *p,
        }
    }

    /// Parse a value with this pattern; `None` when it does not match
    pub fn parse(&self, value: &str) -> Option<NaiveDateTime> {
        let value = normalize(value);
        match self {
            Self::DateTime(p) => NaiveDateTime::parse_from_str(&value, p).ok(),
            Self::Date(p) => NaiveDate::parse_from_str(&value, p)
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN)),
        }
    }

    /// Parse a value and keep only its calendar date
    pub fn parse_date(&self, value: &str) -> Option<NaiveDate> {
        self.parse(value).map(|dt| dt.date())
    }
}

/// Accept ISO-8601 `T` separators and a trailing `Z`
fn normalize(value: &str) -> String {
    let value = value.trim();
    let value = value.strip_suffix('Z').unwrap_or(value);
    value.replace('T', " ")
}
