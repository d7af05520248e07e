//! Error types for ingestion
//!
//! Only fatal conditions are errors. Malformed rows are skipped and reported
//! through [`LoadReport`](crate::LoadReport) instead.

use crate::ColumnRole;
use std::path::PathBuf;

/// Errors that abort a configuration or log load
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error while reading input: {0}")]
    Read(#[from] std::io::Error),

    #[error("Invalid text pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Unrecognized date format: {0}")]
    UnrecognizedDateFormat(String),

    #[error("No field with the {0} detected")]
    MissingColumn(ColumnRole),

    #[error("No header row with at least 3 fields found")]
    MissingHeader,

    #[error("Malformed phase timetable row {line}: {reason}")]
    InvalidPhaseRow { line: usize, reason: String },

    #[error("Failed to load information about phases and their times")]
    EmptyPhaseTimetable,

    #[error("Failed to load any process")]
    NoProcesses,
}

impl IngestError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for ingestion operations
pub type IngestResult<T> = Result<T, IngestError>;
