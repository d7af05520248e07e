//! Event-log ingestion for peer-review workflows
//!
//! Turns configuration files and a loosely-schematized CSV event log into a
//! [`ProcessModel`](revtrace_types::ProcessModel).
//!
//! # Architecture
//!
//! - [`LogSchema`]: assigns semantic roles to header columns
//! - [`TimestampFormat`]: picks the date pattern from the first sample
//! - [`record`]: delimiter detection and quote-aware field splitting
//! - [`config`]: phase timetable, action mappings, encodings, `roles.txt`
//! - [`assignment`]: pure parsing of assignment and role-change text
//! - [`LogLoader`]: the single-pass ingestion pipeline
//!
//! # Example
//!
//! ```rust
//! use revtrace_ingest::LogLoader;
//!
//! let log = "SubmissionID,Date,Actor,Action,Param\n\
//!            S1,2025-01-10,A1,submits,\n\
//!            S1,2025-01-12,A2,assigns A3 as primary,\n";
//!
//! let mut loader = LogLoader::new();
//! let report = loader.ingest_log(log.as_bytes()).unwrap();
//! assert_eq!(report.tasks_added, 2);
//!
//! let model = loader.into_model();
//! assert_eq!(model.processes.len(), 1);
//! assert_eq!(model.actors.len(), 3);
//! ```

#![deny(unsafe_code)]

pub mod assignment;
pub mod config;
mod datetime;
mod errors;
mod pipeline;
pub mod record;
mod schema;

pub use config::InputPaths;
pub use datetime::TimestampFormat;
pub use errors::*;
pub use pipeline::{LoadReport, LoaderSettings, LogLoader, SkipReason, SkippedRow};
pub use schema::{ColumnRole, LogSchema, RequiredColumns};
