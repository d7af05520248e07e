//! Phase completeness analysis for reconstructed review processes
//!
//! Each configured review phase has a heuristic that decides when a
//! submission's process satisfied that phase's activity threshold. The
//! heuristics live in [`PhaseRule`], one variant per phase; the
//! [`PhaseCompletenessChecker`] runs them over a whole model and records the
//! results in each process's `phase_done` list. Tasks found late are flagged
//! `is_delayed` in place.
//!
//! After analysis, [`stuck_processes_on`] and [`phase_summary`] answer
//! progress questions without mutating the model.

#![deny(unsafe_code)]

mod checker;
mod progress;
mod rules;

pub use checker::PhaseCompletenessChecker;
pub use progress::{phase_summary, stuck_processes_on, PhaseSummary, StuckGroup};
pub use rules::*;
