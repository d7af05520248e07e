//! `progress`: which phase holds up each process on a date

use super::Session;
use crate::error::CliResult;
use crate::output::{print_heading, print_structured, OutputFormat};
use chrono::NaiveDate;
use colored::*;
use revtrace_phases::{stuck_processes_on, StuckGroup};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ProgressReport {
    pub date: NaiveDate,
    pub groups: Vec<StuckGroup>,
}

pub fn execute(session: &mut Session, date: NaiveDate, format: OutputFormat) -> CliResult<()> {
    session.analyze();
    let report = ProgressReport {
        date,
        groups: stuck_processes_on(&session.model, date),
    };
    if print_structured(&report, format)? {
        return Ok(());
    }

    print_heading(&format!("Progress on {date}"));
    if report.groups.is_empty() {
        println!("{}", "No phase had started".dimmed());
    }
    for group in &report.groups {
        let ids: Vec<&str> = group.processes.iter().map(|p| p.as_str()).collect();
        println!("{} ({})", group.phase, ids.len());
        if !ids.is_empty() {
            println!("  {}", ids.join(", "));
        }
    }
    Ok(())
}
