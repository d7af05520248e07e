//! `summary`: what was loaded

use super::Session;
use crate::error::CliResult;
use crate::output::{print_heading, print_structured, print_warning, table, OutputFormat};
use chrono::NaiveDate;
use revtrace_ingest::SkippedRow;
use serde::Serialize;
use tabled::Tabled;

#[derive(Debug, Serialize, Tabled)]
pub struct PhaseRow {
    pub phase: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct SummaryReport {
    pub processes: usize,
    pub actors: usize,
    pub action_types: usize,
    pub roles: Vec<String>,
    pub tasks: usize,
    pub rows: usize,
    pub unresolved_roles: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<char>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_pattern: Option<String>,
    pub skipped: Vec<SkippedRow>,
    pub phases: Vec<PhaseRow>,
}

impl SummaryReport {
    pub fn from_session(session: &Session) -> Self {
        let model = &session.model;
        let report = &session.report;
        Self {
            processes: model.processes.len(),
            actors: model.actors.len(),
            action_types: model.action_types.len(),
            roles: model.actor_roles.clone(),
            tasks: model.task_count(),
            rows: report.rows,
            unresolved_roles: report.unresolved_roles,
            delimiter: report.delimiter,
            timestamp_pattern: report.timestamp_pattern.clone(),
            skipped: report.skipped.clone(),
            phases: model
                .phases
                .iter()
                .map(|p| PhaseRow {
                    phase: p.name.clone(),
                    start: p.start_date,
                    end: p.end_date,
                })
                .collect(),
        }
    }
}

pub fn execute(session: &Session, format: OutputFormat) -> CliResult<()> {
    let report = SummaryReport::from_session(session);
    if print_structured(&report, format)? {
        return Ok(());
    }

    print_heading("Model");
    println!("Processes:    {}", report.processes);
    println!("Actors:       {}", report.actors);
    println!("Action types: {}", report.action_types);
    println!("Tasks:        {}", report.tasks);
    println!("Roles:        {}", report.roles.join(", "));
    println!();

    print_heading("Log");
    println!("Rows:         {}", report.rows);
    if let Some(pattern) = &report.timestamp_pattern {
        println!("Date pattern: {pattern}");
    }
    if let Some(delimiter) = report.delimiter {
        println!("Delimiter:    {delimiter:?}");
    }
    println!("Skipped:      {}", report.skipped.len());
    for row in &report.skipped {
        println!("  line {}: {}", row.line, row.reason);
    }
    if report.unresolved_roles > 0 {
        print_warning(&format!("{} rows without a resolvable actor role", report.unresolved_roles));
    }
    println!();

    print_heading("Phases");
    println!("{}", table(report.phases));
    Ok(())
}
