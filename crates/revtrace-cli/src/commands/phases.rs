//! `phases`: completion dates per process and phase

use super::Session;
use crate::error::CliResult;
use crate::output::{print_heading, print_structured, table, OutputFormat};
use chrono::NaiveDate;
use revtrace_phases::{phase_summary, PhaseSummary};
use revtrace_types::{PhaseCompletion, ProcessId, ProcessModel};
use serde::Serialize;
use tabled::Tabled;

#[derive(Debug, Serialize)]
pub struct ProcessPhases {
    pub process: ProcessId,
    pub delayed_tasks: usize,
    pub completions: Vec<PhaseCompletion>,
}

#[derive(Debug, Serialize)]
pub struct PhasesReport {
    pub processes: Vec<ProcessPhases>,
    pub summary: Vec<PhaseSummary>,
}

#[derive(Tabled)]
struct CompletionRow {
    process: String,
    phase: String,
    completed: NaiveDate,
    timing: &'static str,
}

#[derive(Tabled)]
struct SummaryRow {
    phase: String,
    evaluated: usize,
    on_time: usize,
    late: usize,
    delayed_tasks: usize,
}

impl PhasesReport {
    pub fn from_model(model: &ProcessModel) -> Self {
        let processes = model
            .processes
            .iter()
            .map(|p| ProcessPhases {
                process: p.id.clone(),
                delayed_tasks: p.delayed_task_count(),
                completions: p.phase_done.clone(),
            })
            .collect();
        Self {
            processes,
            summary: phase_summary(model),
        }
    }
}

pub fn execute(session: &mut Session, format: OutputFormat) -> CliResult<()> {
    session.analyze();
    let model = &session.model;
    let report = PhasesReport::from_model(model);
    if print_structured(&report, format)? {
        return Ok(());
    }

    let rows: Vec<CompletionRow> = report
        .processes
        .iter()
        .flat_map(|p| {
            p.completions.iter().map(move |c| CompletionRow {
                process: p.process.to_string(),
                phase: c.phase.clone(),
                completed: c.date,
                timing: match model.phases.get(&c.phase) {
                    Some(phase) if c.date > phase.end_date => "late",
                    _ => "on time",
                },
            })
        })
        .collect();
    print_heading("Completion dates");
    println!("{}", table(rows));
    println!();

    print_heading("Delayed tasks");
    for p in report.processes.iter().filter(|p| p.delayed_tasks > 0) {
        println!("  {}: {}", p.process, p.delayed_tasks);
    }
    println!();

    let summary: Vec<SummaryRow> = report
        .summary
        .into_iter()
        .map(|s| SummaryRow {
            phase: s.phase,
            evaluated: s.evaluated,
            on_time: s.completed_on_time,
            late: s.completed_late,
            delayed_tasks: s.delayed_tasks,
        })
        .collect();
    print_heading("Per phase");
    println!("{}", table(summary));
    Ok(())
}
