//! Progress queries over an analyzed model

use chrono::NaiveDate;
use revtrace_types::{ProcessId, ProcessModel};
use serde::{Deserialize, Serialize};

/// Processes still held up by one phase on a given date
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StuckGroup {
    pub phase: String,
    pub processes: Vec<ProcessId>,
}

/// Group processes by the first phase they had not completed on `date`.
///
/// Phases are taken in start order and those starting after `date` are not
/// considered. A phase with no recorded completion for a process does not
/// hold that process. Every considered phase gets a group, possibly empty.
pub fn stuck_processes_on(model: &ProcessModel, date: NaiveDate) -> Vec<StuckGroup> {
    let phases: Vec<_> = model
        .phases_by_start()
        .into_iter()
        .take_while(|p| p.start_date <= date)
        .collect();
    let mut groups: Vec<StuckGroup> = phases
        .iter()
        .map(|p| StuckGroup {
            phase: p.name.clone(),
            processes: Vec::new(),
        })
        .collect();

    for process in &model.processes {
        let blocking = phases.iter().position(|phase| {
            process
                .phase_completion(&phase.name)
                .is_some_and(|done| done > date)
        });
        if let Some(idx) = blocking {
            groups[idx].processes.push(process.id.clone());
        }
    }
    groups
}

/// Outcome counts for one phase across all processes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSummary {
    pub phase: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Processes with a recorded completion date
    pub evaluated: usize,
    /// Completed on or before the phase end
    pub completed_on_time: usize,
    pub completed_late: usize,
    /// Delayed tasks whose action belongs to this phase
    pub delayed_tasks: usize,
}

/// Summarize every configured phase, in timetable order
pub fn phase_summary(model: &ProcessModel) -> Vec<PhaseSummary> {
    model
        .phases
        .iter()
        .map(|phase| {
            let dates: Vec<NaiveDate> = model
                .processes
                .iter()
                .filter_map(|p| p.phase_completion(&phase.name))
                .collect();
            let completed_on_time = dates.iter().filter(|d| **d <= phase.end_date).count();

            let delayed_tasks = model
                .processes
                .iter()
                .flat_map(|p| p.threads.iter())
                .flat_map(|t| t.tasks.iter())
                .filter(|task| task.is_delayed)
                .filter(|task| {
                    model
                        .action_types
                        .get(&task.action_type)
                        .and_then(|a| a.phase_name.as_deref())
                        .is_some_and(|name| phase.is_named(name))
                })
                .count();

            PhaseSummary {
                phase: phase.name.clone(),
                start_date: phase.start_date,
                end_date: phase.end_date,
                evaluated: dates.len(),
                completed_on_time,
                completed_late: dates.len() - completed_on_time,
                delayed_tasks,
            }
        })
        .collect()
}
