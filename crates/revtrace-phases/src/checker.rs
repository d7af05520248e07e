use crate::rules::{Completion, PhaseRule, RuleContext};
use revtrace_types::{Phase, ProcessInstance, ProcessModel};

/// Runs every phase rule over every process of a model
#[derive(Clone, Copy, Debug, Default)]
pub struct PhaseCompletenessChecker;

impl PhaseCompletenessChecker {
    pub fn new() -> Self {
        Self
    }

    /// Compute and record a completion date for each (phase, process) pair.
    ///
    /// Phases without a rule are skipped, as are processes without threads.
    /// Tasks found late are flagged in place. Returns whether at least one
    /// date was recorded.
    pub fn determine_phase_completeness_dates(&self, model: &mut ProcessModel) -> bool {
        if model.phases.is_empty() || model.processes.is_empty() || model.actors.is_empty() {
            tracing::warn!(
                phases = model.phases.len(),
                processes = model.processes.len(),
                actors = model.actors.len(),
                "Nothing to analyze"
            );
            return false;
        }

        let ProcessModel {
            phases,
            actors,
            processes,
            ..
        } = model;
        let ctx = RuleContext::new(phases, actors);

        let mut recorded = 0usize;
        let mut fallbacks = 0usize;
        for process in processes.iter_mut().filter(|p| !p.threads.is_empty()) {
            for phase in phases.iter() {
                let Some(completion) = self.phase_completeness_date(&ctx, phase, process) else {
                    continue;
                };
                if !completion.is_reached() {
                    fallbacks += 1;
                }
                tracing::debug!(
                    process_id = %process.id,
                    phase = %phase.name,
                    date = %completion.date(),
                    reached = completion.is_reached(),
                    "Phase completion"
                );
                process.record_phase_done(&phase.name, completion.date());
                recorded += 1;
            }
        }

        tracing::info!(recorded, fallbacks, "Phase completeness analysis finished");
        recorded > 0
    }

    /// Completion of one phase for one process; `None` when the phase has no
    /// rule or the process has no tasks
    pub fn phase_completeness_date(
        &self,
        ctx: &RuleContext<'_>,
        phase: &Phase,
        process: &mut ProcessInstance,
    ) -> Option<Completion> {
        PhaseRule::for_phase(&phase.name)?.evaluate(ctx, phase, process)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use revtrace_types::roles::{self, RolePriority};
    use revtrace_types::{Actor, ActorId, ProcessId, TaskInstance, TimeInterval};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn model() -> ProcessModel {
        let mut model = ProcessModel::new();
        model.phases.insert(Phase::new("Submission", day(1), day(3)));
        model.phases.insert(Phase::new(crate::ROUND_1_DECISION, day(4), day(6)));
        model.phases.insert(Phase::new(crate::FINAL_DECISION, day(10), day(12)));

        let chair = ActorId::new("C1");
        let mut actor = Actor::new(chair.clone(), day(1).and_hms_opt(0, 0, 0).unwrap());
        actor.add_role(roles::PAPER_CHAIR, &RolePriority::default());
        model.actors.insert(chair.clone(), actor);

        let mut process = ProcessInstance::new(ProcessId::new("S1"));
        for (id, d) in [("t1", 5), ("t2", 11)] {
            let at = day(d).and_hms_opt(9, 0, 0).unwrap();
            let task =
                TaskInstance::new(id, "makes decision", chair.clone(), TimeInterval::instant(at));
            process
                .get_or_create_thread(&chair, Some(roles::PAPER_CHAIR))
                .add_task(task);
        }
        model.processes.push(process);
        model.processes.push(ProcessInstance::new(ProcessId::new("S2")));
        model
    }

    #[test]
    fn test_records_dates_for_ruled_phases() {
        let mut model = model();
        assert!(PhaseCompletenessChecker::new().determine_phase_completeness_dates(&mut model));

        let s1 = &model.processes[0];
        assert_eq!(s1.phase_completion(crate::ROUND_1_DECISION), Some(day(5)));
        assert_eq!(s1.phase_completion(crate::FINAL_DECISION), Some(day(11)));
        assert_eq!(s1.phase_completion("Submission"), None);
        assert!(model.processes[1].phase_done.is_empty());
    }

    #[test]
    fn test_records_in_phase_table_order() {
        let mut model = model();
        PhaseCompletenessChecker::new().determine_phase_completeness_dates(&mut model);
        let names: Vec<&str> = model.processes[0]
            .phase_done
            .iter()
            .map(|c| c.phase.as_str())
            .collect();
        assert_eq!(names, vec![crate::ROUND_1_DECISION, crate::FINAL_DECISION]);
    }

    #[test]
    fn test_empty_model_reports_nothing() {
        let mut model = ProcessModel::new();
        assert!(!PhaseCompletenessChecker::new().determine_phase_completeness_dates(&mut model));

        let mut no_actors = self::model();
        no_actors.actors.clear();
        let checker = PhaseCompletenessChecker::new();
        assert!(!checker.determine_phase_completeness_dates(&mut no_actors));
    }

    #[test]
    fn test_rerun_overwrites() {
        let mut model = model();
        let checker = PhaseCompletenessChecker::new();
        checker.determine_phase_completeness_dates(&mut model);
        checker.determine_phase_completeness_dates(&mut model);
        assert_eq!(model.processes[0].phase_done.len(), 2);
    }
}
