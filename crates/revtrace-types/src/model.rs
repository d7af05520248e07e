//! The process model aggregate handed to downstream consumers
//!
//! After loading and analysis finish, consumers only read from the model.

use crate::roles::{self, RolePriority};
use crate::{
    ActionTypeRegistry, Actor, ActorId, Phase, PhaseTable, ProcessId, ProcessInstance,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Locates one task inside the model
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRef {
    pub process_id: ProcessId,
    pub actor_id: ActorId,
    pub task_id: String,
}

/// Everything reconstructed from configuration and the event log
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProcessModel {
    pub phases: PhaseTable,
    pub action_types: ActionTypeRegistry,
    /// Known role names: configured priority order first, then first-seen order
    pub actor_roles: Vec<String>,
    /// Ordering used to resolve each actor's general role
    pub role_priority: RolePriority,
    pub actors: BTreeMap<ActorId, Actor>,
    /// Processes in order of first appearance in the log
    pub processes: Vec<ProcessInstance>,
}

impl ProcessModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a role priority ordering and seed the known roles with it
    pub fn with_role_priority(mut self, priority: RolePriority) -> Self {
        for role in priority.roles() {
            self.register_role(role);
        }
        self.role_priority = priority;
        self
    }

    /// Add a role name to `actor_roles` unless it is a placeholder or already known
    pub fn register_role(&mut self, role: &str) {
        roles::register_role(&mut self.actor_roles, role);
    }

    pub fn is_known_role(&self, role: &str) -> bool {
        self.actor_roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }

    pub fn actor(&self, id: &ActorId) -> Option<&Actor> {
        self.actors.get(id)
    }

    pub fn process(&self, id: &ProcessId) -> Option<&ProcessInstance> {
        self.processes.iter().find(|p| &p.id == id)
    }

    pub fn task_count(&self) -> usize {
        self.processes.iter().map(ProcessInstance::task_count).sum()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phases_by_start(&self) -> Vec<&Phase> {
        self.phases.by_start()
    }

    pub fn phase_for_date(&self, date: NaiveDate) -> Option<&Phase> {
        self.phases.for_date(date)
    }

    pub fn phase_dates_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.phases.dates_range()
    }

    /// Actors grouped by the order of their general role in `actor_roles`,
    /// then by id. Actors whose role is not listed are left out. Without at
    /// least two known roles, all actors are returned ordered by id.
    pub fn actors_sorted<'a, I>(&'a self, ids: I) -> Vec<&'a Actor>
    where
        I: IntoIterator<Item = &'a ActorId>,
    {
        let mut actors: Vec<&Actor> = ids.into_iter().filter_map(|id| self.actor(id)).collect();
        actors.sort_by(|a, b| a.id.cmp(&b.id));
        actors.dedup_by(|a, b| a.id == b.id);
        if self.actor_roles.len() < 2 {
            return actors;
        }
        let mut sorted: Vec<&Actor> = Vec::with_capacity(actors.len());
        for role in &self.actor_roles {
            sorted.extend(
                actors
                    .iter()
                    .copied()
                    .filter(|a| a.general_role.as_deref() == Some(role.as_str())),
            );
        }
        sorted
    }

    /// Processes by lifetime end, latest first; processes without tasks last
    pub fn processes_by_end_desc(&self) -> Vec<&ProcessInstance> {
        let mut sorted: Vec<&ProcessInstance> = self.processes.iter().collect();
        sorted.sort_by(|a, b| {
            let end_a = a.lifetime().map(|l| l.end);
            let end_b = b.lifetime().map(|l| l.end);
            end_b.cmp(&end_a)
        });
        sorted
    }

    /// Action name → day → number of tasks
    pub fn action_counts_by_day(&self) -> BTreeMap<String, BTreeMap<NaiveDate, usize>> {
        let mut counts: BTreeMap<String, BTreeMap<NaiveDate, usize>> = BTreeMap::new();
        for process in &self.processes {
            for thread in &process.threads {
                for task in &thread.tasks {
                    *counts
                        .entry(task.action_type.clone())
                        .or_default()
                        .entry(task.date())
                        .or_insert(0) += 1;
                }
            }
        }
        counts
    }

    /// Action name → day → tasks
    pub fn tasks_by_action_and_day(&self) -> BTreeMap<String, BTreeMap<NaiveDate, Vec<TaskRef>>> {
        let mut tasks: BTreeMap<String, BTreeMap<NaiveDate, Vec<TaskRef>>> = BTreeMap::new();
        for process in &self.processes {
            for thread in &process.threads {
                for task in &thread.tasks {
                    tasks
                        .entry(task.action_type.clone())
                        .or_default()
                        .entry(task.date())
                        .or_default()
                        .push(TaskRef {
                            process_id: process.id.clone(),
                            actor_id: thread.actor.clone(),
                            task_id: task.id.clone(),
                        });
                }
            }
        }
        tasks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TaskInstance, TimeInterval};
    use chrono::NaiveDateTime;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, day)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn model_with_two_processes() -> ProcessModel {
        let mut model = ProcessModel::new();
        for (pid, actor, day) in [("S1", "A1", 3), ("S1", "A2", 4), ("S2", "A1", 8)] {
            let actor_id = ActorId::new(actor);
            model
                .actors
                .entry(actor_id.clone())
                .or_insert_with(|| Actor::new(actor_id.clone(), at(day)))
                .observe(at(day));
            let pid = ProcessId::new(pid);
            if model.process(&pid).is_none() {
                model.processes.push(ProcessInstance::new(pid.clone()));
            }
            let process = model.processes.iter_mut().find(|p| p.id == pid).unwrap();
            let task_id = format!("{}-{}", pid, actor);
            process
                .get_or_create_thread(&actor_id, None)
                .add_task(TaskInstance::new(
                    task_id,
                    "comments",
                    actor_id.clone(),
                    TimeInterval::instant(at(day)),
                ));
        }
        model
    }

    #[test]
    fn test_register_role_skips_sentinels_and_duplicates() {
        let mut model = ProcessModel::new()
            .with_role_priority(RolePriority::from_lines("Paper Chair\nPC Member"));
        model.register_role("pc member");
        model.register_role("any");
        model.register_role("External Reviewer");
        assert_eq!(
            model.actor_roles,
            vec!["Paper Chair", "PC Member", "External Reviewer"]
        );
    }

    #[test]
    fn test_action_counts_by_day() {
        let model = model_with_two_processes();
        let counts = model.action_counts_by_day();
        let days = &counts["comments"];
        assert_eq!(days.len(), 3);
        assert_eq!(days[&at(3).date()], 1);
        assert_eq!(model.task_count(), 3);
    }

    #[test]
    fn test_tasks_by_action_and_day() {
        let model = model_with_two_processes();
        let tasks = model.tasks_by_action_and_day();
        let refs = &tasks["comments"][&at(8).date()];
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].process_id, ProcessId::new("S2"));
    }

    #[test]
    fn test_processes_by_end_desc() {
        let mut model = model_with_two_processes();
        model.processes.push(ProcessInstance::new(ProcessId::new("empty")));
        let order: Vec<_> = model
            .processes_by_end_desc()
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(order, vec!["S2", "S1", "empty"]);
    }

    #[test]
    fn test_actors_sorted_by_role_order() {
        let mut model = model_with_two_processes()
            .with_role_priority(RolePriority::from_lines("Paper Chair\nPC Member"));
        let priority = model.role_priority.clone();
        model
            .actors
            .get_mut(&ActorId::new("A1"))
            .unwrap()
            .add_role("PC Member", &priority);
        model
            .actors
            .get_mut(&ActorId::new("A2"))
            .unwrap()
            .add_role("Paper Chair", &priority);
        let ids: Vec<ActorId> = model.actors.keys().cloned().collect();
        let sorted: Vec<_> = model
            .actors_sorted(ids.iter())
            .iter()
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(sorted, vec!["A2", "A1"]);
    }
}
