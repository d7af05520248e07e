//! Process threads: one actor's actions within one process

use crate::{ActorId, ProcessId, TaskInstance, TimeInterval};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One actor's chronological sequence of tasks within one process
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessThread {
    /// Process that owns this thread
    pub process_id: ProcessId,
    /// The acting actor
    pub actor: ActorId,
    /// Role in this process, e.g. "primary", "secondary", "external"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Tasks in log order; chronological once the process is tidied
    pub tasks: Vec<TaskInstance>,
}

impl ProcessThread {
    pub fn new(process_id: ProcessId, actor: ActorId, role: Option<String>) -> Self {
        Self {
            process_id,
            actor,
            role,
            tasks: Vec::new(),
        }
    }

    /// Append a task unless a task with the same id is already present.
    /// Returns whether the task was added.
    pub fn add_task(&mut self, task: TaskInstance) -> bool {
        if self.tasks.iter().any(|t| t.id == task.id) {
            return false;
        }
        self.tasks.push(task);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Order tasks by start time. Stable: same-instant tasks keep log order.
    pub fn sort_tasks(&mut self) {
        self.tasks.sort_by_key(|t| t.actual.start);
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    /// Start of the first task
    pub fn first_start(&self) -> Option<NaiveDateTime> {
        self.tasks.first().map(|t| t.actual.start)
    }

    /// Envelope of all task intervals
    pub fn lifetime(&self) -> Option<TimeInterval> {
        let mut tasks = self.tasks.iter();
        let first = tasks.next()?.actual;
        Some(tasks.fold(first, |acc, t| acc.union(&t.actual)))
    }

    /// Whether the thread only records a declined invitation
    pub fn only_declined(&self) -> bool {
        self.tasks.len() == 1 && self.tasks[0].action_contains("declines")
    }
}
