//! Process instances: one submission's full event history
//!
//! A process owns one [`ProcessThread`] per actor and a live table of
//! role assignments that is edited as assignment and role-change events
//! are read from the log.

use crate::{ActorId, ProcessThread, TimeInterval};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ── Process Identifier ───────────────────────────────────────────────

/// Log-supplied process (submission) identifier
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProcessId(pub String);

impl ProcessId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProcessId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProcessId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// ── Role Assignments ─────────────────────────────────────────────────

/// One row of the live role table
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub actor: ActorId,
    pub role: String,
}

/// Actor → role within one process, in assignment order
///
/// Order matters: a role change rewrites the *first* row holding the old
/// role.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleAssignments {
    entries: Vec<RoleAssignment>,
}

impl RoleAssignments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, actor: &ActorId) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| &e.actor == actor)
            .map(|e| e.role.as_str())
    }

    pub fn contains(&self, actor: &ActorId) -> bool {
        self.get(actor).is_some()
    }

    /// Set an actor's role, overwriting any earlier assignment in place
    pub fn set(&mut self, actor: ActorId, role: impl Into<String>) {
        let role = role.into();
        match self.entries.iter_mut().find(|e| e.actor == actor) {
            Some(entry) => entry.role = role,
            None => self.entries.push(RoleAssignment { actor, role }),
        }
    }

    /// Record a role only when the actor has none yet. Returns whether it was recorded.
    pub fn insert_if_absent(&mut self, actor: ActorId, role: impl Into<String>) -> bool {
        if self.contains(&actor) {
            return false;
        }
        self.entries.push(RoleAssignment {
            actor,
            role: role.into(),
        });
        true
    }

    /// Rewrite the first row whose role equals `from` (case-insensitive).
    /// Returns the affected actor.
    pub fn reassign_first(&mut self, from: &str, to: &str) -> Option<ActorId> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.role.eq_ignore_ascii_case(from))?;
        entry.role = to.to_string();
        Some(entry.actor.clone())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoleAssignment> {
        self.entries.iter()
    }
}

// ── Phase State ──────────────────────────────────────────────────────

/// What a process did within one configured phase
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseState {
    pub name: String,
    /// The phase window
    pub scheduled: TimeInterval,
    /// Envelope of the tasks attributed to the phase
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<TimeInterval>,
    pub task_ids: Vec<String>,
    pub actors: Vec<ActorId>,
}

impl PhaseState {
    pub fn new(name: impl Into<String>, scheduled: TimeInterval) -> Self {
        Self {
            name: name.into(),
            scheduled,
            actual: None,
            task_ids: Vec::new(),
            actors: Vec::new(),
        }
    }

    /// Attribute a task to this phase
    pub fn record(&mut self, task_id: &str, actor: &ActorId, at: NaiveDateTime) {
        self.task_ids.push(task_id.to_string());
        if !self.actors.contains(actor) {
            self.actors.push(actor.clone());
        }
        match &mut self.actual {
            Some(actual) => actual.extend_to(at),
            None => self.actual = Some(TimeInterval::instant(at)),
        }
    }

    /// Whether activity in this phase ran past its scheduled end
    pub fn is_delayed(&self) -> bool {
        self.actual
            .is_some_and(|actual| actual.end > self.scheduled.end)
    }
}

/// The date on which a phase was judged complete for a process
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseCompletion {
    pub phase: String,
    pub date: NaiveDate,
}

// ── Process Instance ─────────────────────────────────────────────────

/// Process type label used for every reconstructed instance
pub const SUBMISSION: &str = "SUBMISSION";

/// One submission's reconstructed history
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProcessInstance {
    pub id: ProcessId,
    pub process_type: String,
    /// Current role of each actor within this process
    pub role_assignments: RoleAssignments,
    /// Exactly one thread per actor
    pub threads: Vec<ProcessThread>,
    /// Per-phase activity
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub states: Vec<PhaseState>,
    /// Phase completion dates, in evaluation order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phase_done: Vec<PhaseCompletion>,
}

impl ProcessInstance {
    pub fn new(id: ProcessId) -> Self {
        Self {
            id,
            process_type: SUBMISSION.to_string(),
            role_assignments: RoleAssignments::new(),
            threads: Vec::new(),
            states: Vec::new(),
            phase_done: Vec::new(),
        }
    }

    pub fn thread(&self, actor: &ActorId) -> Option<&ProcessThread> {
        self.threads.iter().find(|t| &t.actor == actor)
    }

    pub fn thread_mut(&mut self, actor: &ActorId) -> Option<&mut ProcessThread> {
        self.threads.iter_mut().find(|t| &t.actor == actor)
    }

    pub fn has_thread(&self, actor: &ActorId) -> bool {
        self.thread(actor).is_some()
    }

    /// Find the actor's thread or create it.
    ///
    /// A provided role overwrites the thread's role: later, more specific
    /// assignments win.
    pub fn get_or_create_thread(
        &mut self,
        actor: &ActorId,
        role: Option<&str>,
    ) -> &mut ProcessThread {
        let idx = match self.threads.iter().position(|t| &t.actor == actor) {
            Some(idx) => {
                if let Some(role) = role {
                    self.threads[idx].role = Some(role.to_string());
                }
                idx
            }
            None => {
                self.threads.push(ProcessThread::new(
                    self.id.clone(),
                    actor.clone(),
                    role.map(str::to_string),
                ));
                self.threads.len() - 1
            }
        };
        &mut self.threads[idx]
    }

    /// Drop threads without tasks, put each thread's tasks in time order and
    /// order the threads by their first task
    pub fn clean_and_sort_threads(&mut self) {
        self.threads.retain(|t| !t.is_empty());
        for thread in &mut self.threads {
            thread.sort_tasks();
        }
        self.threads.sort_by_key(|t| t.first_start());
    }

    /// Envelope of all thread lifetimes
    pub fn lifetime(&self) -> Option<TimeInterval> {
        self.threads
            .iter()
            .filter_map(ProcessThread::lifetime)
            .reduce(|acc, life| acc.union(&life))
    }

    /// Get the state for a phase, creating it with the given window
    pub fn state_mut(&mut self, name: &str, scheduled: TimeInterval) -> &mut PhaseState {
        let idx = match self.states.iter().position(|s| s.name == name) {
            Some(idx) => idx,
            None => {
                self.states.push(PhaseState::new(name, scheduled));
                self.states.len() - 1
            }
        };
        &mut self.states[idx]
    }

    pub fn state(&self, name: &str) -> Option<&PhaseState> {
        self.states.iter().find(|s| s.name == name)
    }

    /// Record (or overwrite) the completion date of a phase
    pub fn record_phase_done(&mut self, phase: &str, date: NaiveDate) {
        match self.phase_done.iter_mut().find(|c| c.phase == phase) {
            Some(existing) => existing.date = date,
            None => self.phase_done.push(PhaseCompletion {
                phase: phase.to_string(),
                date,
            }),
        }
    }

    pub fn phase_completion(&self, phase: &str) -> Option<NaiveDate> {
        self.phase_done
            .iter()
            .find(|c| c.phase.eq_ignore_ascii_case(phase))
            .map(|c| c.date)
    }

    pub fn task_count(&self) -> usize {
        self.threads.iter().map(|t| t.tasks.len()).sum()
    }

    pub fn delayed_task_count(&self) -> usize {
        self.threads
            .iter()
            .flat_map(|t| t.tasks.iter())
            .filter(|t| t.is_delayed)
            .count()
    }
}
