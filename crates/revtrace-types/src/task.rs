//! Task instances: single logged action occurrences

use crate::{ActorId, TimeInterval};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One logged action
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInstance {
    pub id: String,
    /// Name of the action type
    pub action_type: String,
    /// First entry is the performer, the rest are targets
    pub actors_involved: Vec<ActorId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
    pub actual: TimeInterval,
    /// Window of the governing phase, when the action type has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled: Option<TimeInterval>,
    /// Set by phase analysis
    #[serde(default)]
    pub is_delayed: bool,
}

impl TaskInstance {
    pub fn new(
        id: impl Into<String>,
        action_type: impl Into<String>,
        performer: ActorId,
        actual: TimeInterval,
    ) -> Self {
        Self {
            id: id.into(),
            action_type: action_type.into(),
            actors_involved: vec![performer],
            status: None,
            outcome: None,
            actual,
            scheduled: None,
            is_delayed: false,
        }
    }

    pub fn performer(&self) -> Option<&ActorId> {
        self.actors_involved.first()
    }

    /// Actors the action was directed at
    pub fn targets(&self) -> &[ActorId] {
        self.actors_involved.get(1..).unwrap_or(&[])
    }

    /// Append a target actor, ignoring repeats
    pub fn add_target(&mut self, actor: ActorId) {
        if !self.actors_involved.contains(&actor) {
            self.actors_involved.push(actor);
        }
    }

    /// Calendar date on which the task started
    pub fn date(&self) -> NaiveDate {
        self.actual.start.date()
    }

    /// Case-insensitive substring test on the action name
    pub fn action_contains(&self, needle: &str) -> bool {
        self.action_type
            .to_lowercase()
            .contains(&needle.to_lowercase())
    }

    /// Case-insensitive suffix test on the action name
    pub fn action_ends_with(&self, suffix: &str) -> bool {
        self.action_type
            .to_lowercase()
            .ends_with(&suffix.to_lowercase())
    }

    pub fn has_status(&self, status: &str) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case(status))
    }

    /// A review task whose status says it is complete
    pub fn is_completed_review(&self) -> bool {
        self.action_ends_with("review") && self.has_status("complete")
    }
}
