//! Actors: people appearing in the log
//!
//! An actor accumulates a tally of every role it was seen in. Its
//! `general_role` is the single best label for the whole log, resolved
//! against the configured [`RolePriority`]; per-process roles are tracked
//! separately in `process_roles`.

use crate::roles::{self, RolePriority};
use crate::{ProcessId, TimeInterval};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stable, log-supplied actor identifier
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(pub String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ActorId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// How many times an actor was seen in a role
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCount {
    pub role: String,
    pub count: u32,
}

/// A person taking part in one or more processes
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    /// Best-known lifetime role
    #[serde(skip_serializing_if = "Option::is_none")]
    pub general_role: Option<String>,
    /// Role tally in first-seen order
    role_counts: Vec<RoleCount>,
    /// Role held in each process the actor took part in
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub process_roles: BTreeMap<ProcessId, String>,
    /// Earliest timestamp at which the actor appears
    pub start: NaiveDateTime,
    /// Latest timestamp at which the actor appears
    pub end: NaiveDateTime,
}

impl Actor {
    /// Create an actor first seen at `at`
    pub fn new(id: ActorId, at: NaiveDateTime) -> Self {
        Self {
            id,
            general_role: None,
            role_counts: Vec::new(),
            process_roles: BTreeMap::new(),
            start: at,
            end: at,
        }
    }

    /// Extend the `[start, end]` envelope to include `at`
    pub fn observe(&mut self, at: NaiveDateTime) {
        if at < self.start {
            self.start = at;
        }
        if at > self.end {
            self.end = at;
        }
    }

    pub fn lifetime(&self) -> TimeInterval {
        TimeInterval::new(self.start, self.end)
    }

    /// Count one more occurrence of `role` and re-resolve `general_role`
    pub fn add_role(&mut self, role: &str, priority: &RolePriority) {
        match self.role_counts.iter_mut().find(|rc| rc.role == role) {
            Some(rc) => rc.count += 1,
            None => self.role_counts.push(RoleCount {
                role: role.to_string(),
                count: 1,
            }),
        }
        self.general_role = self.resolve_general_role(priority);
    }

    pub fn role_count(&self, role: &str) -> u32 {
        self.role_counts
            .iter()
            .find(|rc| rc.role == role)
            .map_or(0, |rc| rc.count)
    }

    pub fn roles(&self) -> &[RoleCount] {
        &self.role_counts
    }

    /// Resolve the single best label for this actor.
    ///
    /// With a priority ordering, the first ordered role the actor has held
    /// wins. Otherwise (or when none of its roles are ordered) the most
    /// frequent role wins, ties going to the earliest seen. `any` never wins.
    pub fn resolve_general_role(&self, priority: &RolePriority) -> Option<String> {
        if !priority.is_empty() {
            let held = self.role_counts.iter().map(|rc| rc.role.as_str());
            if let Some(role) = priority.first_held(held) {
                return Some(role.to_string());
            }
        }
        let mut best: Option<&RoleCount> = None;
        for rc in &self.role_counts {
            if rc.role.eq_ignore_ascii_case(roles::ANY) {
                continue;
            }
            if best.map_or(true, |b| rc.count > b.count) {
                best = Some(rc);
            }
        }
        best.map(|rc| rc.role.clone())
    }

    pub fn main_role(&self) -> Option<&str> {
        self.general_role.as_deref()
    }

    pub fn role_in(&self, process: &ProcessId) -> Option<&str> {
        self.process_roles.get(process).map(String::as_str)
    }

    /// Whether the actor held a committee reviewer role in any process
    pub fn reviewed_as_pc_member(&self) -> bool {
        self.process_roles.values().any(|role| {
            role.eq_ignore_ascii_case(roles::PRIMARY) || role.eq_ignore_ascii_case(roles::SECONDARY)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_add_role_is_cumulative() {
        let priority = RolePriority::default();
        let mut actor = Actor::new(ActorId::new("A1"), at(1));
        actor.add_role("PC Member", &priority);
        actor.add_role("PC Member", &priority);
        assert_eq!(actor.role_count("PC Member"), 2);
        assert_eq!(actor.main_role(), Some("PC Member"));
    }

    #[test]
    fn test_most_frequent_role_wins_without_priority() {
        let priority = RolePriority::default();
        let mut actor = Actor::new(ActorId::new("A1"), at(1));
        actor.add_role("External Reviewer", &priority);
        actor.add_role("PC Member", &priority);
        actor.add_role("PC Member", &priority);
        assert_eq!(actor.main_role(), Some("PC Member"));
    }

    #[test]
    fn test_ties_go_to_first_seen() {
        let priority = RolePriority::default();
        let mut actor = Actor::new(ActorId::new("A1"), at(1));
        actor.add_role("External Reviewer", &priority);
        actor.add_role("PC Member", &priority);
        assert_eq!(actor.main_role(), Some("External Reviewer"));
    }

    #[test]
    fn test_any_is_never_general_role() {
        let priority = RolePriority::default();
        let mut actor = Actor::new(ActorId::new("A1"), at(1));
        actor.add_role("any", &priority);
        actor.add_role("any", &priority);
        assert_eq!(actor.main_role(), None);
        actor.add_role("Author", &priority);
        assert_eq!(actor.main_role(), Some("Author"));
    }

    #[test]
    fn test_priority_overrides_frequency() {
        let priority = RolePriority::from_lines("Paper Chair\nPC Member");
        let mut actor = Actor::new(ActorId::new("A1"), at(1));
        actor.add_role("PC Member", &priority);
        actor.add_role("PC Member", &priority);
        actor.add_role("Paper Chair", &priority);
        assert_eq!(actor.main_role(), Some("Paper Chair"));
    }

    #[test]
    fn test_unordered_roles_fall_back_to_frequency() {
        let priority = RolePriority::from_lines("Paper Chair");
        let mut actor = Actor::new(ActorId::new("A1"), at(1));
        actor.add_role("Author", &priority);
        assert_eq!(actor.main_role(), Some("Author"));
    }

    #[test]
    fn test_observe_extends_envelope() {
        let mut actor = Actor::new(ActorId::new("A1"), at(5));
        actor.observe(at(7));
        actor.observe(at(2));
        assert_eq!(actor.start, at(2));
        assert_eq!(actor.end, at(7));
    }

    #[test]
    fn test_reviewed_as_pc_member() {
        let mut actor = Actor::new(ActorId::new("A1"), at(5));
        assert!(!actor.reviewed_as_pc_member());
        actor
            .process_roles
            .insert(ProcessId::new("S1"), "Secondary".to_string());
        assert!(actor.reviewed_as_pc_member());
    }
}
