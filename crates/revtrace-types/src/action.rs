//! Action types and their registry
//!
//! Action types are created while configuration files are loaded and are
//! lazily added when the log names an action the configuration never
//! mentioned. Role and phase fields may be back-filled from log data, but
//! only when they are absent.

use crate::roles;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What the free-text parameter of an action refers to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetType {
    /// The parameter names another actor
    Actor,
    /// The parameter is the task status
    Status,
    /// The parameter is the task outcome
    Outcome,
}

impl TargetType {
    /// Parse a configuration value (case-insensitive)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "actor" => Some(Self::Actor),
            "status" => Some(Self::Status),
            "outcome" => Some(Self::Outcome),
            _ => None,
        }
    }
}

impl std::fmt::Display for TargetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Actor => write!(f, "Actor"),
            Self::Status => write!(f, "Status"),
            Self::Outcome => write!(f, "Outcome"),
        }
    }
}

/// Static metadata about a named action
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionType {
    /// e.g. "accepts invitation", "updates review", "sets decision"
    pub type_name: String,
    /// Governing phase, e.g. "Reviewing"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase_name: Option<String>,
    /// Expected role of the performer, e.g. "PC Member"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_type: Option<TargetType>,
    /// Expected role of the referenced actor when `target_type` is `Actor`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_role: Option<String>,
    /// Short display label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ActionType {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            phase_name: None,
            actor_role: None,
            target_type: None,
            target_role: None,
            code: None,
        }
    }

    /// Whether the configured actor role says something specific
    ///
    /// A missing role, `any` and `none` may be overwritten by log data.
    pub fn has_specific_actor_role(&self) -> bool {
        self.actor_role
            .as_deref()
            .is_some_and(|role| !roles::is_sentinel_role(role))
    }

    pub fn targets_actor(&self) -> bool {
        self.target_type == Some(TargetType::Actor)
    }
}

/// All known action types, keyed by name
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionTypeRegistry {
    types: BTreeMap<String, ActionType>,
}

impl ActionTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an action type, creating an empty entry on first reference
    pub fn get_or_create(&mut self, name: &str) -> &mut ActionType {
        self.types
            .entry(name.to_string())
            .or_insert_with(|| ActionType::new(name))
    }

    pub fn get(&self, name: &str) -> Option<&ActionType> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionType> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Action types governed by the named phase
    pub fn for_phase<'a>(&'a self, phase: &'a str) -> impl Iterator<Item = &'a ActionType> + 'a {
        self.types.values().filter(move |t| {
            t.phase_name
                .as_deref()
                .is_some_and(|p| p.eq_ignore_ascii_case(phase))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_type_parse() {
        assert_eq!(TargetType::parse("actor"), Some(TargetType::Actor));
        assert_eq!(TargetType::parse(" Status "), Some(TargetType::Status));
        assert_eq!(TargetType::parse("OUTCOME"), Some(TargetType::Outcome));
        assert_eq!(TargetType::parse("paper"), None);
    }

    #[test]
    fn test_get_or_create_is_idempotent() {
        let mut registry = ActionTypeRegistry::new();
        registry.get_or_create("submits review").phase_name = Some("Reviewing".into());
        let again = registry.get_or_create("submits review");
        assert_eq!(again.phase_name.as_deref(), Some("Reviewing"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_specific_actor_role() {
        let mut action = ActionType::new("comments");
        assert!(!action.has_specific_actor_role());
        action.actor_role = Some("Any".into());
        assert!(!action.has_specific_actor_role());
        action.actor_role = Some("PC Member".into());
        assert!(action.has_specific_actor_role());
    }

    #[test]
    fn test_for_phase() {
        let mut registry = ActionTypeRegistry::new();
        registry.get_or_create("submits review").phase_name = Some("Reviewing".into());
        registry.get_or_create("comments").phase_name = Some("Discussion".into());
        registry.get_or_create("updates review").phase_name = Some("reviewing".into());
        let names: Vec<_> = registry
            .for_phase("Reviewing")
            .map(|t| t.type_name.as_str())
            .collect();
        assert_eq!(names, vec!["submits review", "updates review"]);
    }
}
