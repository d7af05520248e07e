//! Header-driven column detection
//!
//! Event logs come from different systems with different headers. Each
//! header is matched by keyword; the first column claiming a role keeps it.

use crate::{IngestError, IngestResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic role of a log column
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    ProcessId,
    Timestamp,
    Parameter,
    ActionType,
    ActionId,
    ActorId,
    ActorRole,
    TargetType,
    TargetId,
    Status,
    Outcome,
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ProcessId => "process identifiers",
            Self::Timestamp => "action timestamps",
            Self::Parameter => "action parameters",
            Self::ActionType => "action types",
            Self::ActionId => "action identifiers",
            Self::ActorId => "actor identifiers",
            Self::ActorRole => "actor roles",
            Self::TargetType => "target types",
            Self::TargetId => "target identifiers",
            Self::Status => "statuses",
            Self::Outcome => "outcomes",
        };
        f.write_str(name)
    }
}

impl ColumnRole {
    /// Classify a header by keyword. Checks run in a fixed precedence, so a
    /// header like `event_time` is a timestamp, not an action.
    pub fn classify(header: &str) -> Option<Self> {
        let h = header.to_lowercase();
        let has = |kw: &str| h.contains(kw);

        if has("process") || has("submission") {
            Some(Self::ProcessId)
        } else if has("date") || has("time") {
            Some(Self::Timestamp)
        } else if has("param") {
            Some(Self::Parameter)
        } else if has("action") || has("event") {
            Some(if has("id") { Self::ActionId } else { Self::ActionType })
        } else if ["actor", "person", "anonymous", "initiator", "initiating"]
            .iter()
            .any(|kw| has(kw))
        {
            if has("id") {
                Some(Self::ActorId)
            } else if has("role") || has("type") {
                Some(Self::ActorRole)
            } else {
                Some(Self::ActorId)
            }
        } else if has("target") || has("subject") {
            Some(if has("type") || has("role") {
                Self::TargetType
            } else {
                Self::TargetId
            })
        } else if has("status") {
            Some(Self::Status)
        } else if has("outcome") {
            Some(Self::Outcome)
        } else {
            None
        }
    }
}

/// Column indices detected from a header row
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSchema {
    pub process_id: Option<usize>,
    pub timestamp: Option<usize>,
    pub parameter: Option<usize>,
    pub action_type: Option<usize>,
    pub action_id: Option<usize>,
    pub actor_id: Option<usize>,
    pub actor_role: Option<usize>,
    pub target_type: Option<usize>,
    pub target_id: Option<usize>,
    pub status: Option<usize>,
    pub outcome: Option<usize>,
}

/// Column indices that every log must carry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequiredColumns {
    pub process_id: usize,
    pub timestamp: usize,
    pub action_type: usize,
}

impl LogSchema {
    /// Assign roles to header columns.
    ///
    /// Fails when no column holds process ids, timestamps or action types.
    pub fn detect<S: AsRef<str>>(header: &[S]) -> IngestResult<Self> {
        let mut schema = Self::default();
        for (idx, name) in header.iter().enumerate() {
            if let Some(role) = ColumnRole::classify(name.as_ref()) {
                let slot = schema.slot_mut(role);
                if slot.is_none() {
                    *slot = Some(idx);
                }
            }
        }
        schema.required()?;
        Ok(schema)
    }

    /// The mandatory columns, or the first one that is missing
    pub fn required(&self) -> IngestResult<RequiredColumns> {
        Ok(RequiredColumns {
            process_id: self.index(ColumnRole::ProcessId)?,
            timestamp: self.index(ColumnRole::Timestamp)?,
            action_type: self.index(ColumnRole::ActionType)?,
        })
    }

    /// Minimum field count a row needs to carry every mandatory column
    pub fn min_fields(&self) -> usize {
        [self.process_id, self.timestamp, self.action_type]
            .into_iter()
            .flatten()
            .max()
            .map_or(0, |max| max + 1)
    }

    pub fn column(&self, role: ColumnRole) -> Option<usize> {
        match role {
            ColumnRole::ProcessId => self.process_id,
            ColumnRole::Timestamp => self.timestamp,
            ColumnRole::Parameter => self.parameter,
            ColumnRole::ActionType => self.action_type,
            ColumnRole::ActionId => self.action_id,
            ColumnRole::ActorId => self.actor_id,
            ColumnRole::ActorRole => self.actor_role,
            ColumnRole::TargetType => self.target_type,
            ColumnRole::TargetId => self.target_id,
            ColumnRole::Status => self.status,
            ColumnRole::Outcome => self.outcome,
        }
    }

    /// Trimmed, non-empty value of an optional column in `fields`
    pub fn value<'a>(&self, role: ColumnRole, fields: &'a [String]) -> Option<&'a str> {
        self.column(role)
            .and_then(|idx| fields.get(idx))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    fn index(&self, role: ColumnRole) -> IngestResult<usize> {
        self.column(role).ok_or(IngestError::MissingColumn(role))
    }

    fn slot_mut(&mut self, role: ColumnRole) -> &mut Option<usize> {
        match role {
            ColumnRole::ProcessId => &mut self.process_id,
            ColumnRole::Timestamp => &mut self.timestamp,
            ColumnRole::Parameter => &mut self.parameter,
            ColumnRole::ActionType => &mut self.action_type,
            ColumnRole::ActionId => &mut self.action_id,
            ColumnRole::ActorId => &mut self.actor_id,
            ColumnRole::ActorRole => &mut self.actor_role,
            ColumnRole::TargetType => &mut self.target_type,
            ColumnRole::TargetId => &mut self.target_id,
            ColumnRole::Status => &mut self.status,
            ColumnRole::Outcome => &mut self.outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_keywords() {
        assert_eq!(ColumnRole::classify("SubmissionID"), Some(ColumnRole::ProcessId));
        assert_eq!(ColumnRole::classify("Event Time"), Some(ColumnRole::Timestamp));
        assert_eq!(ColumnRole::classify("Action"), Some(ColumnRole::ActionType));
        assert_eq!(ColumnRole::classify("ActionId"), Some(ColumnRole::ActionId));
        assert_eq!(ColumnRole::classify("Initiator"), Some(ColumnRole::ActorId));
        assert_eq!(ColumnRole::classify("Actor Role"), Some(ColumnRole::ActorRole));
        assert_eq!(ColumnRole::classify("Target Type"), Some(ColumnRole::TargetType));
        assert_eq!(ColumnRole::classify("Subject"), Some(ColumnRole::TargetId));
        assert_eq!(ColumnRole::classify("Parameters"), Some(ColumnRole::Parameter));
        assert_eq!(ColumnRole::classify("Notes"), None);
    }

    #[test]
    fn test_detect_first_column_wins() {
        let header = ["Process", "Date", "Actor", "Action", "Param", "Process2"];
        let schema = LogSchema::detect(&header).unwrap();
        assert_eq!(schema.process_id, Some(0));
        assert_eq!(schema.timestamp, Some(1));
        assert_eq!(schema.actor_id, Some(2));
        assert_eq!(schema.action_type, Some(3));
        assert_eq!(schema.parameter, Some(4));
        assert_eq!(schema.min_fields(), 4);
    }

    #[test]
    fn test_missing_mandatory_column() {
        let err = LogSchema::detect(&["Process", "Actor", "Action"]).unwrap_err();
        assert!(matches!(
            err,
            IngestError::MissingColumn(ColumnRole::Timestamp)
        ));
        assert!(err.to_string().contains("action timestamps"));
    }

    #[test]
    fn test_value_skips_blank() {
        let schema = LogSchema::detect(&["Process", "Date", "Action", "Actor"]).unwrap();
        let fields: Vec<String> = ["S1", "2025-01-10", "submits", " "]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(schema.value(ColumnRole::ProcessId, &fields), Some("S1"));
        assert_eq!(schema.value(ColumnRole::ActorId, &fields), None);
        assert_eq!(schema.value(ColumnRole::Status, &fields), None);
    }
}
