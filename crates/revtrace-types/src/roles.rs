//! Role vocabulary and role-priority ordering
//!
//! Role labels come from configuration and from free text in the log, so
//! every comparison here is case-insensitive.

use serde::{Deserialize, Serialize};

/// Lifetime role of the people running the review
pub const PAPER_CHAIR: &str = "Paper Chair";
/// Lifetime role of committee reviewers
pub const PC_MEMBER: &str = "PC Member";
/// Per-process reviewer roles
pub const PRIMARY: &str = "primary";
pub const SECONDARY: &str = "secondary";
/// Placeholder role meaning "whoever performs the action"
pub const ANY: &str = "any";
/// Placeholder role meaning "no role"
pub const NONE: &str = "none";

/// Whether the role is one of the placeholders `any` / `none`
pub fn is_sentinel_role(role: &str) -> bool {
    role.eq_ignore_ascii_case(ANY) || role.eq_ignore_ascii_case(NONE)
}

pub fn is_paper_chair_role(role: &str) -> bool {
    role.eq_ignore_ascii_case(PAPER_CHAIR)
}

pub fn is_primary_role(role: &str) -> bool {
    let role = role.to_lowercase();
    role == "primary" || role == "coordinator"
}

pub fn is_secondary_role(role: &str) -> bool {
    let role = role.to_lowercase();
    role == "secondary" || role == "committee member" || role == "pc member"
}

/// Any committee role, including the per-process primary/secondary labels
pub fn is_pc_member_role(role: &str) -> bool {
    is_primary_role(role) || is_secondary_role(role)
}

pub fn is_external_role(role: &str) -> bool {
    let role = role.to_lowercase();
    role.contains("external") || role.contains("reviewer")
}

/// Append `role` to a list of known roles unless it is a placeholder or
/// already listed (case-insensitively)
pub fn register_role(known: &mut Vec<String>, role: &str) {
    if is_sentinel_role(role) || known.iter().any(|r| r.eq_ignore_ascii_case(role)) {
        return;
    }
    known.push(role.to_string());
}

/// Apply a role predicate to an optional role, treating `None` as no match
pub fn role_matches(role: Option<&str>, predicate: fn(&str) -> bool) -> bool {
    role.is_some_and(predicate)
}

/// Ordered role preferences used to pick an actor's single lifetime label
///
/// Seeded from `roles.txt`; earlier entries win. An empty ordering means
/// "use the most frequently seen role".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RolePriority {
    roles: Vec<String>,
}

impl RolePriority {
    pub fn new(roles: Vec<String>) -> Self {
        Self { roles }
    }

    /// Parse one role per line, skipping blank lines
    pub fn from_lines(text: &str) -> Self {
        Self::new(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    /// Position of a role in the ordering
    pub fn rank(&self, role: &str) -> Option<usize> {
        self.roles.iter().position(|r| r.eq_ignore_ascii_case(role))
    }

    /// The highest-priority role among `held`
    pub fn first_held<'a, I>(&self, held: I) -> Option<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        held.into_iter()
            .filter_map(|role| self.rank(role).map(|rank| (rank, role)))
            .min_by_key(|(rank, _)| *rank)
            .map(|(_, role)| role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_predicates() {
        assert!(is_paper_chair_role("paper chair"));
        assert!(!is_paper_chair_role("PC Member"));
        assert!(is_pc_member_role("Primary"));
        assert!(is_pc_member_role("coordinator"));
        assert!(is_pc_member_role("PC Member"));
        assert!(is_secondary_role("Committee Member"));
        assert!(!is_secondary_role("primary"));
        assert!(is_external_role("External Reviewer"));
        assert!(is_external_role("external"));
        assert!(!is_external_role("secondary"));
        assert!(is_sentinel_role("ANY"));
        assert!(is_sentinel_role("none"));
    }

    #[test]
    fn test_role_matches_none() {
        assert!(!role_matches(None, is_paper_chair_role));
        assert!(role_matches(Some("Paper Chair"), is_paper_chair_role));
    }

    #[test]
    fn test_priority_from_lines() {
        let priority = RolePriority::from_lines("Paper Chair\n\n  PC Member \nExternal Reviewer\n");
        assert_eq!(priority.roles().len(), 3);
        assert_eq!(priority.rank("pc member"), Some(1));
        assert_eq!(priority.rank("author"), None);
    }

    #[test]
    fn test_first_held_uses_ordering_not_input_order() {
        let priority = RolePriority::from_lines("Paper Chair\nPC Member\nExternal Reviewer");
        let held = ["External Reviewer", "Author", "PC Member"];
        assert_eq!(priority.first_held(held.iter().copied()), Some("PC Member"));
        assert_eq!(priority.first_held(["Author"].iter().copied()), None);
    }
}
