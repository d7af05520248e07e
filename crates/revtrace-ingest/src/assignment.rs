//! Role assignments written as free text
//!
//! Logs record assignments in a few textual shapes:
//!
//! - `assigns A3 as primary` (in the action or its parameter)
//! - action `assigns as primary` with the actor id in the parameter
//! - `A3 (primary); A4 (secondary)` parentheticals, on assignment and
//!   invitation actions only
//! - `changes role` with `primary to secondary`
//! - `clears all assignments`
//!
//! [`AssignmentParser`] only reads text. The loader applies the resulting
//! [`RoleEdit`] to the process.

use regex::Regex;

/// One actor named with a role
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssignedTarget {
    pub actor: String,
    pub role: String,
}

/// A structured edit of a process's role assignments
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoleEdit {
    /// Actors given a role; each becomes a target of the action
    Assign(Vec<AssignedTarget>),
    /// The first actor holding `from` now holds `to`
    Reassign { from: String, to: String },
    /// Forget every recorded assignment
    ClearAll,
}

/// Whether the action commits an actor to the process (assignment or invitation)
pub fn is_commitment(action: &str) -> bool {
    let action = action.to_lowercase();
    action.contains("assign") || action.contains("invit")
}

pub struct AssignmentParser {
    actor_as_role: Regex,
    as_role: Regex,
    parenthetical: Regex,
    change_role: Regex,
    from_to: Regex,
    clear_all: Regex,
}

impl AssignmentParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            actor_as_role: Regex::new(r"(?i)\bassigns?\s+([^\s,;()]+)\s+as\s+([^,;()]+)")?,
            as_role: Regex::new(r"(?i)\bassigns?\s+as\s+([^,;()]+)")?,
            parenthetical: Regex::new(r"^\s*([^()]+?)\s*\(([^()]*)\)\s*$")?,
            change_role: Regex::new(r"(?i)\bchanges?\s+(?:the\s+)?roles?\b")?,
            from_to: Regex::new(r"(?i)^\s*(?:of\s+)?(.+?)\s+to\s+(.+?)\s*$")?,
            clear_all: Regex::new(r"(?i)\bclears?\s+all\b")?,
        })
    }

    /// Read the role edit expressed by an action and its parameter.
    ///
    /// `parentheticals` enables the `A3 (primary)` shape; it should be off
    /// for actions whose parameter is a status or outcome. The shape is only
    /// read for actions that pass [`is_commitment`].
    pub fn parse(
        &self,
        action: &str,
        param: Option<&str>,
        parentheticals: bool,
    ) -> Option<RoleEdit> {
        if self.clear_all.is_match(action) {
            return Some(RoleEdit::ClearAll);
        }
        if let Some(m) = self.change_role.find(action) {
            return self
                .role_change(&action[m.end()..], param)
                .map(|(from, to)| RoleEdit::Reassign { from, to });
        }
        let targets = self.assignments(action, param, parentheticals);
        (!targets.is_empty()).then_some(RoleEdit::Assign(targets))
    }

    /// `from to to`, read from the parameter first, then from the action text
    fn role_change(&self, action_rest: &str, param: Option<&str>) -> Option<(String, String)> {
        param
            .into_iter()
            .chain(std::iter::once(action_rest))
            .find_map(|text| {
                let caps = self.from_to.captures(text)?;
                let from = clean(&caps[1]);
                let to = clean(&caps[2]);
                (!from.is_empty() && !to.is_empty()).then(|| (from.to_string(), to.to_string()))
            })
    }

    fn assignments(
        &self,
        action: &str,
        param: Option<&str>,
        parentheticals: bool,
    ) -> Vec<AssignedTarget> {
        let mut targets = Vec::new();

        for text in std::iter::once(action).chain(param) {
            for caps in self.actor_as_role.captures_iter(text) {
                if !caps[1].eq_ignore_ascii_case("as") {
                    push_target(&mut targets, &caps[1], &caps[2]);
                }
            }
        }

        if targets.is_empty() {
            if let (Some(caps), Some(param)) = (self.as_role.captures(action), param) {
                let actor = param.split('(').next().unwrap_or(param);
                push_target(&mut targets, actor, &caps[1]);
            }
        }

        if targets.is_empty() && parentheticals && is_commitment(action) {
            if let Some(param) = param {
                self.parentheticals(param, false, &mut targets);
            }
            if targets.is_empty() {
                self.parentheticals(action, true, &mut targets);
            }
        }
        targets
    }

    /// `A3 (primary); A4 (secondary)`. In action text the actor id is the
    /// word right before the parenthesis.
    fn parentheticals(&self, text: &str, last_word: bool, targets: &mut Vec<AssignedTarget>) {
        for group in split_outside_parens(text) {
            let Some(caps) = self.parenthetical.captures(group) else {
                continue;
            };
            let actor = if last_word {
                caps[1].split_whitespace().last().unwrap_or_default()
            } else {
                &caps[1]
            };
            for role in caps[2].split(';') {
                push_target(targets, actor, role);
            }
        }
    }
}

fn clean(text: &str) -> &str {
    text.trim().trim_matches(|c| c == '"' || c == '\'' || c == '.').trim()
}

fn push_target(targets: &mut Vec<AssignedTarget>, actor: &str, role: &str) {
    let actor = clean(actor);
    let role = clean(role);
    if actor.is_empty() || role.is_empty() {
        return;
    }
    let exists = targets
        .iter()
        .any(|t| t.actor == actor && t.role.eq_ignore_ascii_case(role));
    if !exists {
        targets.push(AssignedTarget {
            actor: actor.to_string(),
            role: role.to_string(),
        });
    }
}

/// Split on `;` and `,` that are not inside parentheses
fn split_outside_parens(text: &str) -> Vec<&str> {
    let mut groups = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ';' | ',' if depth == 0 => {
                groups.push(&text[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    groups.push(&text[start..]);
    groups
}
