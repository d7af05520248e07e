//! Configuration file loaders
//!
//! All configuration files are comma-separated with one header line:
//!
//! - phase timetable: `phase,start,end`
//! - action → phase: `action,phase`
//! - action → role: `action,actorRole[,targetType[,targetRole]]`
//! - action encodings: `action,code` (split on the first comma only)
//!
//! An optional `roles.txt` beside the action → role file lists one role per
//! line in priority order.

use crate::record::{split_pair, split_record};
use crate::{IngestError, IngestResult, TimestampFormat};
use revtrace_types::roles::{self, RolePriority};
use revtrace_types::{ActionTypeRegistry, Phase, PhaseTable, ProcessModel, TargetType};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the optional role priority list
pub const ROLES_FILE_NAME: &str = "roles.txt";

const DELIMITER: char = ',';

/// Locations of every input of one run
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputPaths {
    #[serde(alias = "phasesFilePath")]
    pub phases: PathBuf,
    #[serde(alias = "actionsMappingFilePath")]
    pub action_phases: PathBuf,
    #[serde(alias = "actorsMappingFilePath")]
    pub action_roles: PathBuf,
    #[serde(alias = "actionsEncodingFilePath")]
    pub action_encodings: Option<PathBuf>,
    #[serde(alias = "logFilePath")]
    pub log: PathBuf,
}

impl InputPaths {
    /// Resolve relative paths against `base`
    pub fn resolve_against(mut self, base: &Path) -> Self {
        let join = |p: &mut PathBuf| {
            if !p.as_os_str().is_empty() && p.is_relative() {
                *p = base.join(&*p);
            }
        };
        join(&mut self.phases);
        join(&mut self.action_phases);
        join(&mut self.action_roles);
        if let Some(p) = self.action_encodings.as_mut() {
            join(p);
        }
        join(&mut self.log);
        self
    }
}

pub(crate) fn read_file(path: &Path) -> IngestResult<String> {
    fs::read_to_string(path).map_err(|e| IngestError::io(path, e))
}

/// Data lines of a config file: header skipped, blank lines dropped.
/// Yields 1-based line numbers.
fn data_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .skip(1)
        .map(|(idx, line)| (idx + 1, line))
        .filter(|(_, line)| !line.trim().is_empty())
}

// ── Phase timetable ─────────────────────────────────────────────────

/// Parse a phase timetable. The date pattern is resolved from the first
/// start date; an empty timetable is an error.
pub fn parse_phase_timetable(text: &str) -> IngestResult<PhaseTable> {
    let mut table = PhaseTable::new();
    let mut format: Option<TimestampFormat> = None;

    for (line, row) in data_lines(text) {
        let fields = split_record(row, DELIMITER);
        if fields.len() < 3 {
            tracing::warn!(line, "Skipping phase row with fewer than 3 fields");
            continue;
        }
        let fmt = match format {
            Some(fmt) => fmt,
            None => {
                let fmt = TimestampFormat::resolve(&fields[1])
                    .ok_or_else(|| IngestError::UnrecognizedDateFormat(fields[1].clone()))?;
                format = Some(fmt);
                fmt
            }
        };
        let parse = |value: &str| {
            fmt.parse_date(value).ok_or_else(|| IngestError::InvalidPhaseRow {
                line,
                reason: format!("date {value:?} does not match {}", fmt.pattern()),
            })
        };
        let start = parse(fields[1].as_str())?;
        let end = parse(fields[2].as_str())?;
        table.insert(Phase::new(fields[0].clone(), start, end));
    }

    if table.is_empty() {
        return Err(IngestError::EmptyPhaseTimetable);
    }
    Ok(table)
}

pub fn load_phase_timetable(path: &Path) -> IngestResult<PhaseTable> {
    let table = parse_phase_timetable(&read_file(path)?)?;
    tracing::info!(path = %path.display(), phases = table.len(), "Loaded phase timetable");
    Ok(table)
}

// ── Action → phase ──────────────────────────────────────────────────

/// Attach phase names to action types. Returns the number of rows applied.
pub fn parse_action_phase_mapping(text: &str, registry: &mut ActionTypeRegistry) -> usize {
    let mut applied = 0;
    for (line, row) in data_lines(text) {
        let fields = split_record(row, DELIMITER);
        if fields.len() < 2 || fields[0].is_empty() {
            tracing::debug!(line, "Skipping incomplete action-phase row");
            continue;
        }
        registry.get_or_create(&fields[0]).phase_name =
            Some(fields[1].clone()).filter(|p| !p.is_empty());
        applied += 1;
    }
    applied
}

pub fn load_action_phase_mapping(
    path: &Path,
    registry: &mut ActionTypeRegistry,
) -> IngestResult<usize> {
    let applied = parse_action_phase_mapping(&read_file(path)?, registry);
    tracing::info!(path = %path.display(), actions = applied, "Loaded action-phase mapping");
    Ok(applied)
}

// ── Action → role ───────────────────────────────────────────────────

/// Read `roles.txt` next to `mapping_path`, if present
pub fn load_role_priority(mapping_path: &Path) -> IngestResult<Option<RolePriority>> {
    let path = mapping_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(ROLES_FILE_NAME);
    if !path.is_file() {
        return Ok(None);
    }
    let priority = RolePriority::from_lines(&read_file(&path)?);
    tracing::info!(path = %path.display(), roles = priority.roles().len(), "Loaded role priority");
    Ok(Some(priority))
}

/// Attach performer roles, target types and target roles to action types.
/// Every concrete role named is registered with the model.
pub fn parse_action_role_mapping(text: &str, model: &mut ProcessModel) -> usize {
    let mut applied = 0;
    for (line, row) in data_lines(text) {
        let fields = split_record(row, DELIMITER);
        if fields.len() < 2 || fields[0].is_empty() {
            tracing::debug!(line, "Skipping incomplete action-role row");
            continue;
        }
        let actor_role = fields[1].clone();
        let target_type = match fields.get(2).map(String::as_str) {
            None | Some("") => None,
            Some(raw) => {
                let parsed = TargetType::parse(raw);
                if parsed.is_none() {
                    tracing::warn!(line, target_type = raw, "Unknown target type");
                }
                parsed
            }
        };
        let target_role = fields
            .get(3)
            .filter(|r| !r.is_empty() && target_type == Some(TargetType::Actor))
            .cloned();

        if !actor_role.is_empty() {
            roles::register_role(&mut model.actor_roles, &actor_role);
        }
        if let Some(role) = &target_role {
            roles::register_role(&mut model.actor_roles, role);
        }

        let action = model.action_types.get_or_create(&fields[0]);
        action.actor_role = Some(actor_role).filter(|r| !r.is_empty());
        action.target_type = target_type;
        action.target_role = target_role;
        applied += 1;
    }
    applied
}

pub fn load_action_role_mapping(path: &Path, model: &mut ProcessModel) -> IngestResult<usize> {
    if let Some(priority) = load_role_priority(path)? {
        for role in priority.roles() {
            roles::register_role(&mut model.actor_roles, role);
        }
        model.role_priority = priority;
    }
    let applied = parse_action_role_mapping(&read_file(path)?, model);
    tracing::info!(path = %path.display(), actions = applied, "Loaded action-role mapping");
    Ok(applied)
}

// ── Encodings ───────────────────────────────────────────────────────

/// Attach short codes to action types
pub fn parse_action_encodings(text: &str, registry: &mut ActionTypeRegistry) -> usize {
    let mut applied = 0;
    for (line, row) in data_lines(text) {
        match split_pair(row, DELIMITER) {
            Some((action, code)) if !action.is_empty() && !code.is_empty() => {
                registry.get_or_create(&action).code = Some(code);
                applied += 1;
            }
            _ => tracing::debug!(line, "Skipping incomplete encoding row"),
        }
    }
    applied
}

pub fn load_action_encodings(
    path: &Path,
    registry: &mut ActionTypeRegistry,
) -> IngestResult<usize> {
    let applied = parse_action_encodings(&read_file(path)?, registry);
    tracing::info!(path = %path.display(), actions = applied, "Loaded action encodings");
    Ok(applied)
}
