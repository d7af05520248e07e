//! Single-pass event-log ingestion
//!
//! [`LogLoader`] owns the [`ProcessModel`] while configuration and the log
//! are loaded, then hands it over with [`LogLoader::into_model`].

use crate::assignment::{is_commitment, AssignmentParser, RoleEdit};
use crate::config::{self, InputPaths};
use crate::record::{detect_delimiter, split_record};
use crate::schema::RequiredColumns;
use crate::{ColumnRole, IngestError, IngestResult, LogSchema, TimestampFormat};
use chrono::NaiveDateTime;
use revtrace_types::roles;
use revtrace_types::{
    Actor, ActorId, ProcessId, ProcessInstance, ProcessModel, TargetType, TaskInstance,
    TimeInterval,
};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Lines with fewer fields than this are never data
const MIN_RECORD_FIELDS: usize = 3;

/// Tunables of the ingestion pipeline
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderSettings {
    /// Actor id used when the log has no actor column or the value is blank
    pub default_actor: String,
    /// Type label given to every reconstructed process
    pub process_type: String,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            default_actor: roles::NONE.to_string(),
            process_type: revtrace_types::SUBMISSION.to_string(),
        }
    }
}

/// Why a log row was skipped
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    #[error("{found} fields, at least {needed} needed")]
    TooFewFields { found: usize, needed: usize },

    #[error("timestamp {value:?} does not match the log's date pattern")]
    BadTimestamp { value: String },

    #[error("empty process id")]
    EmptyProcessId,

    #[error("empty action")]
    EmptyAction,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    /// 1-based line number in the log file
    pub line: usize,
    pub reason: SkipReason,
}

/// Outcome of one log load
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    /// Data rows seen after the header
    pub rows: usize,
    pub tasks_added: usize,
    pub skipped: Vec<SkippedRow>,
    /// Rows whose performer had no resolvable role
    pub unresolved_roles: usize,
    pub delimiter: Option<char>,
    pub timestamp_pattern: Option<String>,
}

/// A target actor named by one row
struct Target {
    id: String,
    role: Option<String>,
    /// Named by assignment text rather than inferred
    explicit: bool,
}

/// Builds a [`ProcessModel`] from configuration files and an event log
#[derive(Debug, Default)]
pub struct LogLoader {
    model: ProcessModel,
    settings: LoaderSettings,
    process_index: HashMap<ProcessId, usize>,
    task_seq: usize,
}

impl LogLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: LoaderSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn model(&self) -> &ProcessModel {
        &self.model
    }

    pub fn into_model(self) -> ProcessModel {
        self.model
    }

    // ── Configuration ────────────────────────────────────────────────

    pub fn load_phase_timetable(&mut self, path: &Path) -> IngestResult<usize> {
        self.model.phases = config::load_phase_timetable(path)?;
        Ok(self.model.phases.len())
    }

    pub fn load_action_phase_mapping(&mut self, path: &Path) -> IngestResult<usize> {
        config::load_action_phase_mapping(path, &mut self.model.action_types)
    }

    /// Load the action → role mapping and the `roles.txt` priority beside it
    pub fn load_action_role_mapping(&mut self, path: &Path) -> IngestResult<usize> {
        config::load_action_role_mapping(path, &mut self.model)
    }

    pub fn load_action_encodings(&mut self, path: &Path) -> IngestResult<usize> {
        config::load_action_encodings(path, &mut self.model.action_types)
    }

    /// Load every configured input, then the log
    pub fn load_inputs(&mut self, paths: &InputPaths) -> IngestResult<LoadReport> {
        self.load_phase_timetable(&paths.phases)?;
        self.load_action_phase_mapping(&paths.action_phases)?;
        self.load_action_role_mapping(&paths.action_roles)?;
        if let Some(encodings) = &paths.action_encodings {
            self.load_action_encodings(encodings)?;
        }
        self.load_log(&paths.log)
    }

    // ── Event log ────────────────────────────────────────────────────

    pub fn load_log(&mut self, path: &Path) -> IngestResult<LoadReport> {
        let file = File::open(path).map_err(|e| IngestError::io(path, e))?;
        let report = self.ingest_log(BufReader::new(file))?;
        tracing::info!(
            path = %path.display(),
            processes = self.model.processes.len(),
            actors = self.model.actors.len(),
            tasks = report.tasks_added,
            skipped = report.skipped.len(),
            "Event log loaded"
        );
        Ok(report)
    }

    /// Ingest an event log from any buffered reader.
    ///
    /// The first line with at least three fields is the header. The date
    /// pattern is resolved from the first data row and locked for the rest
    /// of the log.
    pub fn ingest_log<R: BufRead>(&mut self, mut reader: R) -> IngestResult<LoadReport> {
        let parser = AssignmentParser::new()?;
        let mut report = LoadReport::default();
        let mut header: Option<(char, LogSchema, RequiredColumns)> = None;
        let mut format: Option<TimestampFormat> = None;
        let mut buf = Vec::new();
        let mut line_no = 0usize;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_no += 1;
            let decoded = String::from_utf8_lossy(&buf);
            if let Cow::Owned(_) = decoded {
                tracing::debug!(line = line_no, "Replaced invalid UTF-8 in log row");
            }
            let line = decoded.trim_end_matches(|c| c == '\n' || c == '\r');
            if line.trim().is_empty() {
                continue;
            }

            let Some((delimiter, schema, required)) = &header else {
                let delimiter = detect_delimiter(&line);
                let fields = split_record(&line, delimiter);
                if fields.len() < MIN_RECORD_FIELDS {
                    continue;
                }
                let schema = LogSchema::detect(&fields)?;
                let required = schema.required()?;
                tracing::debug!(?schema, ?delimiter, "Detected log schema");
                report.delimiter = Some(delimiter);
                header = Some((delimiter, schema, required));
                continue;
            };

            report.rows += 1;
            let fields = split_record(&line, *delimiter);
            let needed = schema.min_fields().max(MIN_RECORD_FIELDS);
            if fields.len() < needed {
                let reason = SkipReason::TooFewFields {
                    found: fields.len(),
                    needed,
                };
                skip(&mut report, line_no, reason);
                continue;
            }

            let fmt = match format {
                Some(fmt) => fmt,
                None => {
                    let sample = &fields[required.timestamp];
                    let fmt = TimestampFormat::resolve(sample)
                        .ok_or_else(|| IngestError::UnrecognizedDateFormat(sample.clone()))?;
                    tracing::debug!(pattern = fmt.pattern(), "Resolved log date pattern");
                    report.timestamp_pattern = Some(fmt.pattern().to_string());
                    format = Some(fmt);
                    fmt
                }
            };

            match self.ingest_row(&parser, schema, *required, fmt, &fields, &mut report) {
                Ok(()) => report.tasks_added += 1,
                Err(reason) => skip(&mut report, line_no, reason),
            }
        }

        if header.is_none() {
            return Err(IngestError::MissingHeader);
        }
        if self.model.processes.is_empty() {
            return Err(IngestError::NoProcesses);
        }
        self.finalize();

        if !report.skipped.is_empty() {
            tracing::info!(skipped = report.skipped.len(), "Skipped malformed log rows");
        }
        Ok(report)
    }

    fn ingest_row(
        &mut self,
        parser: &AssignmentParser,
        schema: &LogSchema,
        required: RequiredColumns,
        fmt: TimestampFormat,
        fields: &[String],
        report: &mut LoadReport,
    ) -> Result<(), SkipReason> {
        let process_id = fields[required.process_id].as_str();
        if process_id.is_empty() {
            return Err(SkipReason::EmptyProcessId);
        }
        let raw_time = &fields[required.timestamp];
        let at = fmt.parse(raw_time).ok_or_else(|| SkipReason::BadTimestamp {
            value: raw_time.clone(),
        })?;
        let action = fields[required.action_type].as_str();
        if action.is_empty() {
            return Err(SkipReason::EmptyAction);
        }
        let performer_id = ActorId::new(
            schema
                .value(ColumnRole::ActorId, fields)
                .unwrap_or(self.settings.default_actor.as_str()),
        );
        let param = schema.value(ColumnRole::Parameter, fields);

        let task_id = match schema.value(ColumnRole::ActionId, fields) {
            Some(id) => id.to_string(),
            None => {
                self.task_seq += 1;
                format!("task{:04}", self.task_seq)
            }
        };
        let process_idx = self.process_slot(process_id);

        let ProcessModel {
            phases,
            action_types,
            actor_roles,
            role_priority,
            actors,
            processes,
        } = &mut self.model;
        let process = &mut processes[process_idx];

        // Performer role: an explicit role column wins over configuration
        let action_type = action_types.get_or_create(action);
        let logged_role = schema.value(ColumnRole::ActorRole, fields);
        if let Some(role) = logged_role {
            if !action_type.has_specific_actor_role() {
                action_type.actor_role = Some(role.to_string());
            }
        }
        let performer_role = logged_role
            .map(str::to_string)
            .or_else(|| action_type.actor_role.clone());
        let phase_name = action_type.phase_name.clone();
        let target_type = action_type.target_type;
        let mut default_target_role = action_type.target_role.clone();

        let performer = touch_actor(actors, &performer_id, at);
        match performer_role.as_deref() {
            None => {
                report.unresolved_roles += 1;
                tracing::warn!(actor_id = %performer_id, action, "No role resolvable for actor");
            }
            Some(role) if roles::is_sentinel_role(role) => {}
            Some(role) => {
                performer.add_role(role, role_priority);
                roles::register_role(actor_roles, role);
                process
                    .role_assignments
                    .insert_if_absent(performer_id.clone(), role);
            }
        }
        let performer_main_role = performer.main_role().map(str::to_string);

        let mut task = TaskInstance::new(
            task_id,
            action,
            performer_id.clone(),
            TimeInterval::instant(at),
        );
        task.status = schema.value(ColumnRole::Status, fields).map(str::to_string);
        task.outcome = schema.value(ColumnRole::Outcome, fields).map(str::to_string);

        if let Some(phase) = phase_name.as_deref().and_then(|name| phases.get(name)) {
            let window = phase.scheduled_window();
            task.scheduled = Some(window);
            process
                .state_mut(&phase.name, window)
                .record(&task.id, &performer_id, at);
        }

        // Target actors
        let parentheticals = !matches!(target_type, Some(TargetType::Status | TargetType::Outcome));
        let edit = parser.parse(action, param, parentheticals);
        let mut targets: Vec<Target> = match &edit {
            Some(RoleEdit::Assign(assigned)) => assigned
                .iter()
                .map(|t| Target {
                    id: t.actor.clone(),
                    role: Some(t.role.clone()),
                    explicit: true,
                })
                .collect(),
            _ => Vec::new(),
        };
        if targets.is_empty() {
            if let Some(target) = column_target(schema, fields, actor_roles) {
                targets.push(target);
            }
        }
        if targets.is_empty() && target_type == Some(TargetType::Actor) {
            if let Some(param) = param {
                targets.push(Target {
                    id: param.to_string(),
                    role: None,
                    explicit: false,
                });
            }
        }

        let commitment = is_commitment(action);
        for target in targets {
            let target_id = ActorId::new(target.id);
            let role = match target.role {
                Some(role) => {
                    if default_target_role.is_none() {
                        action_types.get_or_create(action).target_role = Some(role.clone());
                        default_target_role = Some(role.clone());
                    }
                    Some(role)
                }
                None => default_target_role.clone(),
            };

            let target_actor = touch_actor(actors, &target_id, at);
            if let Some(role) = role.as_deref().filter(|r| !roles::is_sentinel_role(r)) {
                target_actor.add_role(role, role_priority);
                roles::register_role(actor_roles, role);
                if target.explicit || commitment {
                    process.role_assignments.set(target_id.clone(), role);
                } else {
                    process
                        .role_assignments
                        .insert_if_absent(target_id.clone(), role);
                }
            }
            if commitment {
                process.get_or_create_thread(&target_id, role.as_deref());
            }
            task.add_target(target_id);
        }

        if let Some(param) = param {
            match target_type {
                Some(TargetType::Status) if task.status.is_none() => {
                    task.status = Some(param.to_string())
                }
                Some(TargetType::Outcome) if task.outcome.is_none() => {
                    task.outcome = Some(param.to_string())
                }
                _ => {}
            }
        }

        match edit {
            Some(RoleEdit::Reassign { from, to }) => {
                match process.role_assignments.reassign_first(&from, &to) {
                    Some(actor) => tracing::debug!(
                        process_id,
                        actor_id = %actor,
                        from = %from,
                        to = %to,
                        "Role changed"
                    ),
                    None => {
                        tracing::debug!(process_id, from = %from, "No actor holds role to change")
                    }
                }
            }
            Some(RoleEdit::ClearAll) => {
                tracing::debug!(process_id, "Role assignments cleared");
                process.role_assignments.clear();
            }
            _ => {}
        }

        let thread = process.get_or_create_thread(&performer_id, None);
        if thread.role.is_none() {
            thread.role = performer_main_role;
        }
        thread.add_task(task);
        Ok(())
    }

    /// Index of the process, created on first sight
    fn process_slot(&mut self, id: &str) -> usize {
        let id = ProcessId::new(id);
        if let Some(idx) = self.process_index.get(&id) {
            return *idx;
        }
        let mut process = ProcessInstance::new(id.clone());
        process.process_type = self.settings.process_type.clone();
        self.model.processes.push(process);
        let idx = self.model.processes.len() - 1;
        self.process_index.insert(id, idx);
        idx
    }

    /// Tidy threads, propagate recorded assignments, promote committee reviewers
    fn finalize(&mut self) {
        let ProcessModel {
            actors,
            processes,
            actor_roles,
            ..
        } = &mut self.model;

        for process in processes.iter_mut() {
            process.clean_and_sort_threads();
            for assignment in process.role_assignments.iter() {
                if let Some(thread) = process
                    .threads
                    .iter_mut()
                    .find(|t| t.actor == assignment.actor)
                {
                    thread.role = Some(assignment.role.clone());
                }
                if let Some(actor) = actors.get_mut(&assignment.actor) {
                    actor
                        .process_roles
                        .insert(process.id.clone(), assignment.role.clone());
                }
            }
        }

        let mut promoted = 0usize;
        for actor in actors.values_mut() {
            let settled = actor.main_role().is_some_and(|r| {
                roles::is_paper_chair_role(r) || r.eq_ignore_ascii_case(roles::PC_MEMBER)
            });
            if actor.reviewed_as_pc_member() && !settled {
                actor.general_role = Some(roles::PC_MEMBER.to_string());
                promoted += 1;
            }
        }
        if promoted > 0 {
            roles::register_role(actor_roles, roles::PC_MEMBER);
            tracing::debug!(promoted, "Promoted committee reviewers to PC Member");
        }
    }
}

fn skip(report: &mut LoadReport, line: usize, reason: SkipReason) {
    tracing::debug!(line, %reason, "Skipping log row");
    report.skipped.push(SkippedRow { line, reason });
}

fn touch_actor<'a>(
    actors: &'a mut BTreeMap<ActorId, Actor>,
    id: &ActorId,
    at: NaiveDateTime,
) -> &'a mut Actor {
    let actor = actors
        .entry(id.clone())
        .or_insert_with(|| Actor::new(id.clone(), at));
    actor.observe(at);
    actor
}

/// Target named by the target-type/target-id columns. The type must be a
/// known role or mention an actor or reviewer.
fn column_target(
    schema: &LogSchema,
    fields: &[String],
    known_roles: &[String],
) -> Option<Target> {
    let kind = schema.value(ColumnRole::TargetType, fields)?;
    let id = schema.value(ColumnRole::TargetId, fields)?;
    let lower = kind.to_lowercase();
    let known = known_roles.iter().any(|r| r.eq_ignore_ascii_case(kind));
    let role = if known || lower.contains("reviewer") {
        Some(kind.to_string())
    } else if lower.contains("actor") {
        None
    } else {
        return None;
    };
    Some(Target {
        id: id.to_string(),
        role,
        explicit: false,
    })
}
