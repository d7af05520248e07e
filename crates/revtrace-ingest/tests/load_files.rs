//! Integration tests: configuration files and event logs on disk.

use revtrace_ingest::{IngestError, InputPaths, LogLoader, SkipReason};
use revtrace_types::{ActorId, ProcessId, TargetType};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const PHASES: &str = "phase,start,end
Submission,2025-01-01,2025-01-09
Assignment to PC Reviewers,2025-01-10,2025-01-14
Reviewing,2025-01-15,2025-02-10
";

const ACTION_PHASES: &str = "action,phase
submits,Submission
assigns,Assignment to PC Reviewers
submits review,Reviewing
";

const ACTION_ROLES: &str = "action,actorRole,targetType,targetRole
submits,Author
assigns,Paper Chair,Actor,PC Member
submits review,any,Status
";

const ROLES: &str = "Paper Chair
PC Member
External Reviewer
Author
";

const ENCODINGS: &str = "action,code
submits,S
submits review,SR
";

const LOG: &str = "SubmissionID,Date,Actor,Action,Param
S1,2025-01-05 09:00:00,A1,submits,
S1,2025-01-11 10:00:00,C1,assigns,R1 (primary)
S1,2025-01-12 10:00:00,C1,assigns,R2 (secondary)
S1,2025-01-20 15:30:00,R1,submits review,complete
S2,2025-01-06 08:00:00,A2,submits,
S2,2025-01-16 12:00:00,C1,assigns,R1
";

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

fn fixture() -> (TempDir, InputPaths) {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "phases.csv", PHASES);
    write(dir.path(), "action_phases.csv", ACTION_PHASES);
    write(dir.path(), "action_roles.csv", ACTION_ROLES);
    write(dir.path(), "roles.txt", ROLES);
    write(dir.path(), "encodings.csv", ENCODINGS);
    write(dir.path(), "log.csv", LOG);
    let paths = InputPaths {
        phases: "phases.csv".into(),
        action_phases: "action_phases.csv".into(),
        action_roles: "action_roles.csv".into(),
        action_encodings: Some("encodings.csv".into()),
        log: "log.csv".into(),
    }
    .resolve_against(dir.path());
    (dir, paths)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn full_load_builds_model() {
    let (_dir, paths) = fixture();
    let mut loader = LogLoader::new();
    let report = loader.load_inputs(&paths).unwrap();
    assert_eq!(report.rows, 6);
    assert_eq!(report.tasks_added, 6);
    assert!(report.skipped.is_empty());
    assert_eq!(report.delimiter, Some(','));

    let model = loader.into_model();
    assert_eq!(model.phases.len(), 3);
    assert_eq!(model.processes.len(), 2);
    assert_eq!(model.role_priority.roles()[0], "Paper Chair");

    let assigns = model.action_types.get("assigns").unwrap();
    assert_eq!(assigns.target_type, Some(TargetType::Actor));
    assert_eq!(assigns.phase_name.as_deref(), Some("Assignment to PC Reviewers"));
    assert_eq!(
        model.action_types.get("submits review").unwrap().code.as_deref(),
        Some("SR")
    );

    let s1 = model.process(&ProcessId::new("S1")).unwrap();
    assert_eq!(s1.role_assignments.get(&ActorId::new("R1")), Some("primary"));
    assert_eq!(s1.role_assignments.get(&ActorId::new("R2")), Some("secondary"));
    let review = &s1.thread(&ActorId::new("R1")).unwrap().tasks[0];
    assert_eq!(review.status.as_deref(), Some("complete"));
    assert!(review.scheduled.is_some());
    assert!(s1.state("Reviewing").is_some());

    // Configured target role applies when the parameter carries no role
    let s2 = model.process(&ProcessId::new("S2")).unwrap();
    assert_eq!(s2.role_assignments.get(&ActorId::new("R1")), Some("PC Member"));

    let c1 = model.actor(&ActorId::new("C1")).unwrap();
    assert_eq!(c1.main_role(), Some("Paper Chair"));
    let r1 = model.actor(&ActorId::new("R1")).unwrap();
    assert_eq!(r1.main_role(), Some("PC Member"));
    assert_eq!(r1.role_in(&ProcessId::new("S1")), Some("primary"));
}

#[test]
fn round_trip_assignment_scenario() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "log.csv",
        "SubmissionID,Date,Actor,Action,Param\n\
         S1,2025-01-10,A1,submits,\n\
         S1,2025-01-12,A2,assigns A3 as primary,\n",
    );
    let mut loader = LogLoader::new();
    loader.load_log(&dir.path().join("log.csv")).unwrap();
    let model = loader.into_model();

    assert_eq!(model.processes.len(), 1);
    assert_eq!(model.processes[0].id, ProcessId::new("S1"));
    let ids: Vec<&str> = model.actors.keys().map(ActorId::as_str).collect();
    assert_eq!(ids, vec!["A1", "A2", "A3"]);
    let a3 = model.actor(&ActorId::new("A3")).unwrap();
    assert_eq!(a3.role_in(&ProcessId::new("S1")), Some("primary"));
}

#[test]
fn clear_all_scenario() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "log.csv",
        "SubmissionID,Date,Actor,Action,Param\n\
         S1,2025-01-10,A1,submits,\n\
         S1,2025-01-12,A2,clears all assignments,\n",
    );
    let mut loader = LogLoader::new();
    loader.load_log(&dir.path().join("log.csv")).unwrap();
    let model = loader.into_model();

    let s1 = &model.processes[0];
    assert!(s1.role_assignments.is_empty());
    assert!(model
        .actors
        .values()
        .all(|actor| actor.process_roles.is_empty()));
}

#[test]
fn malformed_rows_do_not_abort() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "log.csv",
        "SubmissionID;Date;Actor;Action\n\
         S1;2025-01-10;A1;submits\n\
         S1;2025-01-11\n\
         S1;11.01.2025;A1;comments\n\
         S1;2025-01-12;A2;comments\n",
    );
    let mut loader = LogLoader::new();
    let report = loader.load_log(&dir.path().join("log.csv")).unwrap();
    assert_eq!(report.delimiter, Some(';'));
    assert_eq!(report.tasks_added, 2);
    assert_eq!(report.skipped.len(), 2);
    assert_eq!(report.skipped[0].line, 3);
    assert!(matches!(
        report.skipped[0].reason,
        SkipReason::TooFewFields { found: 2, needed: 4 }
    ));
    assert!(matches!(report.skipped[1].reason, SkipReason::BadTimestamp { .. }));
}

#[test]
fn missing_files_are_fatal() {
    let dir = TempDir::new().unwrap();
    let mut loader = LogLoader::new();
    let err = loader
        .load_phase_timetable(&dir.path().join("absent.csv"))
        .unwrap_err();
    assert!(matches!(err, IngestError::Io { .. }));
    assert!(err.to_string().contains("absent.csv"));

    let err = loader.load_log(&dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, IngestError::Io { .. }));
}

#[test]
fn roles_file_is_optional() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "action_roles.csv", ACTION_ROLES);
    let mut loader = LogLoader::new();
    let applied = loader
        .load_action_role_mapping(&dir.path().join("action_roles.csv"))
        .unwrap();
    assert_eq!(applied, 3);
    let model = loader.into_model();
    assert!(model.role_priority.is_empty());
    assert_eq!(model.actor_roles, vec!["Author", "Paper Chair", "PC Member"]);
}
