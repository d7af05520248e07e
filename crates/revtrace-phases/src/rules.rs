//! Completion heuristics, one per review phase
//!
//! Every rule reads a process's threads and returns the date its phase was
//! satisfied, or nothing when the threshold is unmet. Unmet thresholds fall
//! back to the end of the process's observed lifetime. Rules never fail:
//! missing phases, roles or threads simply yield fewer qualifying tasks.

use chrono::NaiveDate;
use revtrace_types::roles::{self, role_matches};
use revtrace_types::{Actor, ActorId, Phase, PhaseTable, ProcessInstance, ProcessThread};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const ASSIGNMENT_TO_PC_REVIEWERS: &str = "Assignment to PC Reviewers";
pub const ASSIGNMENT_TO_EXTERNAL_REVIEWERS: &str = "Assignment to External Reviewers";
pub const REVIEWING: &str = "Reviewing";
pub const DISCUSSION: &str = "Discussion";
pub const REVIEW_SUMMARIZATION: &str = "Review Summarization";
pub const ROUND_1_DECISION: &str = "Round 1 Decision";
pub const REVISION_SUBMISSION: &str = "Revision Submission";
pub const RECOMMENDATION_UPDATE: &str = "Recommendation Update";
pub const FINAL_DECISION: &str = "Final Decision";

/// Minimum committee assignments for the PC assignment phase
const PC_ASSIGNMENTS_NEEDED: usize = 2;
/// Minimum accepted external reviewers
const EXTERNALS_NEEDED: usize = 2;
/// Minimum reviewers with a complete review
const REVIEWS_NEEDED: usize = 4;
/// Minimum non-chair participants in the discussion
const DISCUSSANTS_NEEDED: usize = 3;

/// When a phase was completed for one process
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "date", rename_all = "snake_case")]
pub enum Completion {
    /// The phase's activity threshold was met on this date
    Reached(NaiveDate),
    /// The threshold was never met; the process's last activity date stands in
    LifetimeEnd(NaiveDate),
}

impl Completion {
    pub fn date(self) -> NaiveDate {
        match self {
            Self::Reached(d) | Self::LifetimeEnd(d) => d,
        }
    }

    pub fn is_reached(self) -> bool {
        matches!(self, Self::Reached(_))
    }
}

/// Read-only model state the rules consult
#[derive(Clone, Copy, Debug)]
pub struct RuleContext<'a> {
    pub phases: &'a PhaseTable,
    pub actors: &'a BTreeMap<ActorId, Actor>,
}

impl<'a> RuleContext<'a> {
    pub fn new(phases: &'a PhaseTable, actors: &'a BTreeMap<ActorId, Actor>) -> Self {
        Self { phases, actors }
    }

    fn phase(&self, name: &str) -> Option<&'a Phase> {
        self.phases.get(name)
    }

    fn general_role(&self, actor: &ActorId) -> Option<&'a str> {
        self.actors.get(actor).and_then(Actor::main_role)
    }

    /// The thread's role in its process, else the actor's lifetime role
    fn thread_role<'t>(&self, thread: &'t ProcessThread) -> Option<&'t str>
    where
        'a: 't,
    {
        thread
            .role()
            .or_else(|| self.general_role(&thread.actor))
    }

    fn is_chair(&self, thread: &ProcessThread) -> bool {
        role_matches(self.thread_role(thread), roles::is_paper_chair_role)
    }

    /// Chair in this process or anywhere in the log
    fn is_lifetime_chair(&self, thread: &ProcessThread) -> bool {
        self.is_chair(thread)
            || role_matches(self.general_role(&thread.actor), roles::is_paper_chair_role)
    }

    fn is_pc_member(&self, thread: &ProcessThread) -> bool {
        role_matches(self.thread_role(thread), roles::is_pc_member_role)
    }
}

/// The completion heuristic of one named phase
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseRule {
    PcAssignment,
    ExternalAssignment,
    Reviewing,
    Discussion,
    ReviewSummarization,
    RoundOneDecision,
    RecommendationUpdate,
    FinalDecision,
}

impl fmt::Display for PhaseRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.phase_name())
    }
}

impl PhaseRule {
    pub const ALL: [PhaseRule; 8] = [
        Self::PcAssignment,
        Self::ExternalAssignment,
        Self::Reviewing,
        Self::Discussion,
        Self::ReviewSummarization,
        Self::RoundOneDecision,
        Self::RecommendationUpdate,
        Self::FinalDecision,
    ];

    pub fn phase_name(self) -> &'static str {
        match self {
            Self::PcAssignment => ASSIGNMENT_TO_PC_REVIEWERS,
            Self::ExternalAssignment => ASSIGNMENT_TO_EXTERNAL_REVIEWERS,
            Self::Reviewing => REVIEWING,
            Self::Discussion => DISCUSSION,
            Self::ReviewSummarization => REVIEW_SUMMARIZATION,
            Self::RoundOneDecision => ROUND_1_DECISION,
            Self::RecommendationUpdate => RECOMMENDATION_UPDATE,
            Self::FinalDecision => FINAL_DECISION,
        }
    }

    /// The rule for a phase name (case-insensitive); phases such as
    /// "Submission" have none
    pub fn for_phase(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|rule| rule.phase_name().eq_ignore_ascii_case(name.trim()))
    }

    /// Evaluate this rule for one process, flagging late tasks as a side
    /// effect. `None` when the process has no tasks.
    pub fn evaluate(
        self,
        ctx: &RuleContext<'_>,
        phase: &Phase,
        process: &mut ProcessInstance,
    ) -> Option<Completion> {
        let lifetime_end = process.lifetime()?.end.date();
        let reached = match self {
            Self::PcAssignment => pc_assignment(ctx, phase, process),
            Self::ExternalAssignment => external_assignment(ctx, phase, process),
            Self::Reviewing => reviewing(ctx, phase, process),
            Self::Discussion => discussion(ctx, phase, process),
            Self::ReviewSummarization => review_summarization(ctx, phase, process),
            Self::RoundOneDecision => round_one_decision(ctx, phase, process),
            Self::RecommendationUpdate => recommendation_update(ctx, phase, process),
            Self::FinalDecision => final_decision(ctx, phase, process),
        };
        Some(match reached {
            Some(date) => Completion::Reached(date),
            None => Completion::LifetimeEnd(lifetime_end),
        })
    }
}

/// The n-th earliest date (1-based), if at least n were collected
fn nth_earliest(mut dates: Vec<NaiveDate>, n: usize) -> Option<NaiveDate> {
    dates.sort_unstable();
    n.checked_sub(1).and_then(|idx| dates.get(idx).copied())
}

fn is_decision(task: &revtrace_types::TaskInstance) -> bool {
    task.action_contains("decision")
}

/// Earliest chair decision whose date satisfies `accept`
fn earliest_chair_decision(
    ctx: &RuleContext<'_>,
    threads: &[ProcessThread],
    accept: impl Fn(NaiveDate) -> bool,
) -> Option<NaiveDate> {
    threads
        .iter()
        .filter(|t| ctx.is_chair(t))
        .flat_map(|t| t.tasks.iter())
        .filter(|task| is_decision(task))
        .map(|task| task.date())
        .filter(|d| accept(*d))
        .min()
}

/// Chair decisions satisfying `accept`: flag each late one, return the earliest
fn flag_chair_decisions(
    ctx: &RuleContext<'_>,
    phase: &Phase,
    threads: &mut [ProcessThread],
    accept: impl Fn(NaiveDate) -> bool,
) -> Option<NaiveDate> {
    let mut earliest: Option<NaiveDate> = None;
    for thread in threads.iter_mut() {
        if !ctx.is_chair(thread) {
            continue;
        }
        for task in thread.tasks.iter_mut().filter(|t| is_decision(t)) {
            let d = task.date();
            if accept(d) {
                task.is_delayed = d > phase.end_date;
                earliest = Some(earliest.map_or(d, |e| e.min(d)));
            }
        }
    }
    earliest
}

// ── Assignment to PC Reviewers ──────────────────────────────────────

/// Second-earliest chair assignment of an actor who ends up holding a
/// committee role in the process and has a thread of their own.
fn pc_assignment(
    ctx: &RuleContext<'_>,
    phase: &Phase,
    process: &mut ProcessInstance,
) -> Option<NaiveDate> {
    let ProcessInstance {
        threads,
        role_assignments,
        ..
    } = process;
    let with_thread: Vec<ActorId> = threads.iter().map(|t| t.actor.clone()).collect();

    let mut dates = Vec::new();
    for thread in threads.iter_mut() {
        if !ctx.is_lifetime_chair(thread) {
            continue;
        }
        for task in thread.tasks.iter_mut().filter(|t| t.action_contains("assign")) {
            let hits = task
                .targets()
                .iter()
                .filter(|actor| {
                    role_matches(role_assignments.get(actor), roles::is_pc_member_role)
                        && with_thread.contains(actor)
                })
                .count();
            if hits > 0 {
                let d = task.date();
                task.is_delayed = d > phase.end_date;
                dates.extend(std::iter::repeat(d).take(hits));
            }
        }
    }
    nth_earliest(dates, PC_ASSIGNMENTS_NEEDED)
}

// ── Assignment to External Reviewers ────────────────────────────────

/// Date the reviewer accepted, flagging a late acceptance. Without a logged
/// acceptance, the first review counts.
fn acceptance_date(thread: &mut ProcessThread, phase: &Phase) -> Option<NaiveDate> {
    if let Some(task) = thread.tasks.iter_mut().find(|t| t.action_contains("accept")) {
        let d = task.date();
        task.is_delayed = d > phase.end_date;
        return Some(d);
    }
    thread
        .tasks
        .iter()
        .find(|t| t.action_contains("review"))
        .map(|t| t.date())
}

fn external_assignment(
    ctx: &RuleContext<'_>,
    phase: &Phase,
    process: &mut ProcessInstance,
) -> Option<NaiveDate> {
    let threads = &mut process.threads;

    let mut accepted = Vec::new();
    for thread in threads.iter_mut() {
        if role_matches(ctx.thread_role(thread), roles::is_external_role)
            && !thread.only_declined()
        {
            accepted.extend(acceptance_date(thread, phase));
        }
    }
    accepted.sort_unstable();
    let mut reached = accepted.get(EXTERNALS_NEEDED - 1).copied();

    // A single external may be paired with a second committee reviewer
    if let [first] = accepted.as_slice() {
        let mut secondaries: Vec<&mut ProcessThread> = threads
            .iter_mut()
            .filter(|t| {
                role_matches(ctx.thread_role(t), roles::is_secondary_role) && !t.only_declined()
            })
            .collect();
        secondaries.sort_by_key(|t| t.first_start());
        if secondaries.len() > 1 {
            if let Some(last) = secondaries.last_mut() {
                reached = acceptance_date(last, phase).map(|d| d.max(*first));
            }
        }
    }

    for thread in threads.iter_mut() {
        if !(ctx.is_chair(thread) || ctx.is_pc_member(thread)) {
            continue;
        }
        for task in thread.tasks.iter_mut() {
            let invites = task.action_contains("assign") || task.action_contains("invitation");
            if invites && !task.targets().is_empty() {
                task.is_delayed = task.date() > phase.end_date;
            }
        }
    }
    reached
}

// ── Reviewing ───────────────────────────────────────────────────────

/// Fourth-earliest first complete review among non-chair threads. Review
/// tasks logged between the round-1 decision and the revision submission,
/// or after the final decision opened, are late.
fn reviewing(
    ctx: &RuleContext<'_>,
    phase: &Phase,
    process: &mut ProcessInstance,
) -> Option<NaiveDate> {
    let round_one = ctx.phase(ROUND_1_DECISION);
    let revision = ctx.phase(REVISION_SUBMISSION);
    let final_decision = ctx.phase(FINAL_DECISION);
    let is_late = |d: NaiveDate| match round_one {
        Some(r1) => {
            d >= r1.start_date
                && match (revision, final_decision) {
                    (None, None) => true,
                    _ => {
                        revision.is_some_and(|p| d < p.start_date)
                            || final_decision.is_some_and(|p| d >= p.start_date)
                    }
                }
        }
        None => d > phase.end_date,
    };

    let mut first_completions = Vec::new();
    for thread in process.threads.iter_mut() {
        if ctx.is_chair(thread) {
            continue;
        }
        let mut first_complete = None;
        for task in thread.tasks.iter_mut().filter(|t| t.action_ends_with("review")) {
            let d = task.date();
            task.is_delayed = is_late(d);
            if first_complete.is_none() && task.is_completed_review() {
                first_complete = Some(d);
            }
        }
        first_completions.extend(first_complete);
    }
    nth_earliest(first_completions, REVIEWS_NEEDED)
}

// ── Discussion ──────────────────────────────────────────────────────

/// Latest first comment once three non-chair participants commented.
/// Otherwise a committee member's complete review after the phase end
/// (an implicit summary), else the chair's earliest decision before the
/// decision phase ends.
fn discussion(
    ctx: &RuleContext<'_>,
    phase: &Phase,
    process: &mut ProcessInstance,
) -> Option<NaiveDate> {
    let mut first_comments = Vec::new();
    let mut summary: Option<NaiveDate> = None;

    for thread in process.threads.iter_mut() {
        if ctx.is_chair(thread) {
            continue;
        }
        let pc_member = ctx.is_pc_member(thread);
        let mut commented: Option<NaiveDate> = None;
        for task in thread.tasks.iter_mut() {
            let d = task.date();
            if task.action_contains("comment") {
                task.is_delayed = d > phase.end_date;
                commented.get_or_insert(d);
            } else if summary.is_none()
                && commented.is_some()
                && pc_member
                && task.is_completed_review()
                && d > phase.end_date
            {
                summary = Some(d);
                break;
            }
        }
        first_comments.extend(commented);
    }

    if first_comments.len() >= DISCUSSANTS_NEEDED {
        return first_comments.into_iter().max();
    }
    if summary.is_some() {
        return summary;
    }
    let decision_phase = ctx
        .phase(ROUND_1_DECISION)
        .or_else(|| ctx.phase(REVISION_SUBMISSION))?;
    earliest_chair_decision(ctx, &process.threads, |d| d < decision_phase.end_date)
}

// ── Review Summarization ────────────────────────────────────────────

/// Latest complete committee review that follows the member's own comment
/// and precedes the round-1 decision end; else the chair's decision.
fn review_summarization(
    ctx: &RuleContext<'_>,
    phase: &Phase,
    process: &mut ProcessInstance,
) -> Option<NaiveDate> {
    let deadline = ctx.phase(ROUND_1_DECISION).map(|p| p.end_date);
    let before_deadline = |d: NaiveDate| deadline.map_or(true, |end| d < end);

    let mut latest: Option<NaiveDate> = None;
    for thread in process.threads.iter_mut() {
        if !ctx.is_pc_member(thread) {
            continue;
        }
        let mut discussed = false;
        for task in thread.tasks.iter_mut() {
            let d = task.date();
            if discussed && task.is_completed_review() && before_deadline(d) {
                latest = latest.max(Some(d));
                task.is_delayed = d > phase.end_date;
            } else {
                discussed = discussed || task.action_contains("comment");
            }
        }
    }
    latest.or_else(|| earliest_chair_decision(ctx, &process.threads, before_deadline))
}

// ── Decisions ───────────────────────────────────────────────────────

/// Earliest chair decision before the final decision phase opens
fn round_one_decision(
    ctx: &RuleContext<'_>,
    phase: &Phase,
    process: &mut ProcessInstance,
) -> Option<NaiveDate> {
    let final_start = ctx.phase(FINAL_DECISION).map(|p| p.start_date);
    flag_chair_decisions(ctx, phase, &mut process.threads, |d| {
        final_start.map_or(true, |start| d < start)
    })
}

/// Earliest complete committee review after the revision submission closed
fn recommendation_update(
    ctx: &RuleContext<'_>,
    phase: &Phase,
    process: &mut ProcessInstance,
) -> Option<NaiveDate> {
    let revision_end = ctx.phase(REVISION_SUBMISSION)?.end_date;
    let mut earliest: Option<NaiveDate> = None;
    for thread in process.threads.iter_mut() {
        if !ctx.is_pc_member(thread) {
            continue;
        }
        for task in thread.tasks.iter_mut() {
            let d = task.date();
            if task.is_completed_review() && d > revision_end {
                task.is_delayed = d > phase.end_date;
                earliest = Some(earliest.map_or(d, |e| e.min(d)));
            }
        }
    }
    earliest
}

/// Earliest chair decision on or after the phase start
fn final_decision(
    ctx: &RuleContext<'_>,
    phase: &Phase,
    process: &mut ProcessInstance,
) -> Option<NaiveDate> {
    let start = phase.start_date;
    flag_chair_decisions(ctx, phase, &mut process.threads, |d| d >= start)
}
