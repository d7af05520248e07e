//! `actions`: action types with their configuration and daily counts

use super::Session;
use crate::error::CliResult;
use crate::output::{print_structured, table, OutputFormat};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use tabled::Tabled;

#[derive(Debug, Serialize)]
pub struct ActionReport {
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub total: usize,
    pub daily: BTreeMap<NaiveDate, usize>,
}

#[derive(Tabled)]
struct ActionRow {
    action: String,
    code: String,
    phase: String,
    actor_role: String,
    total: usize,
    busiest_day: String,
}

pub fn build(session: &Session) -> Vec<ActionReport> {
    let mut counts = session.model.action_counts_by_day();
    session
        .model
        .action_types
        .iter()
        .map(|action| {
            let daily = counts.remove(&action.type_name).unwrap_or_default();
            ActionReport {
                action: action.type_name.clone(),
                phase: action.phase_name.clone(),
                actor_role: action.actor_role.clone(),
                code: action.code.clone(),
                total: daily.values().sum(),
                daily,
            }
        })
        .collect()
}

pub fn execute(session: &Session, format: OutputFormat) -> CliResult<()> {
    let report = build(session);
    if print_structured(&report, format)? {
        return Ok(());
    }

    let rows: Vec<ActionRow> = report
        .into_iter()
        .map(|a| {
            let busiest_day = a
                .daily
                .iter()
                .max_by_key(|(day, count)| (**count, std::cmp::Reverse(**day)))
                .map(|(day, count)| format!("{day} ({count})"))
                .unwrap_or_default();
            ActionRow {
                action: a.action,
                code: a.code.unwrap_or_default(),
                phase: a.phase.unwrap_or_default(),
                actor_role: a.actor_role.unwrap_or_default(),
                total: a.total,
                busiest_day,
            }
        })
        .collect();
    println!("{}", table(rows));
    Ok(())
}
