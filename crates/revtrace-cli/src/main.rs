//! revtrace - command-line reports over peer-review process logs
//!
//! Loads a phase timetable, the action mappings and an event log, then:
//! - summarizes what was reconstructed
//! - reports when each process completed each review phase
//! - groups processes by the phase holding them up on a given date
//! - lists action types with their daily activity

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;
mod output;

use commands::{actions, phases, progress, summary, Session};
use config::{InputOverrides, RunConfig};
use error::CliResult;

/// revtrace CLI application
#[derive(Parser)]
#[command(name = "revtrace")]
#[command(about = "Reconstruct and analyze peer-review process logs", long_about = None)]
#[command(version)]
struct Cli {
    /// Run configuration file (TOML)
    #[arg(short, long, env = "REVTRACE_CONFIG")]
    config: Option<PathBuf>,

    /// Phase timetable CSV
    #[arg(long)]
    phases: Option<PathBuf>,

    /// Action to phase mapping CSV
    #[arg(long)]
    action_phases: Option<PathBuf>,

    /// Action to role mapping CSV (roles.txt is read from its directory)
    #[arg(long)]
    action_roles: Option<PathBuf>,

    /// Action encodings CSV
    #[arg(long)]
    action_encodings: Option<PathBuf>,

    /// Event log CSV
    #[arg(long)]
    log: Option<PathBuf>,

    /// Output format (text, json, yaml)
    #[arg(short, long, default_value = "text")]
    output: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Counts of what was loaded, skipped rows and the phase timetable
    Summary,

    /// Completion date of every phase per process
    Phases,

    /// Processes grouped by the phase they had not completed on a date
    Progress {
        /// Reference date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
    },

    /// Action types with phase, role, code and daily counts
    Actions,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    let config = RunConfig::load(cli.config.as_deref())?.with_overrides(InputOverrides {
        phases: cli.phases,
        action_phases: cli.action_phases,
        action_roles: cli.action_roles,
        action_encodings: cli.action_encodings,
        log: cli.log,
    });
    let mut session = Session::load(&config)?;

    match cli.command {
        Commands::Summary => summary::execute(&session, cli.output),
        Commands::Phases => phases::execute(&mut session, cli.output),
        Commands::Progress { date } => progress::execute(&mut session, date, cli.output),
        Commands::Actions => actions::execute(&session, cli.output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_progress_parses_date() {
        let args = ["revtrace", "--log", "l.csv", "progress", "--date", "2025-01-24"];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Progress { date } => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2025, 1, 24).unwrap())
            }
            _ => panic!("expected progress"),
        }
        assert!(Cli::try_parse_from(["revtrace", "progress", "--date", "soon"]).is_err());
    }

    #[test]
    fn test_output_flag() {
        let cli = Cli::try_parse_from(["revtrace", "-o", "yaml", "summary"]).unwrap();
        assert_eq!(cli.output, output::OutputFormat::Yaml);
    }
}
