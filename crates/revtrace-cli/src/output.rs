//! Output formatting utilities

use crate::error::CliResult;
use colored::*;
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain text with tables
    #[default]
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Render rows as a table
pub fn table<T: Tabled>(rows: Vec<T>) -> String {
    if rows.is_empty() {
        "No results".dimmed().to_string()
    } else {
        Table::new(rows).to_string()
    }
}

/// Print a report as JSON or YAML. Returns `false` for text output so the
/// caller renders it.
pub fn print_structured<T: Serialize>(data: &T, format: OutputFormat) -> CliResult<bool> {
    match format {
        OutputFormat::Text => Ok(false),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(data)?);
            Ok(true)
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(data)?);
            Ok(true)
        }
    }
}

/// Print a section heading
pub fn print_heading(title: &str) {
    println!("{}", title.bold());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}
