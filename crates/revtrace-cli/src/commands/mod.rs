//! CLI command implementations

pub mod actions;
pub mod phases;
pub mod progress;
pub mod summary;

use crate::config::RunConfig;
use crate::error::CliResult;
use revtrace_ingest::{LoadReport, LogLoader};
use revtrace_phases::PhaseCompletenessChecker;
use revtrace_types::ProcessModel;

/// A loaded model with the report of its log load
pub struct Session {
    pub model: ProcessModel,
    pub report: LoadReport,
}

impl Session {
    pub fn load(config: &RunConfig) -> CliResult<Self> {
        config.validate()?;
        let mut loader = LogLoader::with_settings(config.loader.clone());
        let report = loader.load_inputs(&config.inputs)?;
        Ok(Self {
            model: loader.into_model(),
            report,
        })
    }

    /// Run the phase analysis over the loaded model
    pub fn analyze(&mut self) -> bool {
        let analyzed =
            PhaseCompletenessChecker::new().determine_phase_completeness_dates(&mut self.model);
        if !analyzed {
            tracing::warn!("No phase completion dates could be determined");
        }
        analyzed
    }
}
