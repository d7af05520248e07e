//! Run configuration
//!
//! A TOML file naming the input files of one run:
//!
//! ```toml
//! phases = "phases.csv"
//! action_phases = "action_phases.csv"
//! action_roles = "action_roles.csv"
//! action_encodings = "encodings.csv"
//! log = "events.csv"
//!
//! [loader]
//! default_actor = "none"
//! ```
//!
//! Relative paths are resolved against the file's directory. Command-line
//! flags override individual paths.

use crate::error::{CliError, CliResult};
use revtrace_ingest::{InputPaths, LoaderSettings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything one run needs to load a model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(flatten)]
    pub inputs: InputPaths,

    #[serde(default)]
    pub loader: LoaderSettings,
}

/// Per-file overrides taken from the command line
#[derive(Debug, Clone, Default)]
pub struct InputOverrides {
    pub phases: Option<PathBuf>,
    pub action_phases: Option<PathBuf>,
    pub action_roles: Option<PathBuf>,
    pub action_encodings: Option<PathBuf>,
    pub log: Option<PathBuf>,
}

impl RunConfig {
    /// Load configuration from file; without a file every path must come
    /// from the command line
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CliError::Config(format!("cannot read {}: {e}", path.display())))?;
        let config = Self::parse(&contents)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        tracing::debug!(path = %path.display(), "Loaded run configuration");
        Ok(config.resolve_against(base))
    }

    pub fn parse(contents: &str) -> CliResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn resolve_against(mut self, base: &Path) -> Self {
        self.inputs = self.inputs.resolve_against(base);
        self
    }

    pub fn with_overrides(mut self, overrides: InputOverrides) -> Self {
        if let Some(p) = overrides.phases {
            self.inputs.phases = p;
        }
        if let Some(p) = overrides.action_phases {
            self.inputs.action_phases = p;
        }
        if let Some(p) = overrides.action_roles {
            self.inputs.action_roles = p;
        }
        if let Some(p) = overrides.action_encodings {
            self.inputs.action_encodings = Some(p);
        }
        if let Some(p) = overrides.log {
            self.inputs.log = p;
        }
        self
    }

    /// Every mandatory input must be named
    pub fn validate(&self) -> CliResult<()> {
        let required = [
            ("phases", &self.inputs.phases),
            ("action_phases", &self.inputs.action_phases),
            ("action_roles", &self.inputs.action_roles),
            ("log", &self.inputs.log),
        ];
        for (key, path) in required {
            if path.as_os_str().is_empty() {
                return Err(CliError::Config(format!(
                    "no `{key}` file given (set it in the run configuration or pass --{})",
                    key.replace('_', "-")
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_legacy_keys() {
        let config = RunConfig::parse(
            r#"
            phasesFilePath = "phases.csv"
            actionsMappingFilePath = "action_phases.csv"
            actorsMappingFilePath = "action_roles.csv"
            logFilePath = "log.csv"
            "#,
        )
        .unwrap();
        assert_eq!(config.inputs.phases, PathBuf::from("phases.csv"));
        assert_eq!(config.inputs.action_roles, PathBuf::from("action_roles.csv"));
        assert_eq!(config.inputs.action_encodings, None);
        assert_eq!(config.loader, LoaderSettings::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_loader_section() {
        let config = RunConfig::parse(
            r#"
            log = "log.csv"

            [loader]
            default_actor = "system"
            "#,
        )
        .unwrap();
        assert_eq!(config.loader.default_actor, "system");
        assert_eq!(config.loader.process_type, LoaderSettings::default().process_type);
    }

    #[test]
    fn test_load_resolves_against_config_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("run.toml");
        std::fs::write(&path, "phases = \"phases.csv\"\nlog = \"/data/log.csv\"\n").unwrap();

        let config = RunConfig::load(Some(&path)).unwrap();
        assert_eq!(config.inputs.phases, dir.path().join("phases.csv"));
        assert_eq!(config.inputs.log, PathBuf::from("/data/log.csv"));
    }

    #[test]
    fn test_missing_config_file() {
        let err = RunConfig::load(Some(Path::new("/nonexistent/run.toml"))).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn test_overrides_and_validation() {
        let config = RunConfig::default();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("--phases"));

        let config = RunConfig::default().with_overrides(InputOverrides {
            phases: Some("p.csv".into()),
            action_phases: Some("ap.csv".into()),
            action_roles: Some("ar.csv".into()),
            action_encodings: Some("enc.csv".into()),
            log: Some("log.csv".into()),
        });
        assert!(config.validate().is_ok());
        assert_eq!(config.inputs.action_encodings, Some(PathBuf::from("enc.csv")));
    }
}
