//! Analysis options, loadable from a JSON file.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```json
//! {
//!   "assignment": { "min_identity": 0.9 },
//!   "contamination": { "expected_environment": "freshwater" },
//!   "rarefaction": { "iterations": 50 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::assignment::engine::AssignmentConfig;
use crate::contamination::screener::ContaminationConfig;
use crate::diversity::rarefaction::RarefactionConfig;
use crate::utils::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(#[from] ValidationError),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub assignment: AssignmentConfig,
    #[serde(default)]
    pub contamination: ContaminationConfig,
    #[serde(default)]
    pub rarefaction: RarefactionConfig,
}

impl AnalysisConfig {
    /// Load and validate a JSON config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read,
    /// `ConfigError::Parse` for malformed JSON or unknown enum values, and
    /// `ConfigError::Invalid` for out-of-range options.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// # Errors
    ///
    /// Same as [`AnalysisConfig::load_from_file`], minus I/O.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns the first out-of-range option.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.assignment.validate()?;
        self.contamination.validate()?;
        self.rarefaction.validate()?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if serialization fails.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Environment, Severity};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.assignment.min_identity, 0.80);
        assert_eq!(config.assignment.high_confidence_threshold, 70);
        assert_eq!(config.assignment.resolver_timeout_ms, 5000);
        assert_eq!(config.contamination.expected_environment, Environment::Marine);
        assert_eq!(config.contamination.index_bleed_threshold, 0.001);
        assert_eq!(config.contamination.index_bleed_min_abundance, 100);
        assert!(config.contamination.negative_control_sequences.is_empty());
        assert_eq!(config.contamination.min_severity, Severity::High);
        assert_eq!(config.rarefaction.steps, 20);
        assert_eq!(config.rarefaction.iterations, 10);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AnalysisConfig::from_json(
            r#"{
                "assignment": {"min_identity": 0.9},
                "contamination": {"expected_environment": "freshwater", "min_severity": "medium"}
            }"#,
        )
        .unwrap();
        assert_eq!(config.assignment.min_identity, 0.9);
        assert_eq!(config.assignment.resolver_timeout_ms, 5000);
        assert_eq!(
            config.contamination.expected_environment,
            Environment::Freshwater
        );
        assert_eq!(config.contamination.min_severity, Severity::Medium);
        assert_eq!(config.rarefaction.steps, 20);

        assert!(AnalysisConfig::from_json("{}").is_ok());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            AnalysisConfig::from_json(r#"{"rarefaction": {"steps": 0}}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            AnalysisConfig::from_json(r#"{"contamination": {"expected_environment": "lunar"}}"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file_round_trip() {
        let mut config = AnalysisConfig::default();
        config.rarefaction.iterations = 25;

        let mut temp = NamedTempFile::with_suffix(".json").unwrap();
        temp.write_all(config.to_json().unwrap().as_bytes()).unwrap();
        temp.flush().unwrap();

        let loaded = AnalysisConfig::load_from_file(temp.path()).unwrap();
        assert_eq!(loaded.rarefaction.iterations, 25);
    }
}
