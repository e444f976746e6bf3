//! Configuration schema types
//!
//! This module defines the configuration structure for piitag. Every
//! section is optional; an empty file yields the defaults.

use crate::redaction::RedactionConfig;
use serde::{Deserialize, Serialize};

/// Main piitag configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PiitagConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Redaction pipeline settings
    #[serde(default)]
    pub redaction: RedactionConfig,

    /// Where redacted files and mappings are written
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PiitagConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.redaction.validate().map_err(|e| format!("{e:#}"))?;
        self.output.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (detect and report, write nothing)
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Output locations and file naming
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for redacted text files
    #[serde(default = "default_output_directory")]
    pub directory: String,

    /// Directory for mapping files; defaults to `directory`
    #[serde(default)]
    pub mappings_directory: Option<String>,

    /// Prefix of redacted file names (`<prefix>_<name>`)
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            mappings_directory: None,
            prefix: default_prefix(),
        }
    }
}

impl OutputConfig {
    fn validate(&self) -> Result<(), String> {
        if self.directory.trim().is_empty() {
            return Err("output.directory cannot be empty".to_string());
        }
        if self.prefix.is_empty() {
            return Err("output.prefix cannot be empty".to_string());
        }
        if self.prefix.contains(['/', '\\']) {
            return Err(format!(
                "output.prefix '{}' must not contain path separators",
                self.prefix
            ));
        }
        Ok(())
    }

    /// Directory mapping files are written to
    pub fn mappings_dir(&self) -> &str {
        self.mappings_directory.as_deref().unwrap_or(&self.directory)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_output_directory() -> String {
    "./redacted".to_string()
}

fn default_prefix() -> String {
    "REDACTED".to_string()
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig {
            log_level: "info".to_string(),
            dry_run: false,
        };

        assert!(config.validate().is_ok());

        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_output_config_validation() {
        let mut config = OutputConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.mappings_dir(), "./redacted");

        config.mappings_directory = Some("./maps".to_string());
        assert_eq!(config.mappings_dir(), "./maps");

        config.prefix = "out/put".to_string();
        assert!(config.validate().is_err());

        config.prefix = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_logging_config_validation() {
        let mut config = LoggingConfig::default();
        assert!(config.validate().is_ok());

        config.local_rotation = "weekly".to_string();
        assert!(config.validate().is_err());

        config.local_rotation = "hourly".to_string();
        config.local_enabled = true;
        config.local_path = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: PiitagConfig = toml::from_str("").unwrap();
        assert_eq!(config.application.log_level, "info");
        assert_eq!(config.output.prefix, "REDACTED");
        assert!(!config.logging.local_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_redaction_errors_surface() {
        let mut config = PiitagConfig::default();
        config.redaction.validation.confidence_threshold = -0.1;
        let err = config.validate().unwrap_err();
        assert!(err.contains("confidence_threshold"));
    }
}
