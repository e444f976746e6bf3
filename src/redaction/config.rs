//! Redaction pipeline configuration

use crate::redaction::anonymizer::AmbiguityPolicy;
use crate::redaction::classifier::{parse_doc_type_setting, DocumentType};
use crate::redaction::detector::headers::DEFAULT_HEADER_SCAN_CHARS;
use crate::redaction::detector::PatternRegistry;
use crate::redaction::validation::{Blocklist, DEFAULT_CONFIDENCE_THRESHOLD};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Pipeline configuration (`[redaction]` in piitag.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RedactionConfig {
    #[serde(default)]
    pub detection: DetectionConfig,

    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub blocklist: BlocklistConfig,

    #[serde(default)]
    pub review: ReviewConfig,

    /// Audit logging configuration
    #[serde(default)]
    pub audit: AuditConfig,
}

impl RedactionConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.detection
            .validate()
            .context("Invalid detection configuration")?;
        self.validation
            .validate()
            .context("Invalid validation configuration")?;
        self.blocklist
            .validate()
            .context("Invalid blocklist configuration")?;
        self.audit.validate().context("Invalid audit configuration")?;
        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.detection.apply_env_overrides()?;
        self.validation.apply_env_overrides()?;
        self.blocklist.apply_env_overrides();
        self.review.apply_env_overrides()?;
        self.audit.apply_env_overrides()?;
        Ok(())
    }
}

/// Detector settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// "auto", "resume", "transcript" or "general"
    #[serde(default = "default_doc_type")]
    pub doc_type: String,

    /// Characters scanned for ALL-CAPS name headers
    #[serde(default = "default_header_scan_chars")]
    pub header_scan_chars: usize,

    /// Also redact ORG and GPE entities reported by the model
    #[serde(default)]
    pub redact_places_and_orgs: bool,

    /// Path to a pattern library TOML file replacing the built-in one
    #[serde(default)]
    pub pattern_library: Option<PathBuf>,
}

fn default_doc_type() -> String {
    "auto".to_string()
}

fn default_header_scan_chars() -> usize {
    DEFAULT_HEADER_SCAN_CHARS
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            doc_type: default_doc_type(),
            header_scan_chars: default_header_scan_chars(),
            redact_places_and_orgs: false,
            pattern_library: None,
        }
    }
}

impl DetectionConfig {
    /// Configured document type; `None` means classify each document
    pub fn doc_type_override(&self) -> Result<Option<DocumentType>> {
        parse_doc_type_setting(&self.doc_type).map_err(anyhow::Error::msg)
    }

    /// Compile the configured pattern library, or the built-in one
    pub fn pattern_registry(&self) -> Result<PatternRegistry> {
        match self.pattern_library {
            Some(ref path) => PatternRegistry::from_file(path),
            None => PatternRegistry::default_patterns(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.doc_type_override()?;

        if let Some(ref path) = self.pattern_library {
            if !path.exists() {
                anyhow::bail!("Pattern library file not found: {}", path.display());
            }
            if path.extension().and_then(|s| s.to_str()) != Some("toml") {
                anyhow::bail!("Pattern library must be a TOML file: {}", path.display());
            }
        }
        Ok(())
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("PIITAG_REDACTION_DOC_TYPE") {
            self.doc_type = val;
        }

        if let Ok(val) = std::env::var("PIITAG_REDACTION_HEADER_SCAN_CHARS") {
            self.header_scan_chars = val
                .parse()
                .context("Invalid PIITAG_REDACTION_HEADER_SCAN_CHARS value")?;
        }

        if let Ok(val) = std::env::var("PIITAG_REDACTION_PLACES_AND_ORGS") {
            self.redact_places_and_orgs = val
                .parse()
                .context("Invalid PIITAG_REDACTION_PLACES_AND_ORGS value")?;
        }

        if let Ok(val) = std::env::var("PIITAG_REDACTION_PATTERN_LIBRARY") {
            self.pattern_library = Some(PathBuf::from(val));
        }
        Ok(())
    }
}

/// PERSON validation and grouping settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Minimum confidence for a PERSON candidate (inclusive)
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,

    /// How a bare name shared by several people is grouped
    #[serde(default)]
    pub ambiguous_first_name: AmbiguityPolicy,
}

fn default_confidence_threshold() -> f32 {
    DEFAULT_CONFIDENCE_THRESHOLD
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            ambiguous_first_name: AmbiguityPolicy::default(),
        }
    }
}

impl ValidationConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            anyhow::bail!(
                "confidence_threshold must be between 0.0 and 1.0, got {}",
                self.confidence_threshold
            );
        }
        Ok(())
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("PIITAG_REDACTION_CONFIDENCE_THRESHOLD") {
            self.confidence_threshold = val
                .parse()
                .context("Invalid PIITAG_REDACTION_CONFIDENCE_THRESHOLD value")?;
        }

        if let Ok(val) = std::env::var("PIITAG_REDACTION_AMBIGUOUS_FIRST_NAME") {
            self.ambiguous_first_name = val
                .parse()
                .map_err(anyhow::Error::msg)
                .context("Invalid PIITAG_REDACTION_AMBIGUOUS_FIRST_NAME value")?;
        }
        Ok(())
    }
}

/// Blocked strings that are never treated as names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlocklistConfig {
    /// Include the bundled default list
    #[serde(default = "default_true")]
    pub use_default: bool,

    /// Blocklist files, one term per line
    #[serde(default)]
    pub files: Vec<PathBuf>,

    /// Inline terms
    #[serde(default)]
    pub terms: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl Default for BlocklistConfig {
    fn default() -> Self {
        Self {
            use_default: true,
            files: Vec::new(),
            terms: Vec::new(),
        }
    }
}

impl BlocklistConfig {
    /// Assemble the blocklist from every configured source
    pub fn build(&self) -> Result<Blocklist> {
        let mut blocklist = if self.use_default {
            Blocklist::with_defaults()
        } else {
            Blocklist::new()
        };
        for path in &self.files {
            blocklist.load_file(path)?;
        }
        for term in &self.terms {
            blocklist.insert(term);
        }
        Ok(blocklist)
    }

    pub fn validate(&self) -> Result<()> {
        for path in &self.files {
            if !path.is_file() {
                anyhow::bail!("Blocklist file not found: {}", path.display());
            }
        }
        Ok(())
    }

    /// `PIITAG_REDACTION_BLOCKLIST_FILES` is a comma-separated list that
    /// replaces the configured files
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("PIITAG_REDACTION_BLOCKLIST_FILES") {
            self.files = val
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .collect();
        }
    }
}

/// Second-pass settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Run the structural review pass
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Let the review pass propose any uncovered 2-3 word capitalized phrase
    #[serde(default)]
    pub capitalized_phrases: bool,

    /// Redact unclaimed repeats of known names
    #[serde(default = "default_true")]
    pub sweep_residual_mentions: bool,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capitalized_phrases: false,
            sweep_residual_mentions: true,
        }
    }
}

impl ReviewConfig {
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("PIITAG_REDACTION_REVIEW_ENABLED") {
            self.enabled = val
                .parse()
                .context("Invalid PIITAG_REDACTION_REVIEW_ENABLED value")?;
        }

        if let Ok(val) = std::env::var("PIITAG_REDACTION_REVIEW_CAPITALIZED_PHRASES") {
            self.capitalized_phrases = val
                .parse()
                .context("Invalid PIITAG_REDACTION_REVIEW_CAPITALIZED_PHRASES value")?;
        }

        if let Ok(val) = std::env::var("PIITAG_REDACTION_SWEEP_RESIDUAL_MENTIONS") {
            self.sweep_residual_mentions = val
                .parse()
                .context("Invalid PIITAG_REDACTION_SWEEP_RESIDUAL_MENTIONS value")?;
        }
        Ok(())
    }
}

/// Audit logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Enable audit logging
    #[serde(default)]
    pub enabled: bool,

    /// Audit log file path
    #[serde(default = "default_audit_log_path")]
    pub log_path: PathBuf,

    /// Use JSON format for audit logs
    #[serde(default = "default_true")]
    pub json_format: bool,
}

fn default_audit_log_path() -> PathBuf {
    PathBuf::from("./audit/piitag-audit.log")
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_path: default_audit_log_path(),
            json_format: true,
        }
    }
}

impl AuditConfig {
    /// Validate audit configuration
    pub fn validate(&self) -> Result<()> {
        if self.enabled {
            if let Some(parent) = self.log_path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create audit log directory: {}", parent.display())
                    })?;
                }
            }
        }
        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("PIITAG_REDACTION_AUDIT_ENABLED") {
            self.enabled = val
                .parse()
                .context("Invalid PIITAG_REDACTION_AUDIT_ENABLED value")?;
        }

        if let Ok(val) = std::env::var("PIITAG_REDACTION_AUDIT_LOG_PATH") {
            self.log_path = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("PIITAG_REDACTION_AUDIT_JSON_FORMAT") {
            self.json_format = val
                .parse()
                .context("Invalid PIITAG_REDACTION_AUDIT_JSON_FORMAT value")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = RedactionConfig::default();
        assert_eq!(config.detection.doc_type, "auto");
        assert_eq!(config.detection.header_scan_chars, 500);
        assert!(!config.detection.redact_places_and_orgs);
        assert_eq!(config.validation.confidence_threshold, 0.6);
        assert_eq!(
            config.validation.ambiguous_first_name,
            AmbiguityPolicy::Separate
        );
        assert!(config.blocklist.use_default);
        assert!(config.review.enabled);
        assert!(!config.review.capitalized_phrases);
        assert!(!config.audit.enabled);
        assert!(config.audit.json_format);
    }

    #[test]
    fn test_config_validation() {
        assert!(RedactionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_threshold() {
        let mut config = RedactionConfig::default();
        config.validation.confidence_threshold = 1.5;
        let err = config.validate().unwrap_err();
        assert!(format!("{err:#}").contains("confidence_threshold"));
    }

    #[test]
    fn test_invalid_doc_type() {
        let mut config = RedactionConfig::default();
        config.detection.doc_type = "memo".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_pattern_library() {
        let mut config = RedactionConfig::default();
        config.detection.pattern_library = Some(PathBuf::from("/nonexistent/patterns.toml"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blocklist_sources_combine() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blocked.txt");
        std::fs::write(&path, "# team names\nProject Falcon\n").unwrap();

        let config = BlocklistConfig {
            use_default: false,
            files: vec![path],
            terms: vec!["Blue Team".to_string()],
        };
        let blocklist = config.build().unwrap();
        assert_eq!(blocklist.len(), 2);
        assert!(blocklist.contains("project falcon"));
        assert!(blocklist.contains("BLUE TEAM"));
    }

    #[test]
    fn test_deserialize_partial_section() {
        let config: RedactionConfig = toml::from_str(
            r#"
            [validation]
            confidence_threshold = 0.7
            ambiguous_first_name = "proximity"
            "#,
        )
        .unwrap();
        assert_eq!(config.validation.confidence_threshold, 0.7);
        assert_eq!(
            config.validation.ambiguous_first_name,
            AmbiguityPolicy::Proximity
        );
        assert_eq!(config.detection.doc_type, "auto");
    }
}
