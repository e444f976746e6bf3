//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the piitag configuration file.

use crate::cli::exit_code;
use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading also applies overrides and validates
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(exit_code::CONFIGURATION_ERROR);
            }
        };

        // Pattern libraries and blocklist contents are only read here
        let loaded = config
            .redaction
            .detection
            .pattern_registry()
            .and_then(|_| config.redaction.blocklist.build());
        if let Err(e) = loaded {
            println!("❌ Configuration validation failed");
            println!("   Error: {e:#}");
            println!();
            return Ok(exit_code::CONFIGURATION_ERROR);
        }

        let redaction = &config.redaction;
        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  Document Type: {}", redaction.detection.doc_type);
        println!(
            "  Places and Organizations: {}",
            redaction.detection.redact_places_and_orgs
        );
        println!(
            "  Confidence Threshold: {}",
            redaction.validation.confidence_threshold
        );
        println!(
            "  Ambiguous First Names: {:?}",
            redaction.validation.ambiguous_first_name
        );
        println!(
            "  Blocklist: default={} files={} terms={}",
            redaction.blocklist.use_default,
            redaction.blocklist.files.len(),
            redaction.blocklist.terms.len()
        );
        println!("  Structural Review: {}", redaction.review.enabled);
        println!(
            "  Audit Log: {}",
            if redaction.audit.enabled {
                redaction.audit.log_path.display().to_string()
            } else {
                "disabled".to_string()
            }
        );
        println!("  Output Directory: {}", config.output.directory);
        println!("  Mapping Directory: {}", config.output.mappings_dir());
        println!("  File Prefix: {}", config.output.prefix);
        println!();
        Ok(exit_code::SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_valid_config_succeeds() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[output]\nprefix = \"SAFE\"").unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, exit_code::SUCCESS);
    }

    #[tokio::test]
    async fn test_missing_config_is_an_error() {
        let code = ValidateArgs {}
            .execute("definitely-missing-piitag.toml")
            .await
            .unwrap();
        assert_eq!(code, exit_code::CONFIGURATION_ERROR);
    }

    #[tokio::test]
    async fn test_missing_blocklist_file_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[redaction.blocklist]\nfiles = [\"/nonexistent/piitag/blocklist.txt\"]"
        )
        .unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, exit_code::CONFIGURATION_ERROR);
    }
}
