//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file and an empty blocklist.

use crate::cli::exit_code;
use clap::Args;
use std::fs;
use std::path::Path;

/// Blocklist template written next to the configuration
pub const BLOCKLIST_TEMPLATE_NAME: &str = "piitag-blocklist.txt";

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "piitag.toml")]
    pub output: String,

    /// Include every setting with its default and a comment
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing piitag configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(exit_code::CONFIGURATION_ERROR);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        if let Err(e) = fs::write(&self.output, config_content) {
            println!("❌ Failed to write configuration file");
            println!("   Error: {e}");
            return Ok(exit_code::FATAL);
        }

        let blocklist = Path::new(&self.output).with_file_name(BLOCKLIST_TEMPLATE_NAME);
        if !blocklist.exists() {
            if let Err(e) = fs::write(&blocklist, Self::generate_blocklist_template()) {
                println!("❌ Failed to write blocklist template");
                println!("   Error: {e}");
                return Ok(exit_code::FATAL);
            }
            println!("✅ Blocklist template created: {}", blocklist.display());
        }

        println!("✅ Configuration file created: {}", self.output);
        println!();
        println!("Next steps:");
        println!("  1. Edit {} with your settings", self.output);
        println!(
            "  2. Add terms that must never be redacted to {BLOCKLIST_TEMPLATE_NAME} and list it under [redaction.blocklist]"
        );
        println!("  3. Validate configuration: piitag validate-config");
        println!("  4. Preview a run: piitag redact --dry-run <files>");
        println!();
        Ok(exit_code::SUCCESS)
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# piitag Configuration File
# Reversible PII redaction for plain-text documents

[application]
log_level = "info"
dry_run = false

[redaction.detection]
# auto, resume, transcript or general
doc_type = "auto"

[redaction.validation]
confidence_threshold = 0.6
# separate or proximity
ambiguous_first_name = "separate"

[redaction.blocklist]
use_default = true
# files = ["./piitag-blocklist.txt"]

[output]
directory = "./redacted"
prefix = "REDACTED"
"#
        .to_string()
    }

    /// Generate configuration with every setting documented
    fn generate_config_with_examples() -> String {
        r#"# piitag Configuration File
# Reversible PII redaction for plain-text documents
#
# Values may reference environment variables as ${VAR_NAME}.
# Any setting can also be overridden with PIITAG_<SECTION>_<KEY>,
# for example PIITAG_OUTPUT_DIRECTORY or PIITAG_REDACTION_CONFIDENCE_THRESHOLD.

[application]
# trace, debug, info, warn or error
log_level = "info"
# Detect and report without writing files
dry_run = false

[redaction.detection]
# auto classifies each document; resume, transcript or general force a type
doc_type = "auto"
# How far into a resume or general document to look for a header name
header_scan_chars = 500
# Also redact places (GPE) and organizations (ORG)
redact_places_and_orgs = false
# Replace the built-in pattern library with a TOML file
# pattern_library = "./patterns.toml"

[redaction.validation]
# Minimum model confidence for a person or place candidate
confidence_threshold = 0.6
# separate: a bare first name shared by several people gets its own tag
# proximity: it joins the closest preceding full name
ambiguous_first_name = "separate"

[redaction.blocklist]
# Include the built-in list of section headings and job titles
use_default = true
# One term per line; lines starting with # are ignored
files = ["./piitag-blocklist.txt"]
# Inline terms
terms = []

[redaction.review]
# Second pass over titles, possessives and name conjunctions
enabled = true
# Also flag unclaimed capitalized phrases (noisy)
capitalized_phrases = false
# Replace later mentions of known people the model missed
sweep_residual_mentions = true

[redaction.audit]
# Append one entry per document; values are stored as SHA-256 hashes
enabled = false
log_path = "./audit/piitag-audit.log"
json_format = true

[output]
directory = "./redacted"
# Defaults to the output directory
# mappings_directory = "./mappings"
# Redacted files are written as <prefix>_<name>
prefix = "REDACTED"

[logging]
# JSON log files in addition to console output
local_enabled = false
local_path = "./logs"
# daily, hourly or never
local_rotation = "daily"
"#
        .to_string()
    }

    fn generate_blocklist_template() -> String {
        r#"# piitag blocklist
# Terms listed here are never redacted (case-insensitive, one per line).
# Typical entries: product names, team names, headings that look like names.
"#
        .to_string()
    }
}
