//! Configuration management for piitag.
//!
//! # Overview
//!
//! piitag reads an optional TOML configuration file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `PIITAG_*` environment overrides
//! - Default values for every setting
//! - Validation with descriptive errors
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use piitag::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("piitag.toml")?;
//!
//! println!("Threshold: {}", config.redaction.validation.confidence_threshold);
//! println!("Output: {}", config.output.directory);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level and dry-run mode
//! - [`RedactionConfig`](crate::redaction::RedactionConfig) - detection,
//!   validation, blocklist, review and audit settings
//! - [`OutputConfig`] - output directories and file prefix
//! - [`LoggingConfig`] - local log files
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [redaction.detection]
//! doc_type = "auto"
//!
//! [redaction.validation]
//! confidence_threshold = 0.6
//! ambiguous_first_name = "separate"
//!
//! [redaction.blocklist]
//! files = ["${HOME}/.piitag/blocklist.txt"]
//!
//! [output]
//! directory = "./redacted"
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{load_config, load_config_or_default};
pub use schema::{ApplicationConfig, LoggingConfig, OutputConfig, PiitagConfig};
