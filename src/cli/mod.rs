//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for piitag using clap.
//!
//! Exit codes: 0 success, 1 partial failure, 2 configuration error,
//! 3 restoration error, 5 fatal error.

pub mod commands;

use clap::{Parser, Subcommand};

/// Process exit codes
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const PARTIAL_FAILURE: i32 = 1;
    pub const CONFIGURATION_ERROR: i32 = 2;
    pub const RESTORATION_ERROR: i32 = 3;
    pub const FATAL: i32 = 5;
}

/// piitag - reversible PII redaction for plain-text documents
#[derive(Parser, Debug)]
#[command(name = "piitag")]
#[command(version, about, long_about = None)]
#[command(author = "piitag Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "piitag.toml", env = "PIITAG_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "PIITAG_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Redact text files (or stdin) and write tag mappings
    Redact(commands::redact::RedactArgs),

    /// Restore a redacted file from its mapping
    Restore(commands::restore::RestoreArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
