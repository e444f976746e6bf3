// piitag - Reversible PII redaction for plain-text documents
// Copyright (c) 2025 piitag Contributors
// Licensed under the MIT License

use piitag::cli::{exit_code, Cli, Commands};
use piitag::config::{load_config_or_default, PiitagConfig};
use piitag::logging::init_logging;
use clap::Parser;
use std::process;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    // This is optional - if .env doesn't exist, it's silently ignored
    let _ = dotenvy::dotenv();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Logging settings come from the config file when it loads; commands
    // report configuration errors themselves
    let config = load_config_or_default(&cli.config).unwrap_or_else(|_| PiitagConfig::default());
    let log_level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.application.log_level.clone());

    let guard = match init_logging(&log_level, &config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(exit_code::FATAL);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "piitag - Reversible PII redaction"
    );

    // Execute command and get exit code
    let code = match execute_command(&cli).await {
        Ok(code) => code,
        Err(e) => {
            piitag::log_error_with_context!(format!("{e:#}"), "Command execution failed");
            eprintln!("Error: {e:#}");
            exit_code::FATAL
        }
    };

    // process::exit skips destructors; flush file logs first
    drop(guard);
    process::exit(code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Redact(args) => args.execute(&cli.config).await,
        Commands::Restore(args) => args.execute(&cli.config).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}
