//! Restore command implementation

use crate::cli::exit_code;
use crate::config::load_config_or_default;
use crate::redaction::{Mapping, Restorer};
use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};

/// Arguments for the restore command
#[derive(Args, Debug)]
pub struct RestoreArgs {
    /// Redacted text file
    pub redacted: PathBuf,

    /// Mapping file written alongside it
    pub mapping: PathBuf,

    /// Where to write the restored text (default: RESTORED_<name>)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write the partially restored text when some tags are unknown
    #[arg(long)]
    pub allow_partial: bool,
}

impl RestoreArgs {
    /// Execute the restore command
    pub async fn execute(&self, config_path: &str) -> Result<i32> {
        tracing::info!(
            redacted = %self.redacted.display(),
            mapping = %self.mapping.display(),
            "Starting restore command"
        );

        let prefix = match load_config_or_default(config_path) {
            Ok(config) => config.output.prefix,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(exit_code::CONFIGURATION_ERROR);
            }
        };

        let mapping = match Mapping::load(&self.mapping) {
            Ok(m) => m,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load mapping");
                eprintln!("❌ Failed to load mapping: {e}");
                return Ok(exit_code::RESTORATION_ERROR);
            }
        };

        let redacted = fs::read_to_string(&self.redacted)
            .with_context(|| format!("Failed to read {}", self.redacted.display()))?;
        let output = self
            .output
            .clone()
            .unwrap_or_else(|| restored_path(&self.redacted, &prefix));

        match Restorer::new().restore(&redacted, &mapping) {
            Ok(restored) => {
                write_restored(&output, &restored)?;
                println!("✅ Restored {} tag(s) into {}", mapping.len(), output.display());
                Ok(exit_code::SUCCESS)
            }
            Err(e) => {
                eprintln!("❌ Restoration failed: {e}");
                if !self.allow_partial {
                    return Ok(exit_code::RESTORATION_ERROR);
                }
                write_restored(&output, &e.partial)?;
                println!("⚠️  Partially restored text written to {}", output.display());
                Ok(exit_code::PARTIAL_FAILURE)
            }
        }
    }
}

fn write_restored(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}

/// `RESTORED_<name>` next to the redacted file, with `<prefix>_` stripped
pub fn restored_path(redacted: &Path, prefix: &str) -> PathBuf {
    let name = redacted
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stripped = name
        .strip_prefix(&format!("{prefix}_"))
        .unwrap_or(&name);
    redacted.with_file_name(format!("RESTORED_{stripped}"))
}
