//! Redact command implementation
//!
//! This module implements the `redact` command: each input file is redacted
//! and written as `<prefix>_<name>` next to a `<name>.map.json` mapping.
//! With no files, stdin is redacted to stdout.

use crate::cli::exit_code;
use crate::config::{load_config_or_default, OutputConfig, PiitagConfig};
use crate::redaction::{RedactedDocument, RedactionEngine, SourceDocument};
use anyhow::{anyhow, Context, Result};
use clap::Args;
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Arguments for the redact command
#[derive(Args, Debug)]
pub struct RedactArgs {
    /// UTF-8 text files to redact (reads stdin when none are given)
    pub files: Vec<PathBuf>,

    /// Document type: auto, resume, transcript or general
    #[arg(long, value_name = "TYPE")]
    pub doc_type: Option<String>,

    /// Detect and report without writing any file
    #[arg(long)]
    pub dry_run: bool,

    /// Override the output directory
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<String>,

    /// Override the mapping directory
    #[arg(long, value_name = "DIR")]
    pub mappings_dir: Option<String>,

    /// Also write the run report as JSON
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
}

impl RedactArgs {
    /// Execute the redact command
    pub async fn execute(&self, config_path: &str) -> Result<i32> {
        tracing::info!(files = self.files.len(), "Starting redact command");
        let to_stdout = self.files.is_empty();

        let mut config = match load_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("❌ {e}");
                return Ok(exit_code::CONFIGURATION_ERROR);
            }
        };
        self.apply_overrides(&mut config);

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("❌ Configuration validation failed: {e}");
            return Ok(exit_code::CONFIGURATION_ERROR);
        }

        let dry_run = self.dry_run || config.application.dry_run;
        let engine = match RedactionEngine::new(config.redaction.clone()) {
            Ok(engine) => engine.with_dry_run(dry_run),
            Err(e) => {
                tracing::error!(error = ?e, "Failed to create redaction engine");
                eprintln!("❌ Failed to initialize redaction: {e:#}");
                return Ok(exit_code::CONFIGURATION_ERROR);
            }
        };

        if dry_run {
            tracing::info!("Dry run mode enabled - no files will be written");
            status(to_stdout, "🔍 DRY RUN MODE - No files will be written");
        }

        let (documents, read_failures) = self.read_inputs()?;
        let (results, mut report) = engine.process_batch_with_report(documents).await;
        for (source, error) in &read_failures {
            report.add_failure(source, error);
        }

        let mut write_failures = 0;
        if !dry_run {
            for document in results.iter().flatten() {
                if let Err(e) = write_outputs(document, &config.output, to_stdout) {
                    tracing::error!(source = %document.source, error = ?e, "Failed to write output");
                    report.add_warning(format!("Failed to write output for {}: {e:#}", document.source));
                    write_failures += 1;
                }
            }
        }

        let rendered = report.format_console(dry_run);
        if to_stdout {
            eprint!("{rendered}");
        } else {
            print!("{rendered}");
        }

        if let Some(ref path) = self.report {
            report
                .write_to_file(path)
                .with_context(|| format!("Failed to write report {}", path.display()))?;
        }

        let failures = report.failed_documents + write_failures;
        let code = if failures == 0 {
            status(to_stdout, "✅ Redaction completed successfully!");
            exit_code::SUCCESS
        } else if failures < report.total_documents {
            status(to_stdout, "⚠️  Redaction completed with failures");
            exit_code::PARTIAL_FAILURE
        } else {
            status(to_stdout, "❌ Redaction failed");
            exit_code::FATAL
        };
        Ok(code)
    }

    fn apply_overrides(&self, config: &mut PiitagConfig) {
        if let Some(ref doc_type) = self.doc_type {
            tracing::info!(doc_type = %doc_type, "Overriding document type from CLI");
            config.redaction.detection.doc_type = doc_type.clone();
        }
        if let Some(ref dir) = self.output_dir {
            config.output.directory = dir.clone();
        }
        if let Some(ref dir) = self.mappings_dir {
            config.output.mappings_directory = Some(dir.clone());
        }
    }

    /// Read every input; unreadable files are returned as failures
    fn read_inputs(&self) -> Result<(Vec<SourceDocument>, Vec<(String, anyhow::Error)>)> {
        if self.files.is_empty() {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            return Ok((vec![SourceDocument::new("stdin", text)], Vec::new()));
        }

        let mut documents = Vec::with_capacity(self.files.len());
        let mut failures = Vec::new();
        // Output and mapping paths derive from the file name alone
        let mut claimed: HashMap<String, &Path> = HashMap::new();
        for path in &self.files {
            let source = source_name(path);
            if let Some(first) = claimed.get(&source) {
                let e = anyhow!(
                    "{} has the same file name as {}; its outputs would overwrite the earlier ones",
                    path.display(),
                    first.display()
                );
                tracing::warn!(path = %path.display(), "Skipping input with duplicate file name");
                failures.push((path.display().to_string(), e));
                continue;
            }
            claimed.insert(source.clone(), path.as_path());
            match read_text(path) {
                Ok(text) => documents.push(SourceDocument::new(source, text)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable input");
                    failures.push((source, e));
                }
            }
        }
        Ok((documents, failures))
    }
}

fn status(to_stderr: bool, message: &str) {
    if to_stderr {
        eprintln!("{message}");
    } else {
        println!("{message}");
    }
}

fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    String::from_utf8(bytes).with_context(|| format!("{} is not valid UTF-8 text", path.display()))
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `<prefix>_<name>`
pub fn redacted_file_name(prefix: &str, source: &str) -> String {
    format!("{prefix}_{source}")
}

/// `<name>.map.json`, keeping the extension so `notes.txt` and `notes.md`
/// get separate mappings
pub fn mapping_file_name(source: &str) -> String {
    format!("{source}.map.json")
}

fn write_outputs(document: &RedactedDocument, output: &OutputConfig, to_stdout: bool) -> Result<()> {
    let mapping_path = Path::new(output.mappings_dir()).join(mapping_file_name(&document.source));
    document
        .mapping
        .save(&mapping_path)
        .with_context(|| format!("Failed to write mapping {}", mapping_path.display()))?;

    if to_stdout {
        print!("{}", document.redacted_text);
        return Ok(());
    }

    fs::create_dir_all(&output.directory)
        .with_context(|| format!("Failed to create output directory {}", output.directory))?;
    let redacted_path =
        Path::new(&output.directory).join(redacted_file_name(&output.prefix, &document.source));
    fs::write(&redacted_path, &document.redacted_text)
        .with_context(|| format!("Failed to write {}", redacted_path.display()))?;

    tracing::info!(
        source = %document.source,
        output = %redacted_path.display(),
        mapping = %mapping_path.display(),
        "Wrote redacted document"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redaction::Mapping;
    use tempfile::tempdir;

    fn args(files: Vec<PathBuf>, out: &Path) -> RedactArgs {
        RedactArgs {
            files,
            doc_type: None,
            dry_run: false,
            output_dir: Some(out.to_string_lossy().into_owned()),
            mappings_dir: None,
            report: None,
        }
    }

    #[test]
    fn test_output_names() {
        assert_eq!(redacted_file_name("REDACTED", "cv.txt"), "REDACTED_cv.txt");
        assert_eq!(mapping_file_name("cv.txt"), "cv.txt.map.json");
        assert_ne!(mapping_file_name("notes.txt"), mapping_file_name("notes.md"));
        assert_eq!(mapping_file_name("stdin"), "stdin.map.json");
    }

    #[tokio::test]
    async fn test_redacts_files_and_writes_mappings() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("memo.txt");
        fs::write(&input, "Contact: ann@lee.io").unwrap();
        let out = dir.path().join("out");

        let code = args(vec![input], &out)
            .execute(dir.path().join("none.toml").to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, exit_code::SUCCESS);

        let redacted = fs::read_to_string(out.join("REDACTED_memo.txt")).unwrap();
        assert_eq!(redacted, "Contact: <<EMAIL_1>>");
        let mapping = Mapping::load(out.join("memo.txt.map.json")).unwrap();
        assert_eq!(mapping.original("<<EMAIL_1>>"), Some("ann@lee.io"));
    }

    #[tokio::test]
    async fn test_inputs_sharing_a_stem_keep_separate_mappings() {
        let dir = tempdir().unwrap();
        let txt = dir.path().join("notes.txt");
        let md = dir.path().join("notes.md");
        fs::write(&txt, "ann@lee.io").unwrap();
        fs::write(&md, "bob@lee.io").unwrap();
        let out = dir.path().join("out");

        let code = args(vec![txt, md], &out)
            .execute(dir.path().join("none.toml").to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, exit_code::SUCCESS);

        let txt_map = Mapping::load(out.join("notes.txt.map.json")).unwrap();
        let md_map = Mapping::load(out.join("notes.md.map.json")).unwrap();
        assert_eq!(txt_map.original("<<EMAIL_1>>"), Some("ann@lee.io"));
        assert_eq!(md_map.original("<<EMAIL_1>>"), Some("bob@lee.io"));
    }

    #[tokio::test]
    async fn test_duplicate_file_name_is_not_overwritten() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("a").join("resume.txt");
        let second = dir.path().join("b").join("resume.txt");
        fs::create_dir_all(first.parent().unwrap()).unwrap();
        fs::create_dir_all(second.parent().unwrap()).unwrap();
        fs::write(&first, "ann@lee.io").unwrap();
        fs::write(&second, "bob@lee.io").unwrap();
        let out = dir.path().join("out");

        let code = args(vec![first, second], &out)
            .execute(dir.path().join("none.toml").to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, exit_code::PARTIAL_FAILURE);

        let mapping = Mapping::load(out.join("resume.txt.map.json")).unwrap();
        assert_eq!(mapping.original("<<EMAIL_1>>"), Some("ann@lee.io"));
        assert_eq!(
            fs::read_to_string(out.join("REDACTED_resume.txt")).unwrap(),
            "<<EMAIL_1>>"
        );
    }

    #[tokio::test]
    async fn test_partial_failure_exit_code() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.txt");
        let bad = dir.path().join("bad.txt");
        fs::write(&good, "plain text").unwrap();
        fs::write(&bad, [0xff, 0xfe, 0x00]).unwrap();

        let code = args(vec![good, bad], &dir.path().join("out"))
            .execute(dir.path().join("none.toml").to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, exit_code::PARTIAL_FAILURE);
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("memo.txt");
        fs::write(&input, "Contact: ann@lee.io").unwrap();
        let out = dir.path().join("out");

        let mut args = args(vec![input], &out);
        args.dry_run = true;
        let code = args
            .execute(dir.path().join("none.toml").to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, exit_code::SUCCESS);
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn test_invalid_doc_type_is_configuration_error() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("memo.txt");
        fs::write(&input, "text").unwrap();

        let mut args = args(vec![input], &dir.path().join("out"));
        args.doc_type = Some("invoice".to_string());
        let code = args
            .execute(dir.path().join("none.toml").to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, exit_code::CONFIGURATION_ERROR);
    }
}
