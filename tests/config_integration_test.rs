//! Integration tests for configuration loading and validation
//!
//! Tests that modify environment variables hold ENV_MUTEX so they do not
//! interfere with each other.

use piitag::config::{load_config, load_config_or_default};
use piitag::redaction::anonymizer::AmbiguityPolicy;
use piitag::redaction::RedactionEngine;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn cleanup_env_vars() {
    for var in [
        "PIITAG_APPLICATION_LOG_LEVEL",
        "PIITAG_REDACTION_CONFIDENCE_THRESHOLD",
        "PIITAG_REDACTION_AMBIGUOUS_FIRST_NAME",
        "PIITAG_OUTPUT_DIRECTORY",
        "PIITAG_TEST_BLOCKLIST_DIR",
    ] {
        std::env::remove_var(var);
    }
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let mut blocklist = NamedTempFile::new().unwrap();
    writeln!(blocklist, "# internal code names\nProject Falcon\nBlue Harbor").unwrap();

    let config_file = write_config(&format!(
        r#"
[application]
log_level = "debug"
dry_run = true

[redaction.detection]
doc_type = "transcript"
header_scan_chars = 300
redact_places_and_orgs = true

[redaction.validation]
confidence_threshold = 0.7
ambiguous_first_name = "proximity"

[redaction.blocklist]
use_default = false
files = ["{}"]
terms = ["Acme Widget"]

[redaction.review]
capitalized_phrases = true

[output]
directory = "./out"
mappings_directory = "./maps"
prefix = "SAFE"

[logging]
local_rotation = "hourly"
"#,
        blocklist.path().display()
    ));

    let config = load_config(config_file.path()).unwrap();
    assert_eq!(config.application.log_level, "debug");
    assert!(config.application.dry_run);
    assert_eq!(config.redaction.detection.header_scan_chars, 300);
    assert_eq!(
        config.redaction.validation.ambiguous_first_name,
        AmbiguityPolicy::Proximity
    );
    assert_eq!(config.output.mappings_dir(), "./maps");

    let built = config.redaction.blocklist.build().unwrap();
    assert!(built.contains("project falcon"));
    assert!(built.contains("Acme Widget"));

    assert!(RedactionEngine::new(config.redaction).is_ok());
}

#[test]
fn test_env_substitution_in_paths() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("terms.txt"), "Blue Harbor\n").unwrap();
    std::env::set_var("PIITAG_TEST_BLOCKLIST_DIR", dir.path());

    let config_file = write_config(
        r#"
[redaction.blocklist]
files = ["${PIITAG_TEST_BLOCKLIST_DIR}/terms.txt"]
"#,
    );

    let config = load_config(config_file.path()).unwrap();
    assert!(config.redaction.blocklist.build().unwrap().contains("blue harbor"));
    cleanup_env_vars();
}

#[test]
fn test_env_overrides_take_precedence() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    std::env::set_var("PIITAG_APPLICATION_LOG_LEVEL", "warn");
    std::env::set_var("PIITAG_REDACTION_CONFIDENCE_THRESHOLD", "0.8");
    std::env::set_var("PIITAG_REDACTION_AMBIGUOUS_FIRST_NAME", "proximity");
    std::env::set_var("PIITAG_OUTPUT_DIRECTORY", "/tmp/piitag-out");

    let config_file = write_config(
        r#"
[application]
log_level = "debug"

[redaction.validation]
confidence_threshold = 0.6
"#,
    );

    let config = load_config(config_file.path());
    cleanup_env_vars();
    let config = config.unwrap();

    assert_eq!(config.application.log_level, "warn");
    assert_eq!(config.redaction.validation.confidence_threshold, 0.8);
    assert_eq!(
        config.redaction.validation.ambiguous_first_name,
        AmbiguityPolicy::Proximity
    );
    assert_eq!(config.output.directory, "/tmp/piitag-out");
}

#[test]
fn test_invalid_override_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    std::env::set_var("PIITAG_REDACTION_CONFIDENCE_THRESHOLD", "high");
    let result = load_config_or_default("definitely-missing-piitag.toml");
    cleanup_env_vars();

    assert!(result.is_err());
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let config = load_config_or_default("definitely-missing-piitag.toml").unwrap();
    assert_eq!(config.redaction.validation.confidence_threshold, 0.6);
    assert_eq!(config.redaction.detection.doc_type, "auto");
    assert!(!config.redaction.audit.enabled);
    assert!(load_config("definitely-missing-piitag.toml").is_err());
}

#[test]
fn test_out_of_range_threshold_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let config_file = write_config("[redaction.validation]\nconfidence_threshold = 1.5\n");
    let err = load_config(config_file.path()).unwrap_err();
    assert!(err.to_string().contains("confidence_threshold"));
}
