//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::PiitagConfig;
use crate::domain::errors::PiitagError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into PiitagConfig
/// 4. Applies environment variable overrides (PIITAG_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns a [`PiitagError::Configuration`] if any step fails.
///
/// # Examples
///
/// ```no_run
/// use piitag::config::loader::load_config;
///
/// let config = load_config("piitag.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<PiitagConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(PiitagError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        PiitagError::Configuration(format!(
            "Failed to read configuration file {}: {e}",
            path.display()
        ))
    })?;

    parse_config(&contents)
}

/// Load `path` when it exists, otherwise start from defaults
///
/// Environment overrides and validation apply either way.
pub fn load_config_or_default(path: impl AsRef<Path>) -> Result<PiitagConfig> {
    let path = path.as_ref();
    if path.exists() {
        return load_config(path);
    }

    tracing::debug!(path = %path.display(), "No configuration file, using defaults");
    let mut config = PiitagConfig::default();
    apply_env_overrides(&mut config)?;
    validate(&config)?;
    Ok(config)
}

/// Parse configuration text (substitution, overrides, validation)
pub fn parse_config(contents: &str) -> Result<PiitagConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: PiitagConfig = toml::from_str(&contents)
        .map_err(|e| PiitagError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;
    validate(&config)?;

    Ok(config)
}

fn validate(config: &PiitagConfig) -> Result<()> {
    config.validate().map_err(|e| {
        PiitagError::Configuration(format!("Configuration validation failed: {e}"))
    })
}

fn env_var_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("valid regex"))
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = env_var_regex();
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |caps: &regex::Captures<'_>| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    caps[0].to_string()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(PiitagError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_bool(name: &str, val: &str) -> Result<bool> {
    val.parse()
        .map_err(|_| PiitagError::Configuration(format!("Invalid {name} value: {val}")))
}

/// Applies environment variable overrides using the PIITAG_* prefix
///
/// Variables follow the pattern PIITAG_<SECTION>_<KEY>, for example
/// PIITAG_OUTPUT_DIRECTORY or PIITAG_REDACTION_CONFIDENCE_THRESHOLD.
fn apply_env_overrides(config: &mut PiitagConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("PIITAG_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("PIITAG_APPLICATION_DRY_RUN") {
        config.application.dry_run = parse_bool("PIITAG_APPLICATION_DRY_RUN", &val)?;
    }

    // Redaction overrides
    config
        .redaction
        .apply_env_overrides()
        .map_err(|e| PiitagError::Configuration(format!("{e:#}")))?;

    // Output overrides
    if let Ok(val) = std::env::var("PIITAG_OUTPUT_DIRECTORY") {
        config.output.directory = val;
    }
    if let Ok(val) = std::env::var("PIITAG_OUTPUT_MAPPINGS_DIRECTORY") {
        config.output.mappings_directory = Some(val);
    }
    if let Ok(val) = std::env::var("PIITAG_OUTPUT_PREFIX") {
        config.output.prefix = val;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("PIITAG_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_bool("PIITAG_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Ok(val) = std::env::var("PIITAG_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("PIITAG_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("PIITAG_TEST_SUBST_DIR", "/tmp/redacted");
        let input = "directory = \"${PIITAG_TEST_SUBST_DIR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "directory = \"/tmp/redacted\"\n");
        std::env::remove_var("PIITAG_TEST_SUBST_DIR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("PIITAG_TEST_MISSING_VAR");
        let input = "prefix = \"${PIITAG_TEST_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("PIITAG_TEST_MISSING_VAR"));
    }

    #[test]
    fn test_comments_not_substituted() {
        std::env::remove_var("PIITAG_TEST_COMMENTED");
        let input = "# prefix = \"${PIITAG_TEST_COMMENTED}\"\n";
        assert_eq!(substitute_env_vars(input).unwrap(), input);
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(matches!(result, Err(PiitagError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "debug"

[redaction.detection]
doc_type = "resume"

[redaction.validation]
confidence_threshold = 0.65
ambiguous_first_name = "proximity"

[redaction.blocklist]
terms = ["Project Falcon"]

[output]
directory = "./out"
prefix = "SAFE"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.redaction.detection.doc_type, "resume");
        assert_eq!(config.redaction.validation.confidence_threshold, 0.65);
        assert_eq!(config.redaction.blocklist.terms, vec!["Project Falcon"]);
        assert_eq!(config.output.prefix, "SAFE");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let result = parse_config("[redaction.detection]\ndoc_type = \"invoice\"\n");
        let err = result.unwrap_err();
        assert!(matches!(err, PiitagError::Configuration(_)));
        assert!(err.to_string().contains("validation failed"));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        assert!(matches!(
            parse_config("[output\nprefix = 1"),
            Err(PiitagError::Configuration(_))
        ));
    }
}
