//! Pattern library for structured PII detection

use crate::redaction::models::EntityKind;
use anyhow::{Context, Result};
use fancy_regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Pattern definition from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct PatternDefinition {
    /// Human-readable name used in logs
    pub name: String,
    /// Entity kind label (EMAIL, PHONE, ...)
    pub kind: String,
    /// Regex patterns for this kind
    pub patterns: Vec<String>,
    /// Characters stripped from the end of every match
    #[serde(default)]
    pub trim_trailing: Option<String>,
}

/// Compiled pattern with metadata
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    /// Name of the definition this pattern came from
    pub name: String,
    /// Compiled regex
    pub regex: Regex,
    /// Entity kind
    pub kind: EntityKind,
    /// Characters stripped from the end of every match
    pub trim_trailing: Option<String>,
}

/// Pattern library container
#[derive(Debug, Deserialize)]
struct PatternLibrary {
    patterns: Vec<PatternDefinition>,
}

/// Ordered registry of compiled patterns
///
/// Order is significant: it decides which kind wins when two patterns match
/// exactly the same span.
#[derive(Debug)]
pub struct PatternRegistry {
    patterns: Vec<CompiledPattern>,
    patterns_by_kind: HashMap<EntityKind, Vec<CompiledPattern>>,
}

impl PatternRegistry {
    /// Create a new pattern registry from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!(
                "Failed to read pattern library: {}",
                path.as_ref().display()
            )
        })?;

        Self::from_toml(&content)
    }

    /// Create a pattern registry from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        let library: PatternLibrary =
            toml::from_str(content).context("Failed to parse pattern library TOML")?;

        let mut patterns = Vec::new();
        let mut patterns_by_kind: HashMap<EntityKind, Vec<CompiledPattern>> = HashMap::new();

        for def in library.patterns {
            let kind = Self::parse_kind(&def.kind)
                .with_context(|| format!("Invalid kind in pattern '{}': {}", def.name, def.kind))?;

            for pattern_str in &def.patterns {
                let regex = Regex::new(pattern_str).with_context(|| {
                    format!("Invalid regex in pattern '{}': {pattern_str}", def.name)
                })?;

                let compiled = CompiledPattern {
                    name: def.name.clone(),
                    regex,
                    kind,
                    trim_trailing: def.trim_trailing.clone(),
                };

                patterns.push(compiled.clone());
                patterns_by_kind.entry(kind).or_default().push(compiled);
            }
        }

        Ok(Self {
            patterns,
            patterns_by_kind,
        })
    }

    /// Create a default pattern registry with built-in patterns
    pub fn default_patterns() -> Result<Self> {
        let default_toml = include_str!("../../../../patterns/pii_patterns.toml");
        Self::from_toml(default_toml)
    }

    /// Get all patterns, in library order
    pub fn all_patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    /// Get patterns for a specific kind
    pub fn patterns_for_kind(&self, kind: EntityKind) -> Option<&[CompiledPattern]> {
        self.patterns_by_kind.get(&kind).map(|v| v.as_slice())
    }

    /// Parse kind string to EntityKind
    fn parse_kind(s: &str) -> Result<EntityKind> {
        match s.to_uppercase().as_str() {
            "EMAIL" => Ok(EntityKind::Email),
            "PHONE" => Ok(EntityKind::Phone),
            "SSN" => Ok(EntityKind::Ssn),
            "URL" => Ok(EntityKind::Url),
            "ADDRESS" | "ADDR" => Ok(EntityKind::Address),
            "DOB" | "DATE" => Ok(EntityKind::Dob),
            "ID_NUMBER" | "ID" => Ok(EntityKind::IdNumber),
            "ORG" => Ok(EntityKind::Org),
            "GPE" | "LOC" | "LOCATION" => Ok(EntityKind::Gpe),
            "PERSON" | "NAME" => {
                anyhow::bail!("PERSON spans come from the model, not from patterns")
            }
            _ => anyhow::bail!("Unknown entity kind: {s}"),
        }
    }
}
