//! Tag mapping: the one artifact needed to restore a redacted document

use crate::domain::{PiitagError, Result};
use crate::redaction::models::tag::is_tag;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

/// Tag ↔ original value record
///
/// Serialized as JSON:
///
/// ```json
/// {
///   "tags": {"<<SJ>>": "Steve Johnson", "<<EMAIL_1>>": "steve@co.com"},
///   "persons": {"Steve Johnson": "<<SJ>>", "Steve": "<<SJ>>"}
/// }
/// ```
///
/// Lookup is by key only; `BTreeMap` just keeps the file output stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    /// Tag → original literal value
    pub tags: BTreeMap<String, String>,

    /// Every known person surface form → person tag
    #[serde(default)]
    pub persons: BTreeMap<String, String>,

    /// Informational metadata; ignored by restoration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MappingMetadata>,
}

/// Provenance recorded alongside a mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingMetadata {
    /// Source file name or "stdin"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// When the document was processed
    pub processed_at: DateTime<Utc>,

    /// Detected or configured document type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,

    /// Number of entity spans replaced
    #[serde(default)]
    pub entities_found: usize,
}

impl Mapping {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Original value for a tag
    pub fn original(&self, tag: &str) -> Option<&str> {
        self.tags.get(tag).map(String::as_str)
    }

    /// Tag assigned to a person surface form
    pub fn person_tag(&self, surface: &str) -> Option<&str> {
        self.persons.get(surface).map(String::as_str)
    }

    /// Number of tags
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// True when no tag was recorded
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Attach provenance metadata
    pub fn with_metadata(mut self, metadata: MappingMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Check the structural invariants of a mapping
    ///
    /// - every key of `tags` is tag-shaped
    /// - no two tags share an original value (bijection)
    /// - every `persons` entry points at a tag present in `tags`
    pub fn check_integrity(&self) -> Result<()> {
        let mut seen: HashMap<&str, &str> = HashMap::with_capacity(self.tags.len());
        for (tag, value) in &self.tags {
            if !is_tag(tag) {
                return Err(PiitagError::Serialization(format!(
                    "mapping key is not a tag: {tag:?}"
                )));
            }
            if let Some(previous) = seen.insert(value.as_str(), tag.as_str()) {
                return Err(PiitagError::Serialization(format!(
                    "tags {previous} and {tag} map to the same value"
                )));
            }
        }
        for (surface, tag) in &self.persons {
            if !self.tags.contains_key(tag) {
                return Err(PiitagError::Serialization(format!(
                    "person entry {surface:?} references unknown tag {tag}"
                )));
            }
        }
        Ok(())
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a mapping and check its integrity
    pub fn from_json(json: &str) -> Result<Self> {
        let mapping: Mapping = serde_json::from_str(json)?;
        mapping.check_integrity()?;
        Ok(mapping)
    }

    /// Load a mapping file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            PiitagError::Io(format!("Failed to read mapping {}: {e}", path.display()))
        })?;
        Self::from_json(&contents).map_err(|e| match e {
            PiitagError::Serialization(msg) => {
                PiitagError::Serialization(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Write a mapping file, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> Mapping {
        let mut mapping = Mapping::new();
        mapping
            .tags
            .insert("<<SJ>>".to_string(), "Steve Johnson".to_string());
        mapping
            .tags
            .insert("<<EMAIL_1>>".to_string(), "steve@co.com".to_string());
        mapping
            .persons
            .insert("Steve Johnson".to_string(), "<<SJ>>".to_string());
        mapping
            .persons
            .insert("Steve".to_string(), "<<SJ>>".to_string());
        mapping
    }

    #[test]
    fn test_json_round_trip() {
        let mapping = sample();
        let json = mapping.to_json().unwrap();
        assert!(!json.contains("metadata"));
        let parsed = Mapping::from_json(&json).unwrap();
        assert_eq!(parsed, mapping);
        assert_eq!(parsed.original("<<SJ>>"), Some("Steve Johnson"));
        assert_eq!(parsed.person_tag("Steve"), Some("<<SJ>>"));
    }

    #[test]
    fn test_metadata_round_trip() {
        let mapping = sample().with_metadata(MappingMetadata {
            source: Some("resume.txt".to_string()),
            processed_at: Utc::now(),
            doc_type: Some("resume".to_string()),
            entities_found: 3,
        });
        let parsed = Mapping::from_json(&mapping.to_json().unwrap()).unwrap();
        assert_eq!(parsed, mapping);
    }

    #[test]
    fn test_truncated_json_is_serialization_error() {
        let json = sample().to_json().unwrap();
        let truncated = &json[..json.len() / 2];
        assert!(matches!(
            Mapping::from_json(truncated),
            Err(PiitagError::Serialization(_))
        ));
    }

    #[test]
    fn test_missing_tags_section_is_rejected() {
        let result = Mapping::from_json(r#"{"persons": {}}"#);
        assert!(matches!(result, Err(PiitagError::Serialization(_))));
    }

    #[test]
    fn test_integrity_checks() {
        let mut dangling = sample();
        dangling
            .persons
            .insert("Mary".to_string(), "<<MJ>>".to_string());
        assert!(dangling.check_integrity().is_err());

        let mut duplicate = sample();
        duplicate
            .tags
            .insert("<<EMAIL_2>>".to_string(), "steve@co.com".to_string());
        assert!(duplicate.check_integrity().is_err());

        let mut bad_key = sample();
        bad_key
            .tags
            .insert("SJ".to_string(), "Someone".to_string());
        assert!(bad_key.check_integrity().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("doc.map.json");
        let mapping = sample();
        mapping.save(&path).unwrap();
        assert_eq!(Mapping::load(&path).unwrap(), mapping);
    }
}
