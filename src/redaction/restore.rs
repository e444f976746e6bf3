//! Restoration of redacted text

use crate::domain::{RestorationError, Result};
use crate::redaction::models::tag::tag_regex;
use crate::redaction::models::Mapping;
use std::path::Path;
use tracing::{debug, warn};

/// Inverse of the redactor
#[derive(Debug, Default, Clone, Copy)]
pub struct Restorer;

impl Restorer {
    pub fn new() -> Self {
        Self
    }

    /// Replace every tag in `redacted` with its original value
    ///
    /// The text is scanned once, so restored values are never re-scanned for
    /// tags. Unknown tags stay in place; every known tag is still replaced
    /// and the partially restored text travels with the error.
    pub fn restore(
        &self,
        redacted: &str,
        mapping: &Mapping,
    ) -> std::result::Result<String, RestorationError> {
        let mut restored = String::with_capacity(redacted.len());
        let mut unknown_tags: Vec<String> = Vec::new();
        let mut last = 0;
        let mut replaced = 0usize;

        for found in tag_regex().find_iter(redacted) {
            restored.push_str(&redacted[last..found.start()]);
            match mapping.original(found.as_str()) {
                Some(original) => {
                    restored.push_str(original);
                    replaced += 1;
                }
                None => {
                    restored.push_str(found.as_str());
                    if !unknown_tags.iter().any(|t| t == found.as_str()) {
                        unknown_tags.push(found.as_str().to_string());
                    }
                }
            }
            last = found.end();
        }
        restored.push_str(&redacted[last..]);

        debug!(replaced, unknown = unknown_tags.len(), "Restoration complete");
        if unknown_tags.is_empty() {
            Ok(restored)
        } else {
            warn!(tags = ?unknown_tags, "Tags missing from mapping");
            Err(RestorationError {
                unknown_tags,
                partial: restored,
            })
        }
    }

    /// Load a mapping file and restore `redacted` with it
    ///
    /// A malformed mapping surfaces as a serialization error before any
    /// replacement happens.
    pub fn restore_with_file(&self, redacted: &str, mapping_path: impl AsRef<Path>) -> Result<String> {
        let mapping = Mapping::load(mapping_path)?;
        Ok(self.restore(redacted, &mapping)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PiitagError;
    use std::fs;
    use tempfile::tempdir;

    fn mapping() -> Mapping {
        let mut mapping = Mapping::new();
        mapping
            .tags
            .insert("<<SJ>>".to_string(), "Steve Johnson".to_string());
        mapping
            .tags
            .insert("<<SJ2>>".to_string(), "Sarah Jones".to_string());
        mapping
            .tags
            .insert("<<EMAIL_1>>".to_string(), "<<not a tag>>@x.io".to_string());
        mapping
    }

    #[test]
    fn test_restores_known_tags() {
        let restored = Restorer::new()
            .restore("<<SJ>> met <<SJ2>> at <<SJ>>'s desk", &mapping())
            .unwrap();
        assert_eq!(restored, "Steve Johnson met Sarah Jones at Steve Johnson's desk");
    }

    #[test]
    fn test_restored_values_not_rescanned() {
        let restored = Restorer::new().restore("mail <<EMAIL_1>>", &mapping()).unwrap();
        assert_eq!(restored, "mail <<not a tag>>@x.io");
    }

    #[test]
    fn test_unknown_tags_reported_with_partial_text() {
        let err = Restorer::new()
            .restore("<<SJ>> and <<MJ>> and <<MJ>> and <<PHONE_1>>", &mapping())
            .unwrap_err();
        assert_eq!(err.unknown_tags, vec!["<<MJ>>", "<<PHONE_1>>"]);
        assert_eq!(err.first_tag(), Some("<<MJ>>"));
        assert_eq!(err.partial, "Steve Johnson and <<MJ>> and <<MJ>> and <<PHONE_1>>");
    }

    #[test]
    fn test_text_without_tags_unchanged() {
        let text = "Plain text with << angle >> brackets";
        assert_eq!(Restorer::new().restore(text, &Mapping::new()).unwrap(), text);
    }

    #[test]
    fn test_malformed_mapping_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.map.json");
        fs::write(&path, "{\"tags\": {\"<<SJ>>\": ").unwrap();
        let result = Restorer::new().restore_with_file("<<SJ>>", &path);
        assert!(matches!(result, Err(PiitagError::Serialization(_))));
    }

    #[test]
    fn test_restore_with_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.map.json");
        mapping().save(&path).unwrap();
        let restored = Restorer::new().restore_with_file("Hi <<SJ2>>", &path).unwrap();
        assert_eq!(restored, "Hi Sarah Jones");
    }
}
