//! Regex-based structured PII detector

use super::{patterns::PatternRegistry, Detector};
use crate::redaction::models::{Candidate, Source, Span};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, warn};

/// Regex-based detector for EMAIL, PHONE, SSN, URL, DOB, ID_NUMBER and ADDRESS
///
/// Candidates come out in pattern-library order, then match order. Overlaps
/// between patterns are left for the span merger.
pub struct PatternMatcher {
    pattern_registry: Arc<PatternRegistry>,
}

impl PatternMatcher {
    /// Create a matcher over the built-in pattern library
    pub fn new() -> Result<Self> {
        let registry = PatternRegistry::default_patterns()?;
        Ok(Self::with_registry(Arc::new(registry)))
    }

    /// Create a matcher over a shared registry
    pub fn with_registry(registry: Arc<PatternRegistry>) -> Self {
        Self {
            pattern_registry: registry,
        }
    }
}

impl Detector for PatternMatcher {
    fn detect(&self, text: &str) -> Result<Vec<Candidate>> {
        let mut candidates = Vec::new();

        for pattern in self.pattern_registry.all_patterns() {
            for found in pattern.regex.find_iter(text) {
                // Backtracking limits are per match; skip the rest of this pattern
                let matched = match found {
                    Ok(m) => m,
                    Err(e) => {
                        warn!(pattern = %pattern.name, error = %e, "Pattern evaluation failed");
                        break;
                    }
                };

                let mut end = matched.end();
                if let Some(trim) = &pattern.trim_trailing {
                    end = matched.start()
                        + matched.as_str().trim_end_matches(|c| trim.contains(c)).len();
                }
                if end <= matched.start() {
                    continue;
                }

                let span = Span::new(matched.start(), end);
                candidates.push(Candidate::new(text, span, pattern.kind, Source::Pattern));
            }
        }

        debug!(count = candidates.len(), "Pattern detection complete");
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redaction::models::EntityKind;

    fn kinds(text: &str) -> Vec<(EntityKind, String)> {
        let matcher = PatternMatcher::new().unwrap();
        matcher
            .detect(text)
            .unwrap()
            .into_iter()
            .map(|c| (c.kind(), c.text().to_string()))
            .collect()
    }

    #[test]
    fn test_detects_email() {
        let found = kinds("Contact: steve.johnson@gmail.com");
        assert_eq!(
            found,
            vec![(EntityKind::Email, "steve.johnson@gmail.com".to_string())]
        );
    }

    #[test]
    fn test_url_trailing_punctuation_trimmed() {
        let found = kinds("See https://example.com/profile).");
        assert!(found.contains(&(EntityKind::Url, "https://example.com/profile".to_string())));
    }

    #[test]
    fn test_ssn_also_matches_id_number() {
        let found = kinds("SSN 123456789");
        assert!(found.contains(&(EntityKind::Ssn, "123456789".to_string())));
        assert!(found.contains(&(EntityKind::IdNumber, "123456789".to_string())));
        // SSN is listed first in the library
        let ssn_pos = found.iter().position(|(k, _)| *k == EntityKind::Ssn).unwrap();
        let id_pos = found
            .iter()
            .position(|(k, _)| *k == EntityKind::IdNumber)
            .unwrap();
        assert!(ssn_pos < id_pos);
    }

    #[test]
    fn test_offsets_point_into_text() {
        let text = "Zoë, call 555-123-4567";
        let matcher = PatternMatcher::new().unwrap();
        for candidate in matcher.detect(text).unwrap() {
            assert_eq!(candidate.span().slice(text), candidate.text());
            assert_eq!(candidate.source(), Source::Pattern);
        }
    }

    #[test]
    fn test_plain_prose_has_no_matches() {
        assert!(kinds("Reported to Mary Jackson on the third floor").is_empty());
    }
}
