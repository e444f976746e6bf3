//! Placeholder tag syntax
//!
//! Person tags render as `<<INITIALS[n]>>` and structured entities as
//! `<<TYPE_n>>`. The redactor's generators and the restorer's scanner both
//! go through this module so the two sides always agree.

use crate::redaction::models::EntityKind;
use regex::Regex;
use std::sync::OnceLock;

/// Opening delimiter
pub const TAG_OPEN: &str = "<<";

/// Closing delimiter
pub const TAG_CLOSE: &str = ">>";

static TAG_REGEX: OnceLock<Regex> = OnceLock::new();

/// Regex matching any tag-shaped token
pub fn tag_regex() -> &'static Regex {
    TAG_REGEX.get_or_init(|| {
        Regex::new(r"<<[\p{L}\p{N}_]+>>").expect("tag pattern is a valid regex")
    })
}

/// True when `s` is exactly one tag
pub fn is_tag(s: &str) -> bool {
    tag_regex()
        .find(s)
        .is_some_and(|m| m.start() == 0 && m.end() == s.len())
}

/// Uppercased first letter of every whitespace-separated token
///
/// "Steve Johnson" → "SJ", "Marie-Anne de la Cruz" → "MDLC". Leading
/// punctuation is skipped ("(Ann" → "A"); a name without any letter falls
/// back to "P".
pub fn initials(name: &str) -> String {
    let initials: String = name
        .split_whitespace()
        .filter_map(|token| token.chars().find(|c| c.is_alphabetic()))
        .flat_map(char::to_uppercase)
        .collect();
    if initials.is_empty() {
        "P".to_string()
    } else {
        initials
    }
}

/// Person tag; `ordinal` 1 renders without a suffix
pub fn person_tag(initials: &str, ordinal: usize) -> String {
    if ordinal <= 1 {
        format!("{TAG_OPEN}{initials}{TAG_CLOSE}")
    } else {
        format!("{TAG_OPEN}{initials}{ordinal}{TAG_CLOSE}")
    }
}

/// Typed tag for structured entities
pub fn typed_tag(kind: EntityKind, n: usize) -> String {
    format!("{TAG_OPEN}{}_{n}{TAG_CLOSE}", kind.label())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initials() {
        assert_eq!(initials("Steve Johnson"), "SJ");
        assert_eq!(initials("mary"), "M");
        assert_eq!(initials("  Jean  Luc   Picard "), "JLP");
        assert_eq!(initials("Élodie Durand"), "ÉD");
        assert_eq!(initials("--"), "P");
    }

    #[test]
    fn test_tag_rendering() {
        assert_eq!(person_tag("SJ", 1), "<<SJ>>");
        assert_eq!(person_tag("SJ", 3), "<<SJ3>>");
        assert_eq!(typed_tag(EntityKind::Email, 1), "<<EMAIL_1>>");
        assert_eq!(typed_tag(EntityKind::IdNumber, 12), "<<ID_NUMBER_12>>");
    }

    #[test]
    fn test_generated_tags_match_scanner() {
        for tag in [
            person_tag("SJ", 1),
            person_tag("ÉD", 2),
            typed_tag(EntityKind::Ssn, 4),
        ] {
            assert!(is_tag(&tag), "{tag} should be recognized");
        }
        assert!(!is_tag("<<not a tag>>"));
        assert!(!is_tag("x<<SJ>>"));
        assert!(!is_tag("<SJ>"));
    }
}
