//! Second-pass structural review
//!
//! Looks at text no accepted entity covers for names the first pass
//! missed. Findings are HEURISTIC PERSON candidates; they still go through
//! the validator like any other candidate.

use crate::redaction::detector::ModelAnalysis;
use crate::redaction::merge::SpanMerger;
use crate::redaction::models::{Candidate, EntityKind, ScoredEntity, Source, Span};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::debug;

/// Bytes of context inspected on each side of an accepted name
const CONJUNCTION_WINDOW: usize = 80;

struct ReviewPatterns {
    title: Regex,
    possessive: Regex,
    capitalized_phrase: Regex,
    and_after: Regex,
    and_before: Regex,
}

static PATTERNS: OnceLock<ReviewPatterns> = OnceLock::new();

fn patterns() -> &'static ReviewPatterns {
    PATTERNS.get_or_init(|| ReviewPatterns {
        title: Regex::new(
            r"\b(?:Mr|Mrs|Ms|Miss|Dr|Prof|Professor|Rev|Judge|Hon)\.?[ \t]+([A-Z][a-z]+(?:[ \t]+[A-Z][a-z]+)?)\b",
        )
        .expect("valid regex"),
        possessive: Regex::new(r"\b([A-Z][a-z]{2,})(?:'|\x{2019})s\b").expect("valid regex"),
        capitalized_phrase: Regex::new(r"\b([A-Z][a-z]{2,}(?:[ \t]+[A-Z][a-z]{2,}){1,2})\b")
            .expect("valid regex"),
        and_after: Regex::new(r"^[ \t]+and[ \t]+([A-Z][a-z]{2,}(?:[ \t]+[A-Z][a-z]{2,})?)\b")
            .expect("valid regex"),
        and_before: Regex::new(r"\b([A-Z][a-z]{2,}(?:[ \t]+[A-Z][a-z]{2,})?)[ \t]+and[ \t]+$")
            .expect("valid regex"),
    })
}

/// Structural review pass
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralReview {
    capitalized_phrases: bool,
}

impl StructuralReview {
    /// `capitalized_phrases` also proposes every uncovered run of two or
    /// three capitalized words
    pub fn new(capitalized_phrases: bool) -> Self {
        Self {
            capitalized_phrases,
        }
    }

    /// Propose PERSON candidates in text not covered by `accepted`
    ///
    /// Returned candidates are disjoint from each other and from every
    /// accepted span.
    pub fn review(
        &self,
        text: &str,
        accepted: &[ScoredEntity],
        analysis: Option<&ModelAnalysis>,
    ) -> Vec<Candidate> {
        let claimed: Vec<Span> = accepted.iter().map(ScoredEntity::span).collect();
        let known_tokens: HashSet<String> = accepted
            .iter()
            .filter(|e| e.kind() == EntityKind::Person)
            .flat_map(|e| e.text().split_whitespace().map(str::to_lowercase).collect::<Vec<_>>())
            .filter(|t| t.chars().count() >= 3)
            .collect();

        let mut spans: Vec<Span> = Vec::new();
        let p = patterns();

        spans.extend(capture_spans(&p.title, text, 0));

        for m in p.possessive.captures_iter(text) {
            if let Some(word) = m.get(1) {
                if known_tokens.contains(&word.as_str().to_lowercase()) {
                    spans.push(Span::new(word.start(), word.end()));
                }
            }
        }

        for entity in accepted.iter().filter(|e| e.kind() == EntityKind::Person) {
            let span = entity.span();

            let after_end = floor_char_boundary(text, span.end + CONJUNCTION_WINDOW);
            spans.extend(capture_spans(&p.and_after, &text[span.end..after_end], span.end));

            let before_start = ceil_char_boundary(text, span.start.saturating_sub(CONJUNCTION_WINDOW));
            spans.extend(capture_spans(
                &p.and_before,
                &text[before_start..span.start],
                before_start,
            ));
        }

        if self.capitalized_phrases {
            spans.extend(capture_spans(&p.capitalized_phrase, text, 0));
        }

        let candidates: Vec<Candidate> = spans
            .into_iter()
            .filter(|s| !claimed.iter().any(|c| c.overlaps(s)))
            .map(|span| {
                let candidate = Candidate::new(text, span, EntityKind::Person, Source::Heuristic);
                match analysis {
                    Some(a) => candidate.with_pos_tags(a.pos_tags_within(span)),
                    None => candidate,
                }
            })
            .collect();

        let merged = SpanMerger::new().merge(candidates);
        if !merged.is_empty() {
            debug!(count = merged.len(), "Structural review proposed candidates");
        }
        merged
    }
}

fn capture_spans(regex: &Regex, haystack: &str, offset: usize) -> Vec<Span> {
    regex
        .captures_iter(haystack)
        .filter_map(|caps| caps.get(1))
        .map(|m| Span::new(offset + m.start(), offset + m.end()))
        .collect()
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_char_boundary(text: &str, mut index: usize) -> usize {
    while index < text.len() && !text.is_char_boundary(index) {
        index += 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accepted(text: &str, name: &str) -> ScoredEntity {
        let start = text.find(name).unwrap();
        ScoredEntity::new(
            Candidate::new(
                text,
                Span::new(start, start + name.len()),
                EntityKind::Person,
                Source::Model,
            ),
            0.9,
        )
    }

    fn found(review: StructuralReview, text: &str, names: &[&str]) -> Vec<String> {
        let entities: Vec<ScoredEntity> = names.iter().map(|n| accepted(text, n)).collect();
        review
            .review(text, &entities, None)
            .iter()
            .map(|c| c.text().to_string())
            .collect()
    }

    #[test]
    fn test_title_prefixed_names() {
        let text = "Referred by Dr. Amanda Chen last week";
        assert_eq!(found(StructuralReview::default(), text, &[]), vec!["Amanda Chen"]);
    }

    #[test]
    fn test_possessive_of_known_name() {
        let text = "Robert Merrill joined. Robert's team grew. Jira's board moved.";
        assert_eq!(
            found(StructuralReview::default(), text, &["Robert Merrill"]),
            vec!["Robert"]
        );
    }

    #[test]
    fn test_conjunction_neighbours() {
        let text = "Thanks to Mary Jackson and Robert Merrill, and to Ann Lee and Ravi";
        assert_eq!(
            found(StructuralReview::default(), text, &["Mary Jackson", "Ravi"]),
            vec!["Robert Merrill", "Ann Lee"]
        );
    }

    #[test]
    fn test_capitalized_phrases_opt_in() {
        let text = "we visited Golden Gate Park yesterday";
        assert!(found(StructuralReview::new(false), text, &[]).is_empty());
        assert_eq!(
            found(StructuralReview::new(true), text, &[]),
            vec!["Golden Gate Park"]
        );
    }

    #[test]
    fn test_claimed_text_is_skipped() {
        let text = "Dr. Amanda Chen called";
        assert!(found(StructuralReview::default(), text, &["Amanda Chen"]).is_empty());
    }

    #[test]
    fn test_conjunction_window_respects_char_boundaries() {
        let text = format!("{}Zoë and Ann Lee", "é".repeat(60));
        let start = text.find("Zoë").unwrap();
        let entity = ScoredEntity::new(
            Candidate::new(
                &text,
                Span::new(start, start + "Zoë".len()),
                EntityKind::Person,
                Source::Model,
            ),
            0.9,
        );
        let found: Vec<String> = StructuralReview::default()
            .review(&text, &[entity], None)
            .iter()
            .map(|c| c.text().to_string())
            .collect();
        assert_eq!(found, vec!["Ann Lee"]);
    }
}
