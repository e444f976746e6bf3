//! Span replacement

use super::alias::PersonGroups;
use super::tagging::{TagBook, TaggedSpan};
use crate::domain::{PiitagError, Result};
use crate::redaction::models::{EntityKind, Mapping};

/// Output of one redaction
#[derive(Debug, Clone, PartialEq)]
pub struct Redaction {
    /// Text with every span replaced by its tag
    pub text: String,
    /// Tag ↔ original record needed to restore `text`
    pub mapping: Mapping,
    /// Replaced spans in document order (offsets into the original text)
    pub spans: Vec<TaggedSpan>,
}

/// Replaces tagged spans and builds the mapping
///
/// Pure transformation: no I/O and no shared state.
#[derive(Debug, Default, Clone, Copy)]
pub struct Redactor;

impl Redactor {
    pub fn new() -> Self {
        Self
    }

    /// Apply person mentions and typed spans to `text`
    ///
    /// Spans must be disjoint. Replacement runs from the highest start offset
    /// down so earlier offsets stay valid.
    pub fn redact(
        &self,
        text: &str,
        persons: &PersonGroups,
        typed: &[TaggedSpan],
        book: &TagBook,
    ) -> Result<Redaction> {
        let mut spans: Vec<TaggedSpan> = persons
            .mentions()
            .into_iter()
            .map(|(span, tag)| TaggedSpan {
                span,
                kind: EntityKind::Person,
                tag: tag.to_string(),
            })
            .chain(typed.iter().cloned())
            .collect();
        spans.sort_by_key(|s| s.span.start);

        for pair in spans.windows(2) {
            if pair[0].span.overlaps(&pair[1].span) {
                return Err(PiitagError::Validation(format!(
                    "replacement spans {} and {} overlap",
                    pair[0].span, pair[1].span
                )));
            }
        }

        let mut redacted = text.to_string();
        for tagged in spans.iter().rev() {
            redacted.replace_range(tagged.span.start..tagged.span.end, &tagged.tag);
        }

        let mut mapping = Mapping::new();
        for (tag, value) in book.bindings() {
            mapping.tags.insert(tag.clone(), value.clone());
        }
        for identity in persons.identities() {
            for variant in identity.variants() {
                mapping
                    .persons
                    .entry(variant.clone())
                    .or_insert_with(|| identity.tag().to_string());
            }
        }

        Ok(Redaction {
            text: redacted,
            mapping,
            spans,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redaction::anonymizer::{AliasGrouper, TagAssigner};
    use crate::redaction::models::{Candidate, ScoredEntity, Source, Span};

    fn scored(text: &str, start: usize, end: usize, kind: EntityKind) -> ScoredEntity {
        ScoredEntity::new(
            Candidate::new(text, Span::new(start, end), kind, Source::Pattern),
            1.0,
        )
    }

    #[test]
    fn test_redacts_document() {
        let text = "Steve Johnson\nsteve.johnson@gmail.com\nReported to Mary Jackson";
        let entities = vec![
            scored(text, 0, 13, EntityKind::Person),
            scored(text, 14, 37, EntityKind::Email),
            scored(text, 50, 62, EntityKind::Person),
        ];
        let mut book = TagBook::new();
        let persons = AliasGrouper::default().group(&entities, &mut book);
        let typed = TagAssigner::new().assign(&entities, &mut book);
        let redaction = Redactor::new()
            .redact(text, &persons, &typed, &book)
            .unwrap();

        assert_eq!(redaction.text, "<<SJ>>\n<<EMAIL_1>>\nReported to <<MJ>>");
        assert_eq!(redaction.mapping.original("<<SJ>>"), Some("Steve Johnson"));
        assert_eq!(redaction.mapping.original("<<MJ>>"), Some("Mary Jackson"));
        assert_eq!(
            redaction.mapping.original("<<EMAIL_1>>"),
            Some("steve.johnson@gmail.com")
        );
        assert_eq!(redaction.mapping.persons.len(), 2);
        assert_eq!(redaction.mapping.person_tag("Mary Jackson"), Some("<<MJ>>"));
        assert_eq!(redaction.spans.len(), 3);
    }

    #[test]
    fn test_overlapping_spans_rejected() {
        let text = "Ann Lee ann@lee.io";
        let mut book = TagBook::new();
        let persons = AliasGrouper::default().group(&[], &mut book);
        let typed = vec![
            TaggedSpan {
                span: Span::new(0, 7),
                kind: EntityKind::Org,
                tag: book.typed(EntityKind::Org, "Ann Lee"),
            },
            TaggedSpan {
                span: Span::new(4, 18),
                kind: EntityKind::Email,
                tag: book.typed(EntityKind::Email, "Lee ann@lee.io"),
            },
        ];
        let result = Redactor::new().redact(text, &persons, &typed, &book);
        assert!(matches!(result, Err(PiitagError::Validation(_))));
    }

    #[test]
    fn test_no_entities_leaves_text_unchanged() {
        let text = "Nothing to see here.";
        let book = TagBook::new();
        let redaction = Redactor::new()
            .redact(text, &PersonGroups::default(), &[], &book)
            .unwrap();
        assert_eq!(redaction.text, text);
        assert!(redaction.mapping.is_empty());
    }
}
