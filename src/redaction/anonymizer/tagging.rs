//! Tag allocation
//!
//! [`TagBook`] is the per-run ledger of issued tags. Person tags are reserved
//! by the alias grouper and bound to their canonical name once grouping is
//! done; [`TagAssigner`] then issues typed tags for structured entities.

use crate::redaction::models::tag::{person_tag, typed_tag};
use crate::redaction::models::{EntityKind, ScoredEntity, Span};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Per-run tag ledger
///
/// Invariants: a tag is issued at most once, and every bound value owns
/// exactly one tag. Violations are programming errors and panic.
#[derive(Debug, Default)]
pub struct TagBook {
    issued: HashSet<String>,
    values: BTreeMap<String, String>,
    by_value: HashMap<String, String>,
    counters: HashMap<EntityKind, usize>,
}

impl TagBook {
    pub fn new() -> Self {
        Self::default()
    }

    fn claim(&mut self, tag: &str) {
        if !self.issued.insert(tag.to_string()) {
            panic!("tag collision: {tag} issued twice");
        }
    }

    /// Reserve the first free person tag for `initials`: the bare initials,
    /// then the smallest numeric suffix from 2
    pub fn reserve_person(&mut self, initials: &str) -> String {
        let tag = (1..)
            .map(|n| person_tag(initials, n))
            .find(|candidate| !self.issued.contains(candidate))
            .unwrap_or_else(|| unreachable!("ordinal space is unbounded"));
        self.claim(&tag);
        tag
    }

    /// Bind a reserved tag to its original value
    pub fn bind(&mut self, tag: &str, value: &str) {
        assert!(self.issued.contains(tag), "tag {tag} bound before reservation");
        if let Some(owner) = self.by_value.get(value) {
            assert_eq!(owner, tag, "value already owned by {owner}");
            return;
        }
        self.values.insert(tag.to_string(), value.to_string());
        self.by_value.insert(value.to_string(), tag.to_string());
    }

    /// Tag already owning `value`, if any
    pub fn tag_for_value(&self, value: &str) -> Option<&str> {
        self.by_value.get(value).map(String::as_str)
    }

    /// Typed tag for a structured literal; identical literals share a tag
    pub fn typed(&mut self, kind: EntityKind, literal: &str) -> String {
        if let Some(tag) = self.tag_for_value(literal) {
            return tag.to_string();
        }
        let counter = self.counters.entry(kind).or_insert(0);
        *counter += 1;
        let tag = typed_tag(kind, *counter);
        self.claim(&tag);
        self.bind(&tag, literal);
        tag
    }

    /// Bound tag → value pairs, sorted by tag
    pub fn bindings(&self) -> &BTreeMap<String, String> {
        &self.values
    }
}

/// A span and the tag that replaces it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedSpan {
    pub span: Span,
    pub kind: EntityKind,
    pub tag: String,
}

/// Issues `<<TYPE_n>>` tags for non-person entities
#[derive(Debug, Default, Clone, Copy)]
pub struct TagAssigner;

impl TagAssigner {
    pub fn new() -> Self {
        Self
    }

    /// Tag structured entities left to right; PERSON entities are skipped
    pub fn assign(&self, entities: &[ScoredEntity], book: &mut TagBook) -> Vec<TaggedSpan> {
        let mut ordered: Vec<&ScoredEntity> = entities
            .iter()
            .filter(|e| e.kind() != EntityKind::Person)
            .collect();
        ordered.sort_by_key(|e| e.span().start);

        ordered
            .into_iter()
            .map(|entity| TaggedSpan {
                span: entity.span(),
                kind: entity.kind(),
                tag: book.typed(entity.kind(), entity.text()),
            })
            .collect()
    }
}
