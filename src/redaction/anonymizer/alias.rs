//! Person identity grouping
//!
//! Name variants that refer to the same person ("Steve Johnson", "Steve",
//! "STEVE JOHNSON") share one tag. Grouping is a single pass in document
//! order over accepted PERSON entities.

use super::tagging::TagBook;
use crate::redaction::models::tag::initials;
use crate::redaction::models::{EntityKind, ScoredEntity, Span};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace};

/// What to do with a bare first name or surname shared by several people
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmbiguityPolicy {
    /// Register the bare token as its own identity
    #[default]
    Separate,
    /// Attach to the person mentioned most recently before it
    Proximity,
}

impl FromStr for AmbiguityPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "separate" => Ok(Self::Separate),
            "proximity" => Ok(Self::Proximity),
            other => Err(format!(
                "unknown ambiguity policy '{other}' (expected separate or proximity)"
            )),
        }
    }
}

impl fmt::Display for AmbiguityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Separate => f.write_str("separate"),
            Self::Proximity => f.write_str("proximity"),
        }
    }
}

/// One person within a single run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    canonical: String,
    tag: String,
    variants: Vec<String>,
    mentions: Vec<Span>,
}

impl Identity {
    /// Full name the tag restores to
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Distinct surface forms, in order of first appearance
    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    /// Spans of every mention, in document order
    pub fn mentions(&self) -> &[Span] {
        &self.mentions
    }

    fn tokens(&self) -> Vec<String> {
        self.canonical
            .split_whitespace()
            .map(str::to_lowercase)
            .collect()
    }

    fn add_mention(&mut self, span: Span, surface: &str) {
        let at = self.mentions.partition_point(|m| m.start < span.start);
        self.mentions.insert(at, span);
        if !self.variants.iter().any(|v| v == surface) {
            self.variants.push(surface.to_string());
        }
    }

    fn last_mention_before(&self, offset: usize) -> Option<usize> {
        self.mentions
            .iter()
            .filter(|m| m.start < offset)
            .map(|m| m.start)
            .max()
    }
}

/// Identities of one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonGroups {
    identities: Vec<Identity>,
}

impl PersonGroups {
    pub fn identities(&self) -> &[Identity] {
        &self.identities
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    /// Every mention with its tag, in document order
    pub fn mentions(&self) -> Vec<(Span, &str)> {
        let mut all: Vec<(Span, &str)> = self
            .identities
            .iter()
            .flat_map(|id| id.mentions.iter().map(move |m| (*m, id.tag.as_str())))
            .collect();
        all.sort_by_key(|(span, _)| span.start);
        all
    }

    /// Identity owning `tag`
    pub fn by_tag(&self, tag: &str) -> Option<&Identity> {
        self.identities.iter().find(|id| id.tag == tag)
    }
}

/// Comparison key: whitespace collapsed, lowercased
fn name_key(surface: &str) -> String {
    surface
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn is_all_caps(s: &str) -> bool {
    s.chars().any(char::is_alphabetic) && !s.chars().any(char::is_lowercase)
}

/// Links name variants into identities and reserves one tag per identity
#[derive(Debug, Clone, Copy, Default)]
pub struct AliasGrouper {
    policy: AmbiguityPolicy,
}

impl AliasGrouper {
    pub fn new(policy: AmbiguityPolicy) -> Self {
        Self { policy }
    }

    /// Group accepted PERSON entities
    ///
    /// Each mention, in document order:
    /// - equal (ignoring case) to a known name or surface form: attach;
    /// - a single token equal to the first token of exactly one multi-token
    ///   name (or, failing any first-token match, its last token): attach;
    /// - a single token shared by several names: apply the ambiguity policy;
    /// - otherwise: register a new identity.
    ///
    /// Tags are reserved in `book` at registration and bound to canonical
    /// names before returning.
    pub fn group(&self, entities: &[ScoredEntity], book: &mut TagBook) -> PersonGroups {
        let mut people: Vec<&ScoredEntity> = entities
            .iter()
            .filter(|e| e.kind() == EntityKind::Person)
            .collect();
        people.sort_by_key(|e| e.span().start);

        let mut groups = PersonGroups::default();
        for entity in people {
            // Stored as written so tags restore byte for byte
            let surface = entity.text().to_string();
            let key = name_key(&surface);
            if key.is_empty() {
                continue;
            }
            let span = entity.span();

            match self.resolve(&groups, &key, span.start) {
                Some(index) => {
                    let identity = &mut groups.identities[index];
                    if is_all_caps(&identity.canonical)
                        && !is_all_caps(&surface)
                        && name_key(&identity.canonical) == key
                    {
                        identity.canonical = surface.clone();
                    }
                    identity.add_mention(span, &surface);
                    trace!(tag = %identity.tag, surface = %surface, "Attached name variant");
                }
                None => {
                    let tag = book.reserve_person(&initials(&surface));
                    debug!(tag = %tag, span = %span, "Registered identity");
                    groups.identities.push(Identity {
                        canonical: surface.clone(),
                        tag,
                        variants: vec![surface],
                        mentions: vec![span],
                    });
                }
            }
        }

        for identity in &groups.identities {
            book.bind(&identity.tag, &identity.canonical);
        }
        groups
    }

    fn resolve(&self, groups: &PersonGroups, key: &str, offset: usize) -> Option<usize> {
        if let Some(index) = groups
            .identities
            .iter()
            .position(|id| name_key(&id.canonical) == key)
        {
            return Some(index);
        }

        let same_variant = || {
            groups
                .identities
                .iter()
                .position(|id| id.variants.iter().any(|v| name_key(v) == key))
        };

        if key.contains(' ') {
            return same_variant();
        }

        let sharing = |first: bool| -> Vec<usize> {
            groups
                .identities
                .iter()
                .enumerate()
                .filter(|(_, id)| {
                    let tokens = id.tokens();
                    let token = if first { tokens.first() } else { tokens.last() };
                    tokens.len() > 1 && token.is_some_and(|t| t == key)
                })
                .map(|(i, _)| i)
                .collect()
        };

        // Surnames are consulted only when no first name matches
        let mut matches = sharing(true);
        if matches.is_empty() {
            matches = sharing(false);
        }

        match (matches.len(), self.policy) {
            (0, _) => same_variant(),
            (1, _) => Some(matches[0]),
            (_, AmbiguityPolicy::Separate) => None,
            (_, AmbiguityPolicy::Proximity) => matches
                .into_iter()
                .filter_map(|i| {
                    groups.identities[i]
                        .last_mention_before(offset)
                        .map(|at| (at, i))
                })
                .max()
                .map(|(_, i)| i),
        }
    }
}

/// Catches further mentions of known names that no detector claimed
///
/// Occurrences are matched word-bounded and case-insensitively. Longer forms
/// are tried first. Single-token forms shorter than three characters are
/// never swept.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResidualSweep;

const MIN_SWEEP_TOKEN_CHARS: usize = 3;

impl ResidualSweep {
    pub fn new() -> Self {
        Self
    }

    /// Attach residual mentions to their identities
    ///
    /// `claimed` holds every span already slated for replacement; it is
    /// extended with the spans found here. Returns the number of mentions
    /// added.
    pub fn sweep(&self, text: &str, groups: &mut PersonGroups, claimed: &mut Vec<Span>) -> usize {
        let mut forms: Vec<(usize, String)> = groups
            .identities
            .iter()
            .enumerate()
            .flat_map(|(i, id)| id.variants.iter().map(move |v| (i, v.clone())))
            .filter(|(_, v)| sweepable(v))
            .collect();
        forms.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

        let mut added = 0;
        for (index, form) in forms {
            let Some(regex) = surface_regex(&form) else {
                continue;
            };
            for found in regex.find_iter(text) {
                let span = Span::new(found.start(), found.end());
                if claimed.iter().any(|c| c.overlaps(&span)) {
                    continue;
                }
                claimed.push(span);
                groups.identities[index].add_mention(span, found.as_str());
                added += 1;
            }
        }

        if added > 0 {
            debug!(count = added, "Residual name mentions found");
        }
        added
    }
}

fn sweepable(form: &str) -> bool {
    let starts = form.chars().next().is_some_and(char::is_alphanumeric);
    let ends = form.chars().last().is_some_and(char::is_alphanumeric);
    let long_enough = form.contains(' ') || form.chars().count() >= MIN_SWEEP_TOKEN_CHARS;
    starts && ends && long_enough
}

fn surface_regex(form: &str) -> Option<Regex> {
    let body = form
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    RegexBuilder::new(&format!(r"\b{body}\b"))
        .case_insensitive(true)
        .build()
        .ok()
}
