//! Detection data models

use crate::domain::DetectionInputError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open byte range `[start, end)` into the document text
///
/// Offsets are UTF-8 byte offsets and always fall on character boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Create a span from offsets already known to be valid
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start < end, "span [{start}, {end}) is empty");
        Self { start, end }
    }

    /// Create a span from untrusted offsets, checking them against `text`
    pub fn checked(text: &str, start: usize, end: usize) -> Result<Self, DetectionInputError> {
        if end <= start {
            return Err(DetectionInputError::EmptySpan { start, end });
        }
        if end > text.len() {
            return Err(DetectionInputError::OutOfBounds {
                start,
                end,
                len: text.len(),
            });
        }
        if !text.is_char_boundary(start) || !text.is_char_boundary(end) {
            return Err(DetectionInputError::NotCharBoundary { start, end });
        }
        Ok(Self { start, end })
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Always false for spans built through the constructors
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// True when the two spans share at least one byte
    ///
    /// Adjacent spans (`a.end == b.start`) do not overlap.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True when `offset` lies inside the span
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// The substring this span covers
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Entity kinds the pipeline can redact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    /// A person's name
    Person,
    /// Email address
    Email,
    /// Telephone number
    Phone,
    /// Social Security Number
    Ssn,
    /// Web URL
    Url,
    /// Street address
    Address,
    /// Date of birth or other specific date
    Dob,
    /// Passport, license, employee or similar identifier
    IdNumber,
    /// Organization
    Org,
    /// Geopolitical entity or location
    Gpe,
}

impl EntityKind {
    /// Label used in typed tags (`<<EMAIL_1>>`)
    pub fn label(&self) -> &'static str {
        match self {
            Self::Person => "PERSON",
            Self::Email => "EMAIL",
            Self::Phone => "PHONE",
            Self::Ssn => "SSN",
            Self::Url => "URL",
            Self::Address => "ADDRESS",
            Self::Dob => "DOB",
            Self::IdNumber => "ID_NUMBER",
            Self::Org => "ORG",
            Self::Gpe => "GPE",
        }
    }

    /// Structured kinds are recognized by patterns and never scored
    pub fn is_structured(&self) -> bool {
        !matches!(self, Self::Person | Self::Org | Self::Gpe)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which detector produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Regex pattern match
    Pattern,
    /// External NER/POS model
    Model,
    /// Structural heuristics (header lines, review pass)
    Heuristic,
}

impl Source {
    /// Rank used to break ties between equal spans; lower wins
    pub fn priority(&self) -> u8 {
        match self {
            Self::Pattern => 0,
            Self::Heuristic => 1,
            Self::Model => 2,
        }
    }
}

/// Coarse part-of-speech classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PosTag {
    ProperNoun,
    Noun,
    Verb,
    Adjective,
    Adverb,
    Pronoun,
    Determiner,
    Preposition,
    Conjunction,
    Number,
    Punctuation,
    Other,
}

impl PosTag {
    /// Map a Penn Treebank or Universal Dependencies tag
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "NNP" | "NNPS" | "PROPN" => Self::ProperNoun,
            "NN" | "NNS" | "NOUN" => Self::Noun,
            "JJ" | "JJR" | "JJS" | "ADJ" => Self::Adjective,
            "RB" | "RBR" | "RBS" | "ADV" => Self::Adverb,
            "PRP" | "PRP$" | "WP" | "WP$" | "PRON" => Self::Pronoun,
            "DT" | "PDT" | "WDT" | "DET" => Self::Determiner,
            "IN" | "TO" | "ADP" => Self::Preposition,
            "CC" | "CCONJ" | "SCONJ" => Self::Conjunction,
            "CD" | "NUM" => Self::Number,
            "." | "," | ":" | "``" | "''" | "-LRB-" | "-RRB-" | "HYPH" | "NFP" | "PUNCT" => {
                Self::Punctuation
            }
            t if t.starts_with("VB") || t == "VERB" || t == "AUX" || t == "MD" => Self::Verb,
            _ => Self::Other,
        }
    }
}

/// An unvalidated detected entity
///
/// Candidates are immutable once built; the merger and validator take them
/// by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    span: Span,
    text: String,
    kind: EntityKind,
    source: Source,
    pos_tags: Option<Vec<PosTag>>,
}

impl Candidate {
    /// Create a candidate covering `span` of `document`
    pub fn new(document: &str, span: Span, kind: EntityKind, source: Source) -> Self {
        Self {
            span,
            text: span.slice(document).to_string(),
            kind,
            source,
            pos_tags: None,
        }
    }

    /// Attach per-token POS tags covering the span
    pub fn with_pos_tags(mut self, tags: Vec<PosTag>) -> Self {
        self.pos_tags = Some(tags);
        self
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn pos_tags(&self) -> Option<&[PosTag]> {
        self.pos_tags.as_deref()
    }
}

/// A candidate that survived validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredEntity {
    candidate: Candidate,
    confidence: f32,
}

impl ScoredEntity {
    /// Create a scored entity; confidence is clamped to `[0, 1]`
    pub fn new(candidate: Candidate, confidence: f32) -> Self {
        Self {
            candidate,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Structured pattern matches are authoritative
    pub fn authoritative(candidate: Candidate) -> Self {
        Self::new(candidate, 1.0)
    }

    pub fn candidate(&self) -> &Candidate {
        &self.candidate
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn span(&self) -> Span {
        self.candidate.span
    }

    pub fn text(&self) -> &str {
        &self.candidate.text
    }

    pub fn kind(&self) -> EntityKind {
        self.candidate.kind
    }

    pub fn source(&self) -> Source {
        self.candidate.source
    }
}
