//! NER/POS model capability
//!
//! The model is an external oracle: anything that can tokenize text, tag parts
//! of speech and label entity spans can drive the pipeline by implementing
//! [`ModelAdapter`].

use crate::domain::DetectionInputError;
use crate::redaction::models::{Candidate, EntityKind, PosTag, Source, Span};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Output of one model run over a document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelAnalysis {
    /// Every token with its part of speech
    pub tokens: Vec<ModelToken>,
    /// Labeled entity spans
    pub entities: Vec<ModelEntity>,
}

/// A single token, byte offsets into the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelToken {
    pub start: usize,
    pub end: usize,
    pub pos: PosTag,
}

/// A labeled entity span, byte offsets into the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntity {
    pub start: usize,
    pub end: usize,
    pub label: ModelLabel,
}

/// Entity labels the pipeline understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModelLabel {
    Person,
    Org,
    Gpe,
    Loc,
    Date,
    Facility,
    Product,
    Norp,
    Other,
}

impl ModelLabel {
    /// Map a model label string (OntoNotes / CoNLL style)
    pub fn parse(label: &str) -> Self {
        match label.to_uppercase().as_str() {
            "PERSON" | "PER" => Self::Person,
            "ORG" | "ORGANIZATION" => Self::Org,
            "GPE" => Self::Gpe,
            "LOC" | "LOCATION" => Self::Loc,
            "DATE" => Self::Date,
            "FAC" | "FACILITY" => Self::Facility,
            "PRODUCT" => Self::Product,
            "NORP" => Self::Norp,
            _ => Self::Other,
        }
    }

    /// Labels that contradict a PERSON reading of the same text
    pub fn is_conflicting(&self) -> bool {
        matches!(
            self,
            Self::Org | Self::Gpe | Self::Loc | Self::Facility | Self::Product
        )
    }
}

impl ModelAnalysis {
    /// POS tags of the tokens lying inside `span`
    pub fn pos_tags_within(&self, span: Span) -> Vec<PosTag> {
        self.tokens
            .iter()
            .filter(|t| t.start >= span.start && t.end <= span.end)
            .map(|t| t.pos)
            .collect()
    }

    /// Entities whose label conflicts with PERSON
    pub fn conflicting_entities(&self) -> impl Iterator<Item = &ModelEntity> {
        self.entities.iter().filter(|e| e.label.is_conflicting())
    }
}

/// NER/POS model capability
pub trait ModelAdapter: Send + Sync {
    /// Tokenize, POS-tag and label entities in `text`
    fn analyze(&self, text: &str) -> Result<ModelAnalysis>;

    /// Name used in logs
    fn name(&self) -> &str {
        "model"
    }
}

/// Convert model entities into pipeline candidates
///
/// PERSON spans always become candidates. Specific dates become DOB
/// candidates. ORG and GPE/LOC spans become candidates only when
/// `include_places_and_orgs` is set; otherwise they serve as validation
/// context. Entities with invalid offsets are returned as errors, and the
/// rest of the analysis is still used.
pub fn model_candidates(
    text: &str,
    analysis: &ModelAnalysis,
    include_places_and_orgs: bool,
) -> (Vec<Candidate>, Vec<DetectionInputError>) {
    let mut candidates = Vec::new();
    let mut errors = Vec::new();

    for entity in &analysis.entities {
        let span = match Span::checked(text, entity.start, entity.end) {
            Ok(span) => span,
            Err(e) => {
                errors.push(e);
                continue;
            }
        };

        let kind = match entity.label {
            ModelLabel::Person => EntityKind::Person,
            ModelLabel::Date if is_specific_date(span.slice(text)) => EntityKind::Dob,
            ModelLabel::Org if include_places_and_orgs => EntityKind::Org,
            ModelLabel::Gpe | ModelLabel::Loc if include_places_and_orgs => EntityKind::Gpe,
            _ => continue,
        };

        let Some(span) = tidy_span(text, span) else {
            continue;
        };

        let candidate = Candidate::new(text, span, kind, Source::Model);
        let candidate = if kind == EntityKind::Person {
            candidate.with_pos_tags(analysis.pos_tags_within(span))
        } else {
            candidate
        };
        candidates.push(candidate);
    }

    (candidates, errors)
}

/// Strip surrounding whitespace and a trailing possessive from a model span
fn tidy_span(text: &str, span: Span) -> Option<Span> {
    let slice = span.slice(text);
    let leading = slice.len() - slice.trim_start().len();
    let mut trimmed = slice.trim();
    for suffix in ["'s", "\u{2019}s"] {
        if let Some(stripped) = trimmed.strip_suffix(suffix) {
            trimmed = stripped.trim_end();
            break;
        }
    }
    if trimmed.is_empty() {
        return None;
    }
    let start = span.start + leading;
    Some(Span::new(start, start + trimmed.len()))
}

const VAGUE_DATE_WORDS: &[&str] = &[
    "year", "month", "week", "day", "ago", "present", "current", "today", "decade", "annual",
    "quarter", "season", "since",
];

/// True for a date that can identify someone ("March 3, 1984"), false for
/// durations and ranges ("5 years", "2019 - 2021")
pub fn is_specific_date(value: &str) -> bool {
    if !value.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }
    if value.chars().count() > 25 || value.contains('\n') {
        return false;
    }
    if value.contains(" - ") || value.contains(" to ") || value.contains('\u{2013}') {
        return false;
    }
    let lower = value.to_lowercase();
    !VAGUE_DATE_WORDS.iter().any(|w| lower.contains(w))
}
