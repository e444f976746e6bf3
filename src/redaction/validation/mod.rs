//! False-positive filtering for PERSON candidates
//!
//! Every PERSON candidate is scored from [`rules::BASE_CONFIDENCE`] by an
//! ordered rule list and accepted when the score reaches the configured
//! threshold. Structured kinds pass through with confidence 1.0.

pub mod blocklist;
pub mod rules;

pub use blocklist::Blocklist;
pub use rules::{Adjustment, HardRule, ScoringRule};

use crate::redaction::classifier::DocumentType;
use crate::redaction::detector::ModelAnalysis;
use crate::redaction::models::{Candidate, EntityKind, ScoredEntity, Span};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Default acceptance threshold
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.6;

/// Tolerance for float accumulation when comparing against the threshold
const THRESHOLD_EPSILON: f32 = 1e-6;

/// Why a PERSON candidate was rejected
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectionReason {
    Blocklisted,
    Malformed { detail: String },
    SectionHeader,
    Certification,
    JobTitle,
    LowConfidence { score: f32 },
}

impl RejectionReason {
    /// Stable short code used in logs and reports
    pub fn code(&self) -> &'static str {
        match self {
            Self::Blocklisted => "blocklisted",
            Self::Malformed { .. } => "malformed",
            Self::SectionHeader => "section_header",
            Self::Certification => "certification",
            Self::JobTitle => "job_title",
            Self::LowConfidence { .. } => "low_confidence",
        }
    }

    /// Hard rejects fire before any scoring
    pub fn is_hard(&self) -> bool {
        !matches!(self, Self::LowConfidence { .. })
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed { detail } => write!(f, "malformed ({detail})"),
            Self::LowConfidence { score } => write!(f, "low_confidence ({score:.2})"),
            other => f.write_str(other.code()),
        }
    }
}

/// A candidate the validator turned down
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub candidate: Candidate,
    pub reason: RejectionReason,
}

/// An ORG/GPE/LOC-like span reported by the model
#[derive(Debug, Clone, PartialEq)]
pub struct ConflictSpan {
    pub span: Span,
    pub text: String,
}

/// Per-document inputs to validation
#[derive(Debug, Clone)]
pub struct ValidationContext<'a> {
    /// Full document text
    pub text: &'a str,
    pub doc_type: DocumentType,
    /// Model entities whose label contradicts PERSON
    pub conflicts: Vec<ConflictSpan>,
}

impl<'a> ValidationContext<'a> {
    pub fn new(text: &'a str, doc_type: DocumentType) -> Self {
        Self {
            text,
            doc_type,
            conflicts: Vec::new(),
        }
    }

    /// Record the model's ORG/GPE/LOC/FAC/PRODUCT spans as conflicts
    pub fn with_model_conflicts(mut self, analysis: &ModelAnalysis) -> Self {
        self.conflicts = analysis
            .conflicting_entities()
            .filter_map(|e| Span::checked(self.text, e.start, e.end).ok())
            .map(|span| ConflictSpan {
                span,
                text: span.slice(self.text).trim().to_string(),
            })
            .collect();
        self
    }
}

/// Score trace for one candidate
#[derive(Debug, Clone, PartialEq)]
pub enum Assessment {
    Rejected(RejectionReason),
    Scored {
        confidence: f32,
        adjustments: Vec<Adjustment>,
    },
}

/// Accepted and rejected candidates of one validation pass
#[derive(Debug, Clone, Default)]
pub struct ValidationOutcome {
    pub accepted: Vec<ScoredEntity>,
    pub rejected: Vec<Rejection>,
}

/// PERSON candidate validator
#[derive(Debug, Clone)]
pub struct Validator {
    blocklist: Arc<Blocklist>,
    threshold: f32,
}

impl Validator {
    pub fn new(blocklist: Arc<Blocklist>, threshold: f32) -> Self {
        Self {
            blocklist,
            threshold,
        }
    }

    pub fn blocklist(&self) -> &Blocklist {
        &self.blocklist
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Inclusive threshold comparison
    pub fn meets_threshold(&self, confidence: f32) -> bool {
        confidence + THRESHOLD_EPSILON >= self.threshold
    }

    /// Run hard rules, then scoring rules
    pub fn assess(&self, candidate: &Candidate, ctx: &ValidationContext<'_>) -> Assessment {
        for rule in HardRule::ORDER {
            if let Some(reason) = rule.check(candidate, &self.blocklist) {
                return Assessment::Rejected(reason);
            }
        }

        let mut adjustments = Vec::new();
        for rule in ScoringRule::ORDER {
            rule.apply(candidate, ctx, &mut adjustments);
        }
        let confidence = adjustments
            .iter()
            .fold(rules::BASE_CONFIDENCE, |acc, a| acc + a.delta)
            .clamp(0.0, 1.0);

        Assessment::Scored {
            confidence,
            adjustments,
        }
    }

    /// Validate one candidate
    pub fn validate_one(
        &self,
        candidate: Candidate,
        ctx: &ValidationContext<'_>,
    ) -> Result<ScoredEntity, Rejection> {
        if candidate.kind() != EntityKind::Person {
            return Ok(ScoredEntity::authoritative(candidate));
        }

        match self.assess(&candidate, ctx) {
            Assessment::Scored { confidence, .. } if self.meets_threshold(confidence) => {
                Ok(ScoredEntity::new(candidate, confidence))
            }
            Assessment::Scored { confidence, .. } => Err(Rejection {
                candidate,
                reason: RejectionReason::LowConfidence { score: confidence },
            }),
            Assessment::Rejected(reason) => Err(Rejection { candidate, reason }),
        }
    }

    /// Validate a merged candidate list, keeping order
    pub fn validate(
        &self,
        candidates: Vec<Candidate>,
        ctx: &ValidationContext<'_>,
    ) -> ValidationOutcome {
        let mut outcome = ValidationOutcome::default();
        for candidate in candidates {
            match self.validate_one(candidate, ctx) {
                Ok(entity) => outcome.accepted.push(entity),
                Err(rejection) => {
                    crate::log_rejection!(
                        rejection.candidate.text(),
                        rejection.candidate.span(),
                        rejection.reason
                    );
                    outcome.rejected.push(rejection);
                }
            }
        }
        outcome
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(Arc::new(Blocklist::with_defaults()), DEFAULT_CONFIDENCE_THRESHOLD)
    }
}
