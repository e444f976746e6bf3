//! Entity detection
//!
//! Detectors turn raw document text into unvalidated [`Candidate`]s:
//!
//! - [`regex::PatternMatcher`]: structured PII from the pattern library
//! - [`model::ModelAdapter`]: names, organizations and places from an NER model
//! - [`headers::HeaderNameDetector`]: ALL-CAPS name lines at the top of a resume
//!
//! [`heuristic::HeuristicModel`] is the bundled rule-based model adapter.

pub mod headers;
pub mod heuristic;
pub mod model;
pub mod patterns;
pub mod regex;

use crate::redaction::models::Candidate;
use anyhow::Result;

pub use headers::HeaderNameDetector;
pub use heuristic::HeuristicModel;
pub use model::{ModelAdapter, ModelAnalysis, ModelEntity, ModelLabel, ModelToken};
pub use patterns::PatternRegistry;
pub use regex::PatternMatcher;

/// Trait for span detectors that work directly on document text
pub trait Detector: Send + Sync {
    /// Detect candidates in `text`
    fn detect(&self, text: &str) -> Result<Vec<Candidate>>;
}
