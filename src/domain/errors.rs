//! Domain error types
//!
//! This module defines the error hierarchy for piitag. Per-candidate problems
//! ([`DetectionInputError`]) are recovered locally by the pipeline; mapping
//! integrity problems ([`RestorationError`], serialization failures) are
//! surfaced to the caller as the terminal result of a run.

use thiserror::Error;

/// Main piitag error type
///
/// This is the primary error type used throughout the application.
#[derive(Debug, Error)]
pub enum PiitagError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A detector produced unusable output
    #[error("Detection error: {0}")]
    Detection(#[from] DetectionInputError),

    /// Restoration could not resolve every tag
    #[error("Restoration error: {0}")]
    Restoration(#[from] RestorationError),

    /// Mapping serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Validation errors (invalid spans, invalid inputs)
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Malformed detector output
///
/// Raised when a span handed to the pipeline does not describe a valid
/// substring of the document. The offending candidate is dropped; the rest
/// of the document is still processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectionInputError {
    /// `end <= start`
    #[error("empty or inverted span [{start}, {end})")]
    EmptySpan { start: usize, end: usize },

    /// `end` past the end of the text
    #[error("span [{start}, {end}) exceeds text length {len}")]
    OutOfBounds { start: usize, end: usize, len: usize },

    /// An offset splits a multi-byte character
    #[error("span [{start}, {end}) does not fall on character boundaries")]
    NotCharBoundary { start: usize, end: usize },
}

/// Tags in redacted text that the mapping cannot resolve
///
/// Restoration does not stop at the first unknown tag: every known tag is
/// still replaced and the partially restored text travels with the error so
/// the caller can decide whether to use it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} tag(s) missing from mapping: {}", unknown_tags.len(), unknown_tags.join(", "))]
pub struct RestorationError {
    /// Distinct unknown tags, in order of first occurrence
    pub unknown_tags: Vec<String>,
    /// Text with every known tag restored and unknown tags left in place
    pub partial: String,
}

impl RestorationError {
    /// The first offending tag
    pub fn first_tag(&self) -> Option<&str> {
        self.unknown_tags.first().map(String::as_str)
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for PiitagError {
    fn from(err: std::io::Error) -> Self {
        PiitagError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for PiitagError {
    fn from(err: serde_json::Error) -> Self {
        PiitagError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for PiitagError {
    fn from(err: toml::de::Error) -> Self {
        PiitagError::Configuration(format!("TOML parse error: {err}"))
    }
}
