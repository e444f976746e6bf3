//! Redaction pipeline for piitag
//!
//! This module locates personally identifying spans in plain text, replaces
//! them with stable placeholder tags and restores the original text from
//! the resulting mapping.
//!
//! # Architecture
//!
//! The pipeline consists of:
//! - **Detection**: regex patterns, an NER/POS model behind [`detector::ModelAdapter`],
//!   and resume header heuristics
//! - **Merging**: one disjoint, prioritized span list
//! - **Validation**: confidence scoring of PERSON candidates against a blocklist
//! - **Review**: a second structural pass over uncovered text
//! - **Anonymization**: identity grouping, tag assignment and replacement
//! - **Restoration**: the inverse of replacement
//! - **Audit**: structured logging with hashed values
//!
//! # Usage
//!
//! ```rust,ignore
//! use piitag::redaction::{RedactionConfig, RedactionEngine, Restorer};
//!
//! let engine = RedactionEngine::new(RedactionConfig::default())?;
//! let document = engine.process(text)?;
//! let original = Restorer::new().restore(&document.redacted_text, &document.mapping)?;
//! ```

pub mod anonymizer;
pub mod audit;
pub mod classifier;
pub mod config;
pub mod detector;
pub mod engine;
pub mod merge;
pub mod models;
pub mod report;
pub mod restore;
pub mod review;
pub mod validation;

// Re-export main types
pub use classifier::DocumentType;
pub use config::RedactionConfig;
pub use engine::{RedactedDocument, RedactionEngine, SourceDocument};
pub use models::{Candidate, EntityKind, Mapping, ScoredEntity, Source, Span};
pub use report::RunReport;
pub use restore::Restorer;
