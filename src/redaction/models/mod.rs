//! Data models for the redaction pipeline

pub mod candidate;
pub mod mapping;
pub mod tag;

pub use candidate::{Candidate, EntityKind, PosTag, ScoredEntity, Source, Span};
pub use mapping::{Mapping, MappingMetadata};
