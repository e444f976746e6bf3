//! Tag assignment and replacement
//!
//! Turns validated entities into placeholder tags:
//! - [`alias::AliasGrouper`] links person name variants and reserves person tags
//! - [`alias::ResidualSweep`] catches unclaimed repeats of known names
//! - [`tagging::TagAssigner`] numbers structured entities per type
//! - [`redaction::Redactor`] rewrites the text and builds the mapping

pub mod alias;
pub mod redaction;
pub mod tagging;

pub use alias::{AliasGrouper, AmbiguityPolicy, Identity, PersonGroups, ResidualSweep};
pub use redaction::{Redaction, Redactor};
pub use tagging::{TagAssigner, TagBook, TaggedSpan};
