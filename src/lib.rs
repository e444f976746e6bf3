// piitag - Reversible PII redaction for plain-text documents
// Copyright (c) 2025 piitag Contributors
// Licensed under the MIT License

//! # piitag - Reversible PII Redaction
//!
//! piitag replaces personal information in plain-text documents with short,
//! stable tags such as `<<SJ>>` or `<<EMAIL_1>>` and writes a mapping that
//! restores the original text exactly.
//!
//! ## Overview
//!
//! This library provides:
//! - **Detection** of structured identifiers with a regex pattern library and
//!   of names, places and organizations through a pluggable [`ModelAdapter`]
//! - **Validation** that rejects headings, job titles and other false positives
//! - **Alias grouping** so "Steve Johnson", "Steve" and "Mr. Johnson" share a tag
//! - **Redaction** and **restoration** driven by a JSON mapping
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`redaction`] - Detection, validation, tagging, redaction and restoration
//! - [`domain`] - Error and result types
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use piitag::redaction::{RedactionConfig, RedactionEngine, Restorer};
//!
//! fn main() -> anyhow::Result<()> {
//!     let engine = RedactionEngine::new(RedactionConfig::default())?;
//!
//!     let document = engine.process("Steve Johnson (steve@acme.io) joined in May.")?;
//!     println!("{}", document.redacted_text);
//!
//!     let restored = Restorer::new().restore(&document.redacted_text, &document.mapping)?;
//!     assert_eq!(restored, "Steve Johnson (steve@acme.io) joined in May.");
//!     Ok(())
//! }
//! ```
//!
//! ## Custom Models
//!
//! Any named-entity recognizer can drive person, place and organization
//! detection by implementing [`ModelAdapter`]:
//!
//! ```rust,no_run
//! use piitag::redaction::detector::{ModelAdapter, ModelAnalysis};
//! use piitag::redaction::{RedactionConfig, RedactionEngine};
//! use std::sync::Arc;
//!
//! struct MyModel;
//!
//! impl ModelAdapter for MyModel {
//!     fn name(&self) -> &str {
//!         "my-model"
//!     }
//!
//!     fn analyze(&self, text: &str) -> anyhow::Result<ModelAnalysis> {
//!         # let _ = text;
//!         Ok(ModelAnalysis::default())
//!     }
//! }
//!
//! # fn example() -> anyhow::Result<()> {
//! let engine = RedactionEngine::with_model(RedactionConfig::default(), Arc::new(MyModel))?;
//! # let _ = engine;
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//!
//! piitag uses structured logging with the `tracing` crate. Entity values
//! are never logged; only kinds, counts and offsets are.
//!
//! [`ModelAdapter`]: redaction::detector::ModelAdapter

pub mod cli;
pub mod config;
pub mod domain;
pub mod logging;
pub mod redaction;
