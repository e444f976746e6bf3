//! Main redaction engine
//!
//! This module provides the [`RedactionEngine`] that runs one document
//! through the whole pipeline:
//!
//! 1. classify the document (resume, transcript, general)
//! 2. detect candidates with patterns, the model and header heuristics
//! 3. drop model/heuristic spans that touch a pattern span, then merge
//! 4. validate PERSON candidates, then run the structural review pass
//! 5. group person variants, sweep residual mentions, tag typed entities
//! 6. replace spans and build the mapping
//!
//! # Examples
//!
//! ```no_run
//! use piitag::redaction::{RedactionConfig, RedactionEngine};
//!
//! # fn example() -> anyhow::Result<()> {
//! let engine = RedactionEngine::new(RedactionConfig::default())?;
//! let document = engine.process("Steve Johnson\nsteve.johnson@gmail.com")?;
//! println!("{}", document.redacted_text);
//! # Ok(())
//! # }
//! ```

use crate::redaction::{
    anonymizer::{AliasGrouper, ResidualSweep, Redactor, TagAssigner, TagBook, TaggedSpan},
    audit::AuditLogger,
    classifier::{classify, DocumentType},
    config::RedactionConfig,
    detector::{
        model::model_candidates, Detector, HeaderNameDetector, HeuristicModel, ModelAdapter,
        PatternMatcher,
    },
    merge::{shadow_by_patterns, SpanMerger},
    models::{EntityKind, Mapping, MappingMetadata, ScoredEntity, Span},
    report::RunReport,
    review::StructuralReview,
    validation::{Rejection, ValidationContext, Validator},
};
use crate::domain::DetectionInputError;
use crate::{log_document_complete, log_document_start};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, warn};
use uuid::Uuid;

/// One document to redact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// File name or "stdin"; used in logs, reports and mapping metadata
    pub source: String,
    pub text: String,
}

impl SourceDocument {
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
        }
    }
}

/// Result of redacting one document
#[derive(Debug, Clone)]
pub struct RedactedDocument {
    /// Unique run identifier
    pub id: Uuid,
    pub source: String,
    pub doc_type: DocumentType,
    /// Text with every accepted entity replaced by its tag
    pub redacted_text: String,
    /// Everything needed to restore `redacted_text`
    pub mapping: Mapping,
    /// Replaced spans in document order (offsets into the original text)
    pub spans: Vec<TaggedSpan>,
    /// Accepted entities, sorted by start
    pub entities: Vec<ScoredEntity>,
    /// Rejected PERSON candidates with their reasons
    pub rejections: Vec<Rejection>,
    /// Model spans dropped because their offsets were unusable
    pub detection_errors: Vec<DetectionInputError>,
    pub processing_time_ms: u64,
    pub timestamp: DateTime<Utc>,
}

impl RedactedDocument {
    /// Number of replaced spans
    pub fn replaced_count(&self) -> usize {
        self.spans.len()
    }

    /// Replaced spans per entity kind
    pub fn counts_by_kind(&self) -> BTreeMap<EntityKind, usize> {
        let mut counts = BTreeMap::new();
        for span in &self.spans {
            *counts.entry(span.kind).or_insert(0) += 1;
        }
        counts
    }
}

/// Main redaction engine
///
/// Orchestrates detection, validation, tagging, replacement and audit
/// logging.
///
/// # Thread Safety
///
/// The model, pattern registry and blocklist are built once and shared
/// through `Arc`; cloning the engine is cheap. Every run owns its own
/// [`TagBook`], so concurrent runs share no mutable state.
#[derive(Clone)]
pub struct RedactionEngine {
    config: Arc<RedactionConfig>,
    doc_type_override: Option<DocumentType>,
    model: Arc<dyn ModelAdapter>,
    matcher: Arc<PatternMatcher>,
    headers: HeaderNameDetector,
    validator: Validator,
    review: StructuralReview,
    grouper: AliasGrouper,
    audit_logger: Option<Arc<AuditLogger>>,
    dry_run: bool,
}

impl RedactionEngine {
    /// Create an engine backed by the built-in heuristic model
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration validation fails
    /// - The pattern library or a blocklist file cannot be loaded
    /// - Audit logger initialization fails
    pub fn new(config: RedactionConfig) -> Result<Self> {
        Self::with_model(config, Arc::new(HeuristicModel::new()))
    }

    /// Create an engine around any [`ModelAdapter`]
    pub fn with_model(config: RedactionConfig, model: Arc<dyn ModelAdapter>) -> Result<Self> {
        config
            .validate()
            .context("Invalid redaction configuration")?;

        let doc_type_override = config.detection.doc_type_override()?;
        let registry = config
            .detection
            .pattern_registry()
            .context("Failed to load pattern library")?;
        let blocklist = config
            .blocklist
            .build()
            .context("Failed to load blocklist")?;

        let audit_logger = if config.audit.enabled {
            Some(Arc::new(AuditLogger::new(
                config.audit.log_path.clone(),
                config.audit.json_format,
                true,
            )?))
        } else {
            None
        };

        debug!(
            model = model.name(),
            patterns = registry.all_patterns().len(),
            blocklist = blocklist.len(),
            "Redaction engine ready"
        );

        Ok(Self {
            doc_type_override,
            model,
            matcher: Arc::new(PatternMatcher::with_registry(Arc::new(registry))),
            headers: HeaderNameDetector::new(config.detection.header_scan_chars),
            validator: Validator::new(Arc::new(blocklist), config.validation.confidence_threshold),
            review: StructuralReview::new(config.review.capitalized_phrases),
            grouper: AliasGrouper::new(config.validation.ambiguous_first_name),
            audit_logger,
            dry_run: false,
            config: Arc::new(config),
        })
    }

    /// Dry-run engines compute everything but write no audit entries
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn config(&self) -> &RedactionConfig {
        &self.config
    }

    /// Redact text read from stdin or an unnamed source
    pub fn process(&self, text: &str) -> Result<RedactedDocument> {
        self.process_named("stdin", text)
    }

    /// Redact one named document
    pub fn process_named(&self, source: &str, text: &str) -> Result<RedactedDocument> {
        let document = self.run(source, text)?;
        self.audit(&document)?;
        Ok(document)
    }

    /// Redact documents in parallel on blocking workers
    ///
    /// Results keep input order. A failed document yields an `Err` in its
    /// slot and does not affect the others.
    pub async fn process_batch(
        &self,
        documents: Vec<SourceDocument>,
    ) -> Vec<Result<RedactedDocument>> {
        let tasks = documents.into_iter().map(|document| {
            let engine = self.clone();
            tokio::task::spawn_blocking(move || engine.run(&document.source, &document.text))
        });

        let mut results = Vec::new();
        for joined in futures::future::join_all(tasks).await {
            let result = match joined {
                Ok(result) => result,
                Err(e) => Err(anyhow::anyhow!("Redaction worker failed: {e}")),
            };
            // Audit entries are written here so lines never interleave
            let result = result.and_then(|document| {
                self.audit(&document)?;
                Ok(document)
            });
            if let Err(ref e) = result {
                error!(error = ?e, "Failed to redact document");
            }
            results.push(result);
        }
        results
    }

    /// Redact a batch and aggregate a run report
    pub async fn process_batch_with_report(
        &self,
        documents: Vec<SourceDocument>,
    ) -> (Vec<Result<RedactedDocument>>, RunReport) {
        let sources: Vec<String> = documents.iter().map(|d| d.source.clone()).collect();
        let results = self.process_batch(documents).await;

        let mut report = RunReport::new();
        for (source, result) in sources.iter().zip(&results) {
            match result {
                Ok(document) => report.add_document(document),
                Err(e) => report.add_failure(source, e),
            }
        }
        (results, report)
    }

    /// One synchronous pipeline run
    fn run(&self, source: &str, text: &str) -> Result<RedactedDocument> {
        let start = Instant::now();
        log_document_start!(source, text.len());

        let doc_type = self.doc_type_override.unwrap_or_else(|| classify(text));
        debug!(source, doc_type = %doc_type, "Document classified");

        let analysis = self
            .model
            .analyze(text)
            .with_context(|| format!("Model '{}' failed on {source}", self.model.name()))?;

        let mut candidates = self.matcher.detect(text)?;

        let (model_found, detection_errors) = model_candidates(
            text,
            &analysis,
            self.config.detection.redact_places_and_orgs,
        );
        for e in &detection_errors {
            warn!(source, error = %e, "Dropping model span");
        }
        candidates.extend(model_found);

        if doc_type != DocumentType::Transcript {
            candidates.extend(
                self.headers
                    .detect(text)?
                    .into_iter()
                    .map(|c| {
                        let tags = analysis.pos_tags_within(c.span());
                        c.with_pos_tags(tags)
                    }),
            );
        }

        let merged = SpanMerger::new().merge(shadow_by_patterns(candidates));

        let ctx = ValidationContext::new(text, doc_type).with_model_conflicts(&analysis);
        let mut outcome = self.validator.validate(merged, &ctx);

        if self.config.review.enabled {
            let proposed = self.review.review(text, &outcome.accepted, Some(&analysis));
            let reviewed = self.validator.validate(proposed, &ctx);
            outcome.accepted.extend(reviewed.accepted);
            outcome.rejected.extend(reviewed.rejected);
            outcome.accepted.sort_by_key(|e| e.span().start);
        }

        let mut book = TagBook::new();
        let mut persons = self.grouper.group(&outcome.accepted, &mut book);

        if self.config.review.sweep_residual_mentions {
            let mut claimed: Vec<Span> = outcome.accepted.iter().map(ScoredEntity::span).collect();
            let added = ResidualSweep::new().sweep(text, &mut persons, &mut claimed);
            if added > 0 {
                debug!(source, added, "Residual mentions attached");
            }
        }

        let typed = TagAssigner::new().assign(&outcome.accepted, &mut book);
        let redaction = Redactor::new().redact(text, &persons, &typed, &book)?;

        let elapsed = start.elapsed();
        let timestamp = Utc::now();
        let mapping = redaction.mapping.with_metadata(MappingMetadata {
            source: Some(source.to_string()),
            processed_at: timestamp,
            doc_type: Some(doc_type.to_string()),
            entities_found: redaction.spans.len(),
        });

        log_document_complete!(source, redaction.spans.len(), elapsed);

        Ok(RedactedDocument {
            id: Uuid::new_v4(),
            source: source.to_string(),
            doc_type,
            redacted_text: redaction.text,
            mapping,
            spans: redaction.spans,
            entities: outcome.accepted,
            rejections: outcome.rejected,
            detection_errors,
            processing_time_ms: elapsed.as_millis() as u64,
            timestamp,
        })
    }

    fn audit(&self, document: &RedactedDocument) -> Result<()> {
        if self.dry_run {
            return Ok(());
        }
        if let Some(ref logger) = self.audit_logger {
            logger.log_redaction(document)?;
        }
        Ok(())
    }
}
