//! Run reporting
//!
//! Aggregates statistics over the documents of one run: entities per kind,
//! rejections per reason, sample replacements and warnings. Used for the
//! CLI summary and for dry-run mode.

use crate::redaction::engine::RedactedDocument;
use crate::redaction::models::{EntityKind, Span};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const MAX_SAMPLES: usize = 20;
const SAMPLES_PER_DOCUMENT: usize = 3;

/// Run report with redaction statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Total documents processed (including failures)
    pub total_documents: usize,

    /// Documents that could not be redacted
    pub failed_documents: usize,

    /// Total spans replaced
    pub total_entities: usize,

    /// Replaced spans by kind
    pub entities_by_kind: BTreeMap<EntityKind, usize>,

    /// Rejected PERSON candidates by reason code
    pub rejections_by_reason: BTreeMap<String, usize>,

    /// Sample replacements (no original values)
    pub samples: Vec<RedactionSample>,

    /// Warnings about failed documents and dropped detector output
    pub warnings: Vec<String>,

    /// Processing statistics
    pub stats: ProcessingStats,
}

/// One replaced span, described without its original value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactionSample {
    pub source: String,
    pub kind: EntityKind,
    pub tag: String,
    pub span: Span,
}

/// Processing statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingStats {
    /// Average processing time per document (ms)
    pub avg_processing_time_ms: u64,

    /// Total processing time (ms)
    pub total_processing_time_ms: u64,

    pub documents_with_pii: usize,

    pub documents_without_pii: usize,
}

impl RunReport {
    /// Create a new empty report
    pub fn new() -> Self {
        Self {
            total_documents: 0,
            failed_documents: 0,
            total_entities: 0,
            entities_by_kind: BTreeMap::new(),
            rejections_by_reason: BTreeMap::new(),
            samples: Vec::new(),
            warnings: Vec::new(),
            stats: ProcessingStats::default(),
        }
    }

    /// Add results from a redacted document
    pub fn add_document(&mut self, document: &RedactedDocument) {
        self.total_documents += 1;
        self.stats.total_processing_time_ms += document.processing_time_ms;

        if document.spans.is_empty() {
            self.stats.documents_without_pii += 1;
        } else {
            self.stats.documents_with_pii += 1;
            self.total_entities += document.spans.len();
            for (kind, count) in document.counts_by_kind() {
                *self.entities_by_kind.entry(kind).or_insert(0) += count;
            }
            for tagged in document.spans.iter().take(SAMPLES_PER_DOCUMENT) {
                if self.samples.len() >= MAX_SAMPLES {
                    break;
                }
                self.samples.push(RedactionSample {
                    source: document.source.clone(),
                    kind: tagged.kind,
                    tag: tagged.tag.clone(),
                    span: tagged.span,
                });
            }
        }

        for rejection in &document.rejections {
            *self
                .rejections_by_reason
                .entry(rejection.reason.code().to_string())
                .or_insert(0) += 1;
        }

        if !document.detection_errors.is_empty() {
            self.add_warning(format!(
                "{}: dropped {} model span(s) with invalid offsets",
                document.source,
                document.detection_errors.len()
            ));
        }

        self.update_average();
    }

    /// Record a document that failed
    pub fn add_failure(&mut self, source: &str, error: &anyhow::Error) {
        self.total_documents += 1;
        self.failed_documents += 1;
        self.add_warning(format!("Failed to redact {source}: {error:#}"));
        self.update_average();
    }

    /// Add a warning
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Number of documents redacted successfully
    pub fn succeeded(&self) -> usize {
        self.total_documents - self.failed_documents
    }

    fn update_average(&mut self) {
        let succeeded = self.succeeded();
        if succeeded > 0 {
            self.stats.avg_processing_time_ms =
                self.stats.total_processing_time_ms / succeeded as u64;
        }
    }

    /// Format report for console output
    pub fn format_console(&self, dry_run: bool) -> String {
        let mut output = String::new();
        let title = if dry_run {
            "                  REDACTION DRY-RUN REPORT                     "
        } else {
            "                     REDACTION REPORT                          "
        };

        output.push('\n');
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push_str(title);
        output.push('\n');
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push('\n');

        output.push_str("📊 SUMMARY\n");
        output.push_str("───────────────────────────────────────────────────────────────\n");
        output.push_str(&format!(
            "  Documents Processed:         {}\n",
            self.total_documents
        ));
        output.push_str(&format!(
            "  Documents Failed:            {}\n",
            self.failed_documents
        ));
        output.push_str(&format!(
            "  Documents with PII:          {}\n",
            self.stats.documents_with_pii
        ));
        output.push_str(&format!(
            "  Documents without PII:       {}\n",
            self.stats.documents_without_pii
        ));
        output.push_str(&format!(
            "  Total Entities Redacted:     {}\n",
            self.total_entities
        ));
        output.push_str(&format!(
            "  Avg Processing Time:         {} ms\n",
            self.stats.avg_processing_time_ms
        ));
        output.push('\n');

        if !self.entities_by_kind.is_empty() {
            output.push_str("🔍 ENTITIES BY KIND\n");
            output.push_str("───────────────────────────────────────────────────────────────\n");

            let mut kinds: Vec<_> = self.entities_by_kind.iter().collect();
            kinds.sort_by(|a, b| b.1.cmp(a.1));

            for (kind, count) in kinds {
                output.push_str(&format!("  {:30} {:>5}\n", kind.label(), count));
            }
            output.push('\n');
        }

        if !self.rejections_by_reason.is_empty() {
            output.push_str("🚫 REJECTED NAME CANDIDATES\n");
            output.push_str("───────────────────────────────────────────────────────────────\n");
            for (reason, count) in &self.rejections_by_reason {
                output.push_str(&format!("  {:30} {:>5}\n", reason, count));
            }
            output.push('\n');
        }

        if !self.samples.is_empty() {
            output.push_str("📝 SAMPLE REPLACEMENTS\n");
            output.push_str("───────────────────────────────────────────────────────────────\n");
            for sample in self.samples.iter().take(10) {
                output.push_str(&format!(
                    "  {:20} {:10} {} at {}\n",
                    sample.source,
                    sample.kind.label(),
                    sample.tag,
                    sample.span
                ));
            }
            output.push('\n');
        }

        if !self.warnings.is_empty() {
            output.push_str("⚠️  WARNINGS\n");
            output.push_str("───────────────────────────────────────────────────────────────\n");
            for warning in &self.warnings {
                output.push_str(&format!("  • {}\n", warning));
            }
            output.push('\n');
        }

        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push('\n');

        output
    }

    /// Format report as JSON
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write report to file
    pub fn write_to_file(&self, path: &std::path::Path) -> std::io::Result<()> {
        let json = self.format_json().map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redaction::{RedactionConfig, RedactionEngine};
    use tempfile::tempdir;

    fn redact(source: &str, text: &str) -> RedactedDocument {
        RedactionEngine::new(RedactionConfig::default())
            .unwrap()
            .process_named(source, text)
            .unwrap()
    }

    #[test]
    fn test_report_creation() {
        let report = RunReport::new();
        assert_eq!(report.total_documents, 0);
        assert_eq!(report.total_entities, 0);
        assert!(report.entities_by_kind.is_empty());
        assert!(report.samples.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_add_document_without_pii() {
        let mut report = RunReport::new();
        report.add_document(&redact("plain.txt", "nothing sensitive here"));

        assert_eq!(report.total_documents, 1);
        assert_eq!(report.total_entities, 0);
        assert_eq!(report.stats.documents_without_pii, 1);
        assert_eq!(report.stats.documents_with_pii, 0);
    }

    #[test]
    fn test_add_document_with_pii() {
        let mut report = RunReport::new();
        report.add_document(&redact("mail.txt", "write a@x.io or b@y.io"));

        assert_eq!(report.total_entities, 2);
        assert_eq!(report.stats.documents_with_pii, 1);
        assert_eq!(report.entities_by_kind.get(&EntityKind::Email), Some(&2));
        assert_eq!(report.samples.len(), 2);
        assert_eq!(report.samples[0].tag, "<<EMAIL_1>>");
    }

    #[test]
    fn test_failures_counted() {
        let mut report = RunReport::new();
        report.add_failure("broken.txt", &anyhow::anyhow!("not UTF-8"));

        assert_eq!(report.total_documents, 1);
        assert_eq!(report.failed_documents, 1);
        assert_eq!(report.succeeded(), 0);
        assert!(report.warnings[0].contains("broken.txt"));
    }

    #[test]
    fn test_format_console() {
        let mut report = RunReport::new();
        report.total_documents = 10;
        report.total_entities = 5;
        report.stats.documents_with_pii = 3;
        report.stats.documents_without_pii = 7;

        let output = report.format_console(true);
        assert!(output.contains("REDACTION DRY-RUN REPORT"));
        assert!(output.contains("Documents Processed:         10"));
        assert!(output.contains("Total Entities Redacted:     5"));
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.json");
        let mut report = RunReport::new();
        report.add_document(&redact("mail.txt", "write a@x.io"));
        report.write_to_file(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["entities_by_kind"]["EMAIL"], 1);
    }
}
