//! Audit logger for redaction runs

use crate::redaction::engine::RedactedDocument;
use crate::redaction::models::{EntityKind, Source, Span};
use anyhow::{Context, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Audit log entry
#[derive(Debug, Serialize)]
struct AuditLogEntry {
    timestamp: String,
    document_id: String,
    source: String,
    doc_type: String,
    entities_count: usize,
    rejected_count: usize,
    detection_errors: usize,
    processing_time_ms: u64,
    entities: Vec<AuditEntity>,
}

/// Audit entity entry (with hashed value)
#[derive(Debug, Serialize)]
struct AuditEntity {
    kind: EntityKind,
    source: Source,
    span: Span,
    confidence: f32,
    /// SHA-256 hash of the original value (never log plaintext PII)
    value_hash: String,
}

/// Audit logger for redaction runs
pub struct AuditLogger {
    log_path: PathBuf,
    json_format: bool,
    enabled: bool,
}

impl AuditLogger {
    /// Create a new audit logger
    pub fn new(log_path: PathBuf, json_format: bool, enabled: bool) -> Result<Self> {
        if enabled {
            if let Some(parent) = log_path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create audit log directory: {}", parent.display())
                })?;
            }
        }

        Ok(Self {
            log_path,
            json_format,
            enabled,
        })
    }

    /// Log one redacted document
    pub fn log_redaction(&self, document: &RedactedDocument) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let entry = AuditLogEntry {
            timestamp: document.timestamp.to_rfc3339(),
            document_id: document.id.to_string(),
            source: document.source.clone(),
            doc_type: document.doc_type.to_string(),
            entities_count: document.spans.len(),
            rejected_count: document.rejections.len(),
            detection_errors: document.detection_errors.len(),
            processing_time_ms: document.processing_time_ms,
            entities: document
                .entities
                .iter()
                .map(|e| AuditEntity {
                    kind: e.kind(),
                    source: e.source(),
                    span: e.span(),
                    confidence: e.confidence(),
                    value_hash: hash_value(e.text()),
                })
                .collect(),
        };

        self.write_entry(&entry)
    }

    /// Write an audit entry to the log file
    fn write_entry(&self, entry: &AuditLogEntry) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open audit log: {}", self.log_path.display()))?;

        if self.json_format {
            let json_line =
                serde_json::to_string(entry).context("Failed to serialize audit entry")?;
            writeln!(file, "{json_line}").context("Failed to write audit entry")?;
        } else {
            writeln!(
                file,
                "[{}] Document: {} ({}) | Type: {} | Entities: {} | Rejected: {} | Time: {}ms",
                entry.timestamp,
                entry.source,
                entry.document_id,
                entry.doc_type,
                entry.entities_count,
                entry.rejected_count,
                entry.processing_time_ms
            )
            .context("Failed to write audit entry")?;
        }

        Ok(())
    }
}

/// Hash a value using SHA-256
fn hash_value(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let result = hasher.finalize();
    format!("{result:x}")
}
