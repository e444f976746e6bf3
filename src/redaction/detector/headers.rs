//! ALL-CAPS name lines at the top of a document
//!
//! Resumes commonly open with the candidate's name in capitals on its own
//! line ("STEVE JOHNSON"), which capitalization-driven NER tends to miss or
//! mislabel as an organization.

use super::Detector;
use crate::redaction::models::{Candidate, EntityKind, Source, Span};
use anyhow::Result;
use regex::Regex;
use std::sync::OnceLock;

/// Default number of leading characters scanned
pub const DEFAULT_HEADER_SCAN_CHARS: usize = 500;

static HEADER_LINE: OnceLock<Regex> = OnceLock::new();

fn header_line() -> &'static Regex {
    HEADER_LINE.get_or_init(|| {
        Regex::new(r"(?m)^[ \t]*([A-Z][A-Z]+(?:[ \t]+[A-Z][A-Z]+){1,3})[ \t\r]*$")
            .expect("header pattern is a valid regex")
    })
}

/// Detects lines made of two to four ALL-CAPS words near the document start
#[derive(Debug, Clone)]
pub struct HeaderNameDetector {
    scan_chars: usize,
}

impl HeaderNameDetector {
    pub fn new(scan_chars: usize) -> Self {
        Self { scan_chars }
    }

    /// Byte length of the first `scan_chars` characters
    fn scan_limit(&self, text: &str) -> usize {
        text.char_indices()
            .nth(self.scan_chars)
            .map_or(text.len(), |(i, _)| i)
    }
}

impl Default for HeaderNameDetector {
    fn default() -> Self {
        Self::new(DEFAULT_HEADER_SCAN_CHARS)
    }
}

impl Detector for HeaderNameDetector {
    fn detect(&self, text: &str) -> Result<Vec<Candidate>> {
        let head = &text[..self.scan_limit(text)];

        let candidates = header_line()
            .captures_iter(head)
            .filter_map(|caps| caps.get(1))
            .map(|m| {
                Candidate::new(
                    text,
                    Span::new(m.start(), m.end()),
                    EntityKind::Person,
                    Source::Heuristic,
                )
            })
            .collect();

        Ok(candidates)
    }
}
