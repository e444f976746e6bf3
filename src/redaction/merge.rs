//! Overlap resolution
//!
//! Detectors overlap freely; redaction needs one disjoint, ordered span list.

use crate::redaction::models::{Candidate, Source};
use std::cmp::Reverse;
use tracing::trace;

/// Resolves overlapping candidates into a disjoint list
///
/// Candidates are ordered by start, then longest first, then source priority
/// (PATTERN, HEURISTIC, MODEL). The walk keeps the rightmost accepted end and
/// drops anything starting before it. Equal spans from the same source keep
/// their input order, so the pattern library order decides between two
/// patterns matching the same text. Adjacent spans are both kept.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpanMerger;

impl SpanMerger {
    pub fn new() -> Self {
        Self
    }

    /// Merge candidates; output is disjoint and sorted by start
    pub fn merge(&self, mut candidates: Vec<Candidate>) -> Vec<Candidate> {
        // Stable sort keeps detector order for exact ties
        candidates.sort_by_key(|c| {
            let span = c.span();
            (span.start, Reverse(span.len()), c.source().priority())
        });

        let mut merged: Vec<Candidate> = Vec::with_capacity(candidates.len());
        let mut claimed_end = 0;
        for candidate in candidates {
            let span = candidate.span();
            if !merged.is_empty() && span.start < claimed_end {
                trace!(span = %span, kind = %candidate.kind(), "Dropping overlapped candidate");
                continue;
            }
            claimed_end = span.end;
            merged.push(candidate);
        }
        merged
    }
}

/// Drop MODEL and HEURISTIC candidates overlapping any PATTERN candidate
///
/// Regex output is authoritative for structured PII: a name span must never
/// swallow part of an email address or phone number.
pub fn shadow_by_patterns(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let pattern_spans: Vec<_> = candidates
        .iter()
        .filter(|c| c.source() == Source::Pattern)
        .map(Candidate::span)
        .collect();

    candidates
        .into_iter()
        .filter(|c| {
            c.source() == Source::Pattern
                || !pattern_spans.iter().any(|p| p.overlaps(&c.span()))
        })
        .collect()
}
