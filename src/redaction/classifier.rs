//! Document type classification from structural cues

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Number of leading characters inspected
const SAMPLE_CHARS: usize = 1500;

/// Kind of document being redacted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Resume,
    Transcript,
    General,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resume => "resume",
            Self::Transcript => "transcript",
            Self::General => "general",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "resume" => Ok(Self::Resume),
            "transcript" => Ok(Self::Transcript),
            "general" => Ok(Self::General),
            other => Err(format!(
                "unknown document type '{other}' (expected resume, transcript or general)"
            )),
        }
    }
}

/// Parse a configured document type; "auto" means classify each document
pub fn parse_doc_type_setting(s: &str) -> Result<Option<DocumentType>, String> {
    if s.eq_ignore_ascii_case("auto") {
        Ok(None)
    } else {
        s.parse().map(Some)
    }
}

struct Cues {
    role_label: Regex,
    speaker_line: Regex,
    qa_marker: Regex,
    resume_word: Regex,
    resume_section: Regex,
    resume_phrase: Regex,
}

static CUES: OnceLock<Cues> = OnceLock::new();

fn cues() -> &'static Cues {
    CUES.get_or_init(|| Cues {
        role_label: Regex::new(r"\b(?:interviewer|interviewee|moderator|speaker\s*\d+)\s*:")
            .expect("valid regex"),
        speaker_line: Regex::new(r"(?m)^\s*[A-Z][a-z]+\s*:").expect("valid regex"),
        qa_marker: Regex::new(r"\b(?:q:|a:|question:|answer:)").expect("valid regex"),
        resume_word: Regex::new(r"\b(?:resume|curriculum vitae|cv)\b").expect("valid regex"),
        resume_section: Regex::new(r"\b(?:professional summary|work experience|education)\b")
            .expect("valid regex"),
        resume_phrase: Regex::new(r"\b(?:years? of experience|proficient in|responsible for)\b")
            .expect("valid regex"),
    })
}

/// Classify a document as resume, transcript or general
///
/// Only the first 1500 characters are inspected. A document is a transcript
/// when its transcript score beats the resume score and reaches 3, otherwise
/// a resume when the resume score reaches 2.
pub fn classify(text: &str) -> DocumentType {
    let end = text
        .char_indices()
        .nth(SAMPLE_CHARS)
        .map_or(text.len(), |(i, _)| i);
    let sample = &text[..end];
    let lower = sample.to_lowercase();
    let cues = cues();

    let mut transcript_score = 0;
    if cues.role_label.is_match(&lower) {
        transcript_score += 3;
    }
    if cues.speaker_line.is_match(sample) {
        transcript_score += 1;
    }
    if cues.qa_marker.is_match(&lower) {
        transcript_score += 2;
    }

    let mut resume_score = 0;
    if cues.resume_word.is_match(&lower) {
        resume_score += 3;
    }
    if cues.resume_section.is_match(&lower) {
        resume_score += 2;
    }
    if cues.resume_phrase.is_match(&lower) {
        resume_score += 1;
    }

    if transcript_score > resume_score && transcript_score >= 3 {
        DocumentType::Transcript
    } else if resume_score >= 2 {
        DocumentType::Resume
    } else {
        DocumentType::General
    }
}
