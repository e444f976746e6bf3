//! Person-name scoring rules
//!
//! Rules come in two tiers. Hard rules reject a candidate outright and stop
//! evaluation. Scoring rules each contribute named adjustments to a base
//! confidence of 0.5; they run in declaration order so the resulting trace
//! is stable.

use super::{Blocklist, RejectionReason, ValidationContext};
use crate::redaction::classifier::DocumentType;
use crate::redaction::models::{Candidate, PosTag};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Confidence every PERSON candidate starts from
pub const BASE_CONFIDENCE: f32 = 0.5;

/// Candidates longer than this many tokens are not names
pub const MAX_NAME_TOKENS: usize = 5;

const SECTION_HEADERS: &[&str] = &[
    "professional summary", "executive summary", "career summary", "career objective",
    "objective", "profile", "summary", "work experience", "professional experience",
    "employment history", "education", "academic background", "skills", "technical skills",
    "core competencies", "certifications", "licenses", "credentials", "projects",
    "key projects", "notable projects", "references", "contact information",
    "personal information", "achievements", "accomplishments", "awards", "publications",
    "presentations", "volunteer work", "languages", "interests", "activities", "experience",
    "qualifications",
];

/// Lowercase particles in international names
pub const NAME_PARTICLES: &[&str] = &[
    "de", "del", "della", "di", "da", "van", "von", "der", "den", "ter", "te", "la", "le", "bin",
    "ibn", "al", "el",
];

struct Lexicon {
    job_titles: Vec<Regex>,
    certifications: Vec<Regex>,
}

static LEXICON: OnceLock<Lexicon> = OnceLock::new();

fn lexicon() -> &'static Lexicon {
    LEXICON.get_or_init(|| {
        let compile = |patterns: &[&str]| -> Vec<Regex> {
            patterns
                .iter()
                .map(|p| Regex::new(p).expect("lexicon pattern is a valid regex"))
                .collect()
        };
        Lexicon {
            job_titles: compile(&[
                r"(?i)\b(?:senior|junior|lead|principal|staff|chief|associate|assistant)\s+(?:\w+\s+)?(?:engineer|developer|architect|manager|designer|analyst|consultant|specialist|coordinator|administrator)\b",
                r"(?i)\b(?:software|hardware|cloud|data|security|devops|full[- ]?stack|frontend|backend|platform|mobile|web|qa|test)\s+(?:engineer|developer|architect)\b",
                r"(?i)\b(?:product|program|project|engineering|account|sales|marketing|operations)\s+manager\b",
                r"(?i)\bscrum\s+master\b",
                r"(?i)\b(?:business|data|security|systems|network)\s+(?:analyst|administrator)\b",
                r"(?i)\b(?:vice\s+president|managing\s+director|general\s+manager)\b",
                r"(?i)\b(?:technical|creative|art|design)\s+(?:lead|director)\b",
            ]),
            certifications: compile(&[
                r"(?i)\baws\s+(?:certified\s+)?(?:solutions?\s+)?(?:architect|developer|practitioner|sysops|devops)\b",
                r"(?i)\b(?:certified\s+)?scrum\s+(?:master|alliance|product\s+owner)\b",
                r"\b(?:PMP|CISSP|CISM|CRISC|CEH|OSCP|CompTIA|ITIL)\b",
                r"(?i)\bgoogle\s+cloud\b",
                r"(?i)\bmicrosoft\s+(?:certified|azure)\b",
                r"(?i)\bcisco\s+certified\b",
                r"(?i)\boracle\s+certified\b",
                r"(?i)\bred\s+hat\s+certified\b",
                r"(?i)\bsix\s+sigma\b",
            ]),
        }
    })
}

/// Rules that reject a candidate outright, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardRule {
    Blocklist,
    Malformed,
    SectionHeader,
    Certification,
    JobTitle,
}

impl HardRule {
    pub const ORDER: [HardRule; 5] = [
        Self::Blocklist,
        Self::Malformed,
        Self::SectionHeader,
        Self::Certification,
        Self::JobTitle,
    ];

    /// Reject reason when the rule fires
    pub fn check(&self, candidate: &Candidate, blocklist: &Blocklist) -> Option<RejectionReason> {
        let text = candidate.text().trim();
        match self {
            Self::Blocklist => blocklist.contains(text).then_some(RejectionReason::Blocklisted),
            Self::Malformed => malformed(text).map(|detail| RejectionReason::Malformed { detail }),
            Self::SectionHeader => SECTION_HEADERS
                .contains(&text.to_lowercase().as_str())
                .then_some(RejectionReason::SectionHeader),
            Self::Certification => lexicon()
                .certifications
                .iter()
                .any(|r| r.is_match(text))
                .then_some(RejectionReason::Certification),
            Self::JobTitle => lexicon()
                .job_titles
                .iter()
                .any(|r| r.is_match(text))
                .then_some(RejectionReason::JobTitle),
        }
    }
}

fn malformed(text: &str) -> Option<String> {
    if text.chars().any(|c| c.is_ascii_digit()) {
        return Some("contains digits".to_string());
    }
    if text.contains('@') {
        return Some("contains '@'".to_string());
    }
    if text.contains('\n') || text.contains('\r') {
        return Some("spans a line break".to_string());
    }
    let tokens = text.split_whitespace().count();
    if tokens == 0 || tokens > MAX_NAME_TOKENS {
        return Some(format!("{tokens} tokens"));
    }
    None
}

/// One named confidence adjustment
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Adjustment {
    pub reason: &'static str,
    pub delta: f32,
}

impl Adjustment {
    fn new(reason: &'static str, delta: f32) -> Self {
        Self { reason, delta }
    }
}

/// Rules that adjust confidence, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringRule {
    TokenCount,
    PartOfSpeech,
    EntityConflict,
    Capitalization,
    Punctuation,
    SpeakerLabel,
}

impl ScoringRule {
    pub const ORDER: [ScoringRule; 6] = [
        Self::TokenCount,
        Self::PartOfSpeech,
        Self::EntityConflict,
        Self::Capitalization,
        Self::Punctuation,
        Self::SpeakerLabel,
    ];

    /// Append this rule's adjustments for `candidate`
    pub fn apply(
        &self,
        candidate: &Candidate,
        ctx: &ValidationContext<'_>,
        out: &mut Vec<Adjustment>,
    ) {
        let text = candidate.text().trim();
        match self {
            Self::TokenCount => {
                let tokens: Vec<&str> = text.split_whitespace().collect();
                match tokens.len() {
                    2 | 3 => out.push(Adjustment::new("two_or_three_tokens", 0.25)),
                    1 | 4 => out.push(Adjustment::new("plausible_token_count", 0.1)),
                    _ => {}
                }
                if tokens.len() == 1 && tokens[0].chars().count() <= 2 {
                    out.push(Adjustment::new("very_short_token", -0.2));
                }
            }
            Self::PartOfSpeech => {
                let Some(tags) = candidate.pos_tags() else {
                    return;
                };
                let words: Vec<PosTag> = tags
                    .iter()
                    .copied()
                    .filter(|t| *t != PosTag::Punctuation)
                    .collect();
                if words.is_empty() {
                    return;
                }
                let proper = words.iter().filter(|t| **t == PosTag::ProperNoun).count();
                let ratio = proper as f32 / words.len() as f32;
                if ratio > 0.8 {
                    out.push(Adjustment::new("mostly_proper_nouns", 0.2));
                } else if ratio < 0.3 {
                    out.push(Adjustment::new("few_proper_nouns", -0.2));
                }
                if words
                    .iter()
                    .any(|t| matches!(t, PosTag::Noun | PosTag::Verb))
                {
                    out.push(Adjustment::new("common_noun_or_verb", -0.15));
                }
            }
            Self::EntityConflict => {
                let span = candidate.span();
                let conflict = ctx
                    .conflicts
                    .iter()
                    .any(|c| c.span.overlaps(&span) || c.text.eq_ignore_ascii_case(text));
                if conflict {
                    out.push(Adjustment::new("labeled_org_or_place", -0.5));
                }
            }
            Self::Capitalization => {
                if text.chars().any(char::is_alphabetic)
                    && !text.chars().any(char::is_uppercase)
                {
                    out.push(Adjustment::new("all_lowercase", -0.3));
                } else if !has_name_capitalization(text) {
                    out.push(Adjustment::new("improper_capitalization", -0.25));
                }
            }
            Self::Punctuation => {
                if punctuation_heavy(text) {
                    out.push(Adjustment::new("punctuation_heavy", -0.3));
                }
            }
            Self::SpeakerLabel => {
                if ctx.doc_type == DocumentType::Transcript
                    && !text.contains(char::is_whitespace)
                    && is_speaker_label(ctx.text, candidate)
                {
                    out.push(Adjustment::new("speaker_label", 0.1));
                }
            }
        }
    }
}

/// Every significant token starts uppercase
///
/// Short tokens, name particles, O'/Mc/Mac prefixes and hyphenated parts
/// that each start uppercase are all acceptable.
pub fn has_name_capitalization(text: &str) -> bool {
    text.split_whitespace().all(|part| {
        if part.chars().count() <= 2 || NAME_PARTICLES.contains(&part.to_lowercase().as_str()) {
            return true;
        }
        if part.starts_with("O'") || part.starts_with("O\u{2019}") || part.starts_with("Mc") || part.starts_with("Mac") {
            return true;
        }
        if part.contains('-') {
            return part
                .split('-')
                .filter(|p| !p.is_empty())
                .all(|p| p.chars().next().is_some_and(char::is_uppercase));
        }
        part.chars().next().is_some_and(char::is_uppercase)
    })
}

fn punctuation_heavy(text: &str) -> bool {
    let total = text.chars().filter(|c| !c.is_whitespace()).count();
    let odd = text
        .chars()
        .filter(|c| {
            !c.is_alphabetic()
                && !c.is_whitespace()
                && !matches!(c, '-' | '\'' | '\u{2019}' | '.' | ',')
        })
        .count();
    odd >= 2 || (total > 0 && odd * 5 > total)
}

/// `Name:` at the start of a line
fn is_speaker_label(text: &str, candidate: &Candidate) -> bool {
    let span = candidate.span();
    let line_start = text[..span.start].rfind('\n').map_or(0, |i| i + 1);
    text[line_start..span.start].trim().is_empty()
        && text[span.end..].trim_start_matches([' ', '\t']).starts_with(':')
}
