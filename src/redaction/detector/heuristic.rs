//! Rule-based model adapter
//!
//! A dependency-free stand-in for a statistical NER/POS model. Entities are
//! spotted from capitalization runs plus a few high-precision cues (personal
//! titles, organization suffixes, location prepositions, speaker labels).
//! Part of speech is guessed from small closed-class lexicons and word shape.
//!
//! Precision is deliberately favored over recall: the validator and the
//! structural review pass pick up what this model misses or over-reports.

use super::model::{ModelAdapter, ModelAnalysis, ModelEntity, ModelLabel, ModelToken};
use crate::redaction::models::PosTag;
use anyhow::Result;
use regex::Regex;
use std::sync::OnceLock;

const DETERMINERS: &[&str] = &[
    "the", "a", "an", "this", "that", "these", "those", "each", "every", "some", "any", "no",
    "all", "both", "either", "neither", "another",
];

const PREPOSITIONS: &[&str] = &[
    "in", "on", "at", "to", "for", "from", "by", "with", "of", "about", "into", "over", "under",
    "near", "after", "before", "during", "between", "through", "across", "within", "without",
    "per", "via", "as", "like", "since", "until",
];

const CONJUNCTIONS: &[&str] = &[
    "and", "or", "but", "nor", "so", "yet", "if", "because", "while", "although", "though",
    "whereas", "unless", "when", "whether",
];

const PRONOUNS: &[&str] = &[
    "i", "me", "my", "mine", "we", "us", "our", "ours", "you", "your", "yours", "he", "him",
    "his", "she", "her", "hers", "it", "its", "they", "them", "their", "theirs", "who", "whom",
    "whose", "which", "what", "myself", "yourself", "himself", "herself", "itself", "ourselves",
    "themselves",
];

const VERBS: &[&str] = &[
    "is", "are", "was", "were", "be", "been", "being", "am", "have", "has", "had", "do", "does",
    "did", "will", "would", "shall", "should", "can", "could", "may", "might", "must", "led",
    "lead", "leads", "managed", "manage", "manages", "built", "build", "builds", "designed",
    "design", "developed", "develop", "joined", "join", "worked", "work", "works", "reported",
    "report", "reports", "said", "say", "says", "told", "tell", "asked", "ask", "met", "meet",
    "created", "create", "implemented", "implement", "delivered", "deliver", "owned", "own",
    "oversaw", "oversee", "ran", "run", "wrote", "write", "spoke", "speak", "thanks", "thank",
    "think", "thought", "know", "knew", "see", "saw", "get", "got", "make", "made", "go", "went",
    "come", "came", "take", "took", "give", "gave", "launched", "launch", "improved", "improve",
    "reduced", "reduce", "increased", "increase", "mentored", "mentor", "coordinated",
    "coordinate", "supported", "support", "spearheaded", "collaborated", "responsible",
];

// Capitalized only because they open a sentence
const SENTENCE_STARTERS: &[&str] = &[
    "please", "contact", "call", "email", "visit", "note", "today", "yesterday", "tomorrow",
    "now", "then", "here", "there", "also", "however", "currently", "previously", "yes", "no",
    "okay", "ok", "well", "so", "thanks", "hello", "hi", "hey", "sure", "right", "great",
    "good", "just", "maybe", "actually", "basically",
];

const TITLES: &[&str] = &[
    "mr", "mrs", "ms", "miss", "mx", "dr", "prof", "professor", "sir", "dame", "rev",
];

const NAME_PARTICLES: &[&str] = &[
    "de", "da", "di", "del", "della", "der", "den", "van", "von", "la", "le", "du", "bin",
    "ibn", "al", "st",
];

const MONTHS: &[&str] = &[
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december",
];

const WEEKDAYS: &[&str] = &[
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
];

const ORG_SUFFIX: &[&str] = &[
    "inc", "corp", "corporation", "incorporated", "ltd", "limited", "llc", "llp", "plc", "co",
    "company", "group", "holdings", "partners", "associates", "foundation", "institute",
    "university", "college", "school", "bank", "agency", "labs", "technologies", "systems",
    "solutions", "consulting", "services", "hospital", "clinic", "gmbh", "ag",
];

const KNOWN_ORGS: &[&str] = &[
    "google", "apple", "microsoft", "amazon", "facebook", "meta", "netflix", "tesla", "ibm",
    "intel", "nvidia", "oracle", "cisco", "salesforce", "adobe", "deloitte", "accenture",
    "mckinsey", "nasa", "fbi", "nato", "un", "who",
];

const KNOWN_LOCATIONS: &[&str] = &[
    "usa", "us", "uk", "united states", "united kingdom", "canada", "mexico", "germany",
    "france", "spain", "italy", "india", "china", "japan", "australia", "brazil", "ireland",
    "new york", "los angeles", "san francisco", "chicago", "boston", "seattle", "austin",
    "denver", "atlanta", "dallas", "houston", "miami", "portland", "london", "paris", "berlin",
    "toronto", "sydney", "california", "texas", "florida", "washington", "oregon",
    "massachusetts", "colorado", "illinois", "georgia", "new jersey", "virginia", "ohio",
];

const LOC_PREPOSITIONS: &[&str] = &["in", "from", "near", "at"];

// Tokens that end a sentence, a clause label or a bullet
const BOUNDARY_PUNCT: &[&str] = &[".", "!", "?", ":", ";", "•", "-", "*", "|"];

static DATE_REGEX: OnceLock<Regex> = OnceLock::new();

fn date_regex() -> &'static Regex {
    DATE_REGEX.get_or_init(|| {
        Regex::new(
            r"(?i)\b(?:(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?\s+\d{1,2}(?:st|nd|rd|th)?,?\s+\d{4}|\d{1,2}(?:st|nd|rd|th)?\s+(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?,?\s+\d{4})\b",
        )
        .expect("date pattern is a valid regex")
    })
}

/// Token with its line number
#[derive(Debug, Clone, Copy)]
struct RawToken<'a> {
    start: usize,
    end: usize,
    text: &'a str,
    line: usize,
}

/// Rule-based NER/POS model
#[derive(Debug, Clone, Default)]
pub struct HeuristicModel;

impl HeuristicModel {
    pub fn new() -> Self {
        Self
    }
}

impl ModelAdapter for HeuristicModel {
    fn analyze(&self, text: &str) -> Result<ModelAnalysis> {
        let raw = tokenize(text);

        let tokens: Vec<ModelToken> = raw
            .iter()
            .enumerate()
            .map(|(i, t)| ModelToken {
                start: t.start,
                end: t.end,
                pos: guess_pos(t.text, is_sentence_initial(&raw, i)),
            })
            .collect();

        let mut entities = Vec::new();
        for (first, last) in capitalized_runs(&raw, &tokens) {
            if let Some(label) = classify_run(&raw, first, last) {
                entities.push(ModelEntity {
                    start: raw[first].start,
                    end: raw[last].end,
                    label,
                });
            }
        }

        for m in date_regex().find_iter(text) {
            entities.push(ModelEntity {
                start: m.start(),
                end: m.end(),
                label: ModelLabel::Date,
            });
        }
        entities.sort_by_key(|e| (e.start, e.end));

        Ok(ModelAnalysis { tokens, entities })
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}

/// Split on whitespace, then peel leading and trailing punctuation into
/// single-character tokens
fn tokenize(text: &str) -> Vec<RawToken<'_>> {
    let mut tokens = Vec::new();
    let mut line = 0;
    let mut chunk_start: Option<usize> = None;

    for (i, c) in text.char_indices().chain(std::iter::once((text.len(), ' '))) {
        if c.is_whitespace() {
            if let Some(start) = chunk_start.take() {
                push_chunk(text, start, i, line, &mut tokens);
            }
            if c == '\n' {
                line += 1;
            }
        } else if chunk_start.is_none() {
            chunk_start = Some(i);
        }
    }
    tokens
}

fn push_chunk<'a>(text: &'a str, start: usize, end: usize, line: usize, out: &mut Vec<RawToken<'a>>) {
    let chunk = &text[start..end];
    let Some(core_start) = chunk.find(|c: char| c.is_alphanumeric()) else {
        out.push(RawToken {
            start,
            end,
            text: chunk,
            line,
        });
        return;
    };
    let core_end = chunk
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_alphanumeric())
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(chunk.len());

    for (i, c) in chunk[..core_start].char_indices() {
        let s = start + i;
        out.push(RawToken {
            start: s,
            end: s + c.len_utf8(),
            text: &text[s..s + c.len_utf8()],
            line,
        });
    }
    out.push(RawToken {
        start: start + core_start,
        end: start + core_end,
        text: &chunk[core_start..core_end],
        line,
    });
    for (i, c) in chunk[core_end..].char_indices() {
        let s = start + core_end + i;
        out.push(RawToken {
            start: s,
            end: s + c.len_utf8(),
            text: &text[s..s + c.len_utf8()],
            line,
        });
    }
}

fn is_sentence_initial(tokens: &[RawToken<'_>], i: usize) -> bool {
    if i == 0 {
        return true;
    }
    let prev = &tokens[i - 1];
    prev.line != tokens[i].line || BOUNDARY_PUNCT.contains(&prev.text)
}

fn is_capitalized(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}

fn guess_pos(word: &str, sentence_initial: bool) -> PosTag {
    if !word.chars().any(char::is_alphanumeric) {
        return PosTag::Punctuation;
    }
    if word.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        return PosTag::Number;
    }

    let lower = word.to_lowercase();
    let lower = lower.as_str();
    if DETERMINERS.contains(&lower) {
        return PosTag::Determiner;
    }
    if PREPOSITIONS.contains(&lower) {
        return PosTag::Preposition;
    }
    if CONJUNCTIONS.contains(&lower) {
        return PosTag::Conjunction;
    }
    if PRONOUNS.contains(&lower) {
        return PosTag::Pronoun;
    }
    if MONTHS.contains(&lower) || WEEKDAYS.contains(&lower) {
        return PosTag::Noun;
    }

    if is_capitalized(word) {
        if !sentence_initial {
            return PosTag::ProperNoun;
        }
        if VERBS.contains(&lower) || (lower.ends_with("ing") && lower.len() > 5) {
            return PosTag::Verb;
        }
        if SENTENCE_STARTERS.contains(&lower) {
            return PosTag::Other;
        }
        return PosTag::ProperNoun;
    }

    if VERBS.contains(&lower)
        || (lower.len() > 4 && (lower.ends_with("ing") || lower.ends_with("ed")))
    {
        return PosTag::Verb;
    }
    if lower.len() > 4 && lower.ends_with("ly") {
        return PosTag::Adverb;
    }
    PosTag::Noun
}

fn is_title(word: &str) -> bool {
    TITLES.contains(&word.to_lowercase().as_str())
}

fn is_name_like(token: &RawToken<'_>, pos: PosTag) -> bool {
    pos == PosTag::ProperNoun && !is_title(token.text)
}

/// Maximal runs of capitalized tokens on one line, allowing name particles
/// between two capitalized tokens
fn capitalized_runs(raw: &[RawToken<'_>], tokens: &[ModelToken]) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut i = 0;
    while i < raw.len() {
        if !is_name_like(&raw[i], tokens[i].pos) {
            i += 1;
            continue;
        }
        let first = i;
        let mut last = i;
        let mut j = i + 1;
        while j < raw.len() && raw[j].line == raw[first].line {
            if is_name_like(&raw[j], tokens[j].pos) {
                last = j;
                j += 1;
            } else if NAME_PARTICLES.contains(&raw[j].text.to_lowercase().as_str())
                && j + 1 < raw.len()
                && raw[j + 1].line == raw[first].line
                && is_name_like(&raw[j + 1], tokens[j + 1].pos)
            {
                j += 1;
            } else {
                break;
            }
        }
        runs.push((first, last));
        i = last + 1;
    }
    runs
}

fn title_prefixed(raw: &[RawToken<'_>], first: usize) -> bool {
    match first {
        0 => false,
        1 => is_title(raw[0].text),
        _ => {
            is_title(raw[first - 1].text)
                || (raw[first - 1].text == "." && is_title(raw[first - 2].text))
        }
    }
}

fn is_speaker_label(raw: &[RawToken<'_>], first: usize, last: usize) -> bool {
    let line_start = first == 0 || raw[first - 1].line != raw[first].line;
    line_start
        && raw
            .get(last + 1)
            .is_some_and(|t| t.text == ":" && t.line == raw[last].line)
}

fn classify_run(raw: &[RawToken<'_>], first: usize, last: usize) -> Option<ModelLabel> {
    let words: Vec<String> = raw[first..=last]
        .iter()
        .map(|t| t.text.to_lowercase())
        .collect();
    let joined = words.join(" ");
    let count = last - first + 1;

    if words
        .iter()
        .any(|w| ORG_SUFFIX.contains(&w.as_str()) || KNOWN_ORGS.contains(&w.as_str()))
    {
        return Some(ModelLabel::Org);
    }
    if KNOWN_LOCATIONS.contains(&joined.as_str()) {
        return Some(ModelLabel::Gpe);
    }
    if title_prefixed(raw, first) && count <= 4 {
        return Some(ModelLabel::Person);
    }
    if count == 1 {
        let after_loc_prep = first > 0
            && LOC_PREPOSITIONS.contains(&raw[first - 1].text.to_lowercase().as_str());
        if after_loc_prep {
            return Some(ModelLabel::Gpe);
        }
        if is_speaker_label(raw, first, last) {
            return Some(ModelLabel::Person);
        }
        return None;
    }
    if count <= 4 {
        return Some(ModelLabel::Person);
    }
    None
}
