//! Blocked literal strings
//!
//! A blocklisted candidate is never a person, whatever its score.

use crate::domain::{PiitagError, Result};
use std::collections::HashSet;
use std::path::Path;

const DEFAULT_BLOCKLIST: &str = include_str!("../../../blocklists/person_blocklist.txt");

/// Case-insensitive set of blocked strings
#[derive(Debug, Clone, Default)]
pub struct Blocklist {
    entries: HashSet<String>,
}

impl Blocklist {
    /// Empty blocklist
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocklist seeded with the bundled default terms
    pub fn with_defaults() -> Self {
        let mut blocklist = Self::new();
        blocklist.extend_from_str(DEFAULT_BLOCKLIST);
        blocklist
    }

    /// Add terms from blocklist text: one per line, `#` starts a comment line
    pub fn extend_from_str(&mut self, contents: &str) {
        for line in contents.lines() {
            let line = line.trim();
            if !line.is_empty() && !line.starts_with('#') {
                self.insert(line);
            }
        }
    }

    /// Add terms from a blocklist file
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            PiitagError::Configuration(format!(
                "Failed to read blocklist {}: {e}",
                path.display()
            ))
        })?;
        self.extend_from_str(&contents);
        Ok(())
    }

    /// Add a single term
    pub fn insert(&mut self, term: &str) {
        let term = normalize(term);
        if !term.is_empty() {
            self.entries.insert(term);
        }
    }

    /// True when `text` equals a blocked term, ignoring case and surrounding
    /// whitespace
    pub fn contains(&self, text: &str) -> bool {
        self.entries.contains(&normalize(text))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize(term: &str) -> String {
    term.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

impl<S: AsRef<str>> FromIterator<S> for Blocklist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut blocklist = Self::new();
        for term in iter {
            blocklist.insert(term.as_ref());
        }
        blocklist
    }
}
