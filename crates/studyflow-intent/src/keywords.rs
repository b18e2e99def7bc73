//! Keyword matchers.
//!
//! [`KeywordSet`] answers "does the text mention any of these words" with a
//! single Aho-Corasick pass.  [`AnchorSet`] locates where a title starts:
//! one word-bounded regex per keyword, tried in vocabulary order.

use aho_corasick::{AhoCorasick, MatchKind};
use regex::Regex;

use crate::error::{IntentError, Result};

/// Case-insensitive substring matcher over a fixed keyword list.
///
/// Callers pass text that is already lowercased; the keywords are lowercased
/// at construction.
#[derive(Debug, Clone)]
pub struct KeywordSet {
    automaton: AhoCorasick,
}

impl KeywordSet {
    pub fn new(keywords: &[&str]) -> Result<Self> {
        let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();

        if keywords.iter().any(|k| k.is_empty()) {
            return Err(IntentError::KeywordIndex {
                reason: "empty keyword".into(),
            });
        }

        let automaton = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(&keywords)
            .map_err(|e| IntentError::KeywordIndex {
                reason: e.to_string(),
            })?;

        tracing::trace!(count = keywords.len(), "keyword automaton built");

        Ok(Self { automaton })
    }

    /// Whether any keyword occurs in `lowered`.
    pub fn contains_any(&self, lowered: &str) -> bool {
        self.automaton.is_match(lowered)
    }

    /// Index, in the construction list, of the leftmost (then longest)
    /// keyword occurrence.
    pub fn find(&self, lowered: &str) -> Option<usize> {
        self.automaton.find(lowered).map(|m| m.pattern().as_usize())
    }
}

/// Ordered title anchors.
///
/// Each keyword matches as a whole word, case-insensitively, with an
/// optional plural `s` and flexible inner whitespace.
#[derive(Debug, Clone)]
pub struct AnchorSet {
    anchors: Vec<Regex>,
}

impl AnchorSet {
    pub fn new(keywords: &[&str]) -> Result<Self> {
        let anchors = keywords
            .iter()
            .map(|keyword| {
                let body = regex::escape(&keyword.to_lowercase()).replace(' ', r"\s+");
                compile(format!(r"(?i)\b{body}s?\b"))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { anchors })
    }

    /// Byte offset just past the first anchor (in list order) found in
    /// `text`.
    pub fn end_of_first(&self, text: &str) -> Option<usize> {
        self.anchors
            .iter()
            .find_map(|anchor| anchor.find(text).map(|m| m.end()))
    }
}

/// Build a case-insensitive alternation of whole words, longest first so
/// that `heures` wins over `heure`.
pub(crate) fn word_alternation(words: &[&str]) -> String {
    let mut words: Vec<String> = words
        .iter()
        .map(|w| regex::escape(&w.to_lowercase()).replace(' ', r"\s+"))
        .collect();
    words.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    words.dedup();
    words.join("|")
}

/// Compile a regex, mapping the failure to [`IntentError::InvalidPattern`].
pub(crate) fn compile(pattern: String) -> Result<Regex> {
    Regex::new(&pattern).map_err(|e| IntentError::InvalidPattern {
        reason: e.to_string(),
        pattern,
    })
}
