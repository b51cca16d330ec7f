//! Scanner: single-pass term matching over UTF-16 text
//!
//! Streams the text once through a [`TermAutomaton`] and reports every
//! (term, start, end) hit, overlapping and nested ones included.

use serde::{Deserialize, Serialize};

use super::automaton::{TermAutomaton, ROOT};

/// A term occurrence in UTF-16 code-unit offsets, `[start, end)`
///
/// Field names match the worker wire format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TermMatch {
    pub term: String,
    pub start: usize,
    pub end: usize,
}

impl TermMatch {
    pub fn new(term: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            term: term.into(),
            start,
            end,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Scan `text` and return all matches.
///
/// Order: ascending end offset; matches sharing an end offset follow pattern
/// registration order. No deduplication or longest-match suppression.
pub fn scan(text: &str, automaton: &TermAutomaton) -> Vec<TermMatch> {
    let mut matches = Vec::new();
    scan_with(text, automaton, |m| matches.push(m));
    matches
}

/// Scan `text`, handing each match to `sink` as it is found.
pub fn scan_with<F>(text: &str, automaton: &TermAutomaton, mut sink: F)
where
    F: FnMut(TermMatch),
{
    if automaton.is_empty() || text.is_empty() {
        return;
    }

    let mut node = ROOT;
    for (index, unit) in text.encode_utf16().enumerate() {
        node = automaton.step(node, unit);
        for &id in automaton.node(node).output() {
            let pattern = automaton.pattern(id);
            let end = index + 1;
            sink(TermMatch {
                term: pattern.text.clone(),
                start: end - pattern.len_utf16,
                end,
            });
        }
    }
}

/// Build a throwaway automaton for `terms` and scan `text` with it.
pub fn search_terms<S: AsRef<str>>(text: &str, terms: &[S]) -> Vec<TermMatch> {
    let automaton = TermAutomaton::build(terms.iter().map(AsRef::as_ref));
    scan(text, &automaton)
}

/// True when any pattern occurs in `text`; stops at the first hit.
pub fn contains_any(text: &str, automaton: &TermAutomaton) -> bool {
    if automaton.is_empty() {
        return false;
    }
    let mut node = ROOT;
    for unit in text.encode_utf16() {
        node = automaton.step(node, unit);
        if !automaton.node(node).output().is_empty() {
            return true;
        }
    }
    false
}
