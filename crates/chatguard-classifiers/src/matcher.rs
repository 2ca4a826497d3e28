//! Keyword matching against normalized text
//!
//! Latin keywords match on ASCII word boundaries so "fat" never hits inside
//! "father". Keywords in other scripts match as plain substrings: word
//! boundaries are unreliable there, which means a short non-Latin keyword can
//! over-match inside a longer word. That limitation is accepted as is.

use crate::keywords::KeywordStore;
use crate::normalize::{is_latin_keyword, normalize};
use aho_corasick::AhoCorasick;
use chatguard_core::{LanguageCode, Match, Severity};
use tracing::warn;

/// Compiled form of one severity tier of one language
#[derive(Debug)]
pub struct TierIndex {
    /// Original keyword spellings
    keywords: Vec<String>,

    /// Normalized form of each keyword, parallel to `keywords`
    patterns: Vec<String>,

    /// Whether each keyword needs word boundaries
    latin: Vec<bool>,

    automaton: Option<AhoCorasick>,
}

impl TierIndex {
    /// Normalize and compile keywords; blanks are skipped.
    pub fn build(keywords: &[String]) -> Self {
        let (keywords, patterns): (Vec<String>, Vec<String>) = keywords
            .iter()
            .map(|keyword| (keyword.clone(), normalize(keyword)))
            .filter(|(_, pattern)| !pattern.is_empty())
            .unzip();
        let latin = patterns.iter().map(|p| is_latin_keyword(p)).collect();

        let automaton = match AhoCorasick::new(&patterns) {
            Ok(ac) => Some(ac),
            Err(e) => {
                warn!(error = %e, "Failed to build keyword automaton, using linear scan");
                None
            }
        };

        Self {
            keywords,
            patterns,
            latin,
            automaton,
        }
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Keywords found in `haystack`, in list order
    pub fn find<'a>(&'a self, haystack: &str) -> impl Iterator<Item = &'a str> + 'a {
        let hits = self.hits(haystack);
        self.keywords
            .iter()
            .zip(hits)
            .filter_map(|(keyword, hit)| hit.then_some(keyword.as_str()))
    }

    fn hits(&self, haystack: &str) -> Vec<bool> {
        let mut hits = vec![false; self.keywords.len()];
        if self.keywords.is_empty() || haystack.is_empty() {
            return hits;
        }

        match &self.automaton {
            Some(ac) => {
                for m in ac.find_overlapping_iter(haystack) {
                    let id = m.pattern().as_usize();
                    if !hits[id] && self.accepts(id, haystack, m.start(), m.end()) {
                        hits[id] = true;
                    }
                }
            }
            None => {
                for (id, pattern) in self.patterns.iter().enumerate() {
                    hits[id] = haystack
                        .match_indices(pattern.as_str())
                        .any(|(start, found)| self.accepts(id, haystack, start, start + found.len()));
                }
            }
        }

        hits
    }

    fn accepts(&self, id: usize, haystack: &str, start: usize, end: usize) -> bool {
        !self.latin[id] || (is_boundary(haystack, start) && is_boundary(haystack, end))
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// ASCII word boundary at byte offset `pos`
fn is_boundary(haystack: &str, pos: usize) -> bool {
    let before = haystack[..pos].chars().next_back().is_some_and(is_word_char);
    let after = haystack[pos..].chars().next().is_some_and(is_word_char);
    before != after
}

/// Scan normalized text against every listed language.
///
/// Languages are visited in the given order and tiers from high to low;
/// every hit is reported, including lower-tier hits under a higher one.
/// Languages without a list in the store are skipped.
pub fn match_text(
    normalized: &str,
    store: &KeywordStore,
    languages: &[LanguageCode],
) -> Vec<Match> {
    let mut matches = Vec::new();
    if normalized.is_empty() {
        return matches;
    }

    for &language in languages {
        for severity in Severity::DESCENDING {
            let Some(index) = store.index(language, severity) else {
                continue;
            };
            matches.extend(
                index
                    .find(normalized)
                    .map(|keyword| Match::new(severity, keyword, language)),
            );
        }
    }

    matches
}
