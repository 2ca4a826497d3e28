//! Per-language keyword lists and the store that serves them
//!
//! Lists live in a directory as `<code>.json` files holding three string
//! arrays (`high`, `medium`, `low`). The store loads every supported language
//! once and is immutable afterwards, so it can be shared across threads
//! without locking.

use crate::matcher::TierIndex;
use crate::normalize::normalize;
use chatguard_core::{LanguageCode, Result, Severity};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{info, warn};

/// File name of the optional keyword gloss table inside a lists directory
pub const MEANINGS_FILE: &str = "meanings.json";

/// Keyword gloss table: language code -> lowercase keyword -> English meaning
pub type Meanings = HashMap<LanguageCode, HashMap<String, String>>;

/// Keywords for one language, split by severity tier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordList {
    #[serde(default)]
    pub high: Vec<String>,

    #[serde(default)]
    pub medium: Vec<String>,

    #[serde(default)]
    pub low: Vec<String>,
}

static EMPTY_LIST: KeywordList = KeywordList {
    high: Vec::new(),
    medium: Vec::new(),
    low: Vec::new(),
};

impl KeywordList {
    /// Parse a list from its JSON form
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Keywords of one tier
    pub fn tier(&self, severity: Severity) -> &[String] {
        match severity {
            Severity::High => &self.high,
            Severity::Medium => &self.medium,
            Severity::Low => &self.low,
        }
    }

    pub fn tier_mut(&mut self, severity: Severity) -> &mut Vec<String> {
        match severity {
            Severity::High => &mut self.high,
            Severity::Medium => &mut self.medium,
            Severity::Low => &mut self.low,
        }
    }

    /// Total keyword count across tiers
    pub fn len(&self) -> usize {
        self.high.len() + self.medium.len() + self.low.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make tiers mutually exclusive by normalized form.
    ///
    /// A keyword listed in several tiers keeps its highest one; blank
    /// keywords and repeats within a tier are dropped. Returns what was removed.
    pub fn enforce_exclusive_tiers(&mut self) -> Vec<(String, Severity)> {
        let mut seen = HashSet::new();
        let mut removed = Vec::new();

        for severity in Severity::DESCENDING {
            self.tier_mut(severity).retain(|keyword| {
                let normalized = normalize(keyword);
                if !normalized.is_empty() && seen.insert(normalized) {
                    true
                } else {
                    removed.push((keyword.clone(), severity));
                    false
                }
            });
        }

        removed
    }
}

/// Load state of one language's list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ListStatus {
    /// List parsed and contains keywords
    Loaded { keywords: usize },

    /// List parsed but has no keywords
    Empty,

    /// No list file for this language
    Missing,

    /// List file could not be read or parsed
    Malformed { reason: String },
}

impl ListStatus {
    /// True when the language matches nothing because of a setup problem
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Missing | Self::Malformed { .. })
    }
}

#[derive(Debug)]
struct LanguageEntry {
    list: KeywordList,
    status: ListStatus,
    tiers: [TierIndex; 3],
}

impl LanguageEntry {
    fn new(language: LanguageCode, mut list: KeywordList, status: Option<ListStatus>) -> Self {
        for (keyword, severity) in list.enforce_exclusive_tiers() {
            warn!(
                language = %language,
                keyword = %keyword,
                tier = %severity,
                "Dropping duplicate or blank keyword"
            );
        }

        let status = status.unwrap_or_else(|| match list.len() {
            0 => ListStatus::Empty,
            keywords => ListStatus::Loaded { keywords },
        });

        let tiers = Severity::DESCENDING.map(|severity| TierIndex::build(list.tier(severity)));

        Self { list, status, tiers }
    }

    fn degraded(language: LanguageCode, status: ListStatus) -> Self {
        Self::new(language, KeywordList::default(), Some(status))
    }

    fn index(&self, severity: Severity) -> &TierIndex {
        let slot = match severity {
            Severity::High => 0,
            Severity::Medium => 1,
            Severity::Low => 2,
        };
        &self.tiers[slot]
    }
}

/// Immutable store of keyword lists for every supported language
#[derive(Debug)]
pub struct KeywordStore {
    entries: HashMap<LanguageCode, LanguageEntry>,
    meanings: Meanings,
}

impl KeywordStore {
    /// Start building a store in memory
    pub fn builder() -> KeywordStoreBuilder {
        KeywordStoreBuilder::default()
    }

    /// A store where every language is missing
    pub fn empty() -> Self {
        Self::builder().build()
    }

    /// Load every supported language from `dir`.
    ///
    /// Never fails: unreadable or malformed files become empty lists with a
    /// degraded [`ListStatus`]. Glosses are read from `meanings.json` in the
    /// same directory when present.
    pub fn load_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let meanings_path = dir.join(MEANINGS_FILE);
        let meanings = if meanings_path.exists() {
            load_meanings(&meanings_path)
        } else {
            Meanings::new()
        };

        let mut entries = HashMap::new();
        for language in LanguageCode::SUPPORTED {
            let path = dir.join(format!("{}.json", language.code()));
            entries.insert(language, load_entry(language, &path));
        }

        let store = Self { entries, meanings };
        let degraded = store.statuses().filter(|(_, s)| s.is_degraded()).count();
        info!(
            dir = %dir.display(),
            keywords = store.keyword_count(),
            degraded,
            "Keyword store loaded"
        );
        store
    }

    /// The list for `language`; empty for unsupported or missing languages
    pub fn load_list(&self, language: LanguageCode) -> &KeywordList {
        self.entries
            .get(&language)
            .map(|entry| &entry.list)
            .unwrap_or(&EMPTY_LIST)
    }

    /// Load state of `language`
    pub fn status(&self, language: LanguageCode) -> ListStatus {
        self.entries
            .get(&language)
            .map(|entry| entry.status.clone())
            .unwrap_or(ListStatus::Missing)
    }

    /// Load state of every supported language, in matching order
    pub fn statuses(&self) -> impl Iterator<Item = (LanguageCode, ListStatus)> + '_ {
        LanguageCode::SUPPORTED
            .into_iter()
            .map(move |language| (language, self.status(language)))
    }

    /// English gloss for a keyword, if known
    pub fn meaning(&self, language: LanguageCode, keyword: &str) -> Option<&str> {
        self.meanings
            .get(&language)?
            .get(&keyword.to_lowercase())
            .map(String::as_str)
    }

    /// Replace the gloss table
    pub fn with_meanings(mut self, meanings: Meanings) -> Self {
        self.meanings = meanings;
        self
    }

    /// Total keywords across all languages
    pub fn keyword_count(&self) -> usize {
        self.entries.values().map(|entry| entry.list.len()).sum()
    }

    pub(crate) fn index(&self, language: LanguageCode, severity: Severity) -> Option<&TierIndex> {
        self.entries.get(&language).map(|entry| entry.index(severity))
    }
}

impl Default for KeywordStore {
    fn default() -> Self {
        Self::empty()
    }
}

/// Builder for in-memory stores
#[derive(Debug, Default)]
pub struct KeywordStoreBuilder {
    lists: HashMap<LanguageCode, KeywordList>,
    meanings: Meanings,
}

impl KeywordStoreBuilder {
    /// Set the list for a language
    pub fn list(mut self, language: LanguageCode, list: KeywordList) -> Self {
        self.lists.insert(language, list);
        self
    }

    /// Append keywords to one tier of a language
    pub fn keywords<I, S>(mut self, language: LanguageCode, severity: Severity, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lists
            .entry(language)
            .or_default()
            .tier_mut(severity)
            .extend(words.into_iter().map(Into::into));
        self
    }

    /// Add an English gloss
    pub fn meaning(
        mut self,
        language: LanguageCode,
        keyword: impl AsRef<str>,
        meaning: impl Into<String>,
    ) -> Self {
        self.meanings
            .entry(language)
            .or_default()
            .insert(keyword.as_ref().to_lowercase(), meaning.into());
        self
    }

    pub fn build(mut self) -> KeywordStore {
        let entries = LanguageCode::SUPPORTED
            .into_iter()
            .map(|language| {
                let entry = match self.lists.remove(&language) {
                    Some(list) => LanguageEntry::new(language, list, None),
                    None => LanguageEntry::degraded(language, ListStatus::Missing),
                };
                (language, entry)
            })
            .collect();

        KeywordStore {
            entries,
            meanings: self.meanings,
        }
    }
}

fn load_entry(language: LanguageCode, path: &Path) -> LanguageEntry {
    if !path.exists() {
        warn!(language = %language, path = %path.display(), "Keyword list missing");
        return LanguageEntry::degraded(language, ListStatus::Missing);
    }

    let parsed = std::fs::read_to_string(path)
        .map_err(chatguard_core::Error::from)
        .and_then(|content| KeywordList::from_json(&content));

    match parsed {
        Ok(list) => LanguageEntry::new(language, list, None),
        Err(e) => {
            warn!(language = %language, path = %path.display(), error = %e, "Keyword list malformed");
            LanguageEntry::degraded(
                language,
                ListStatus::Malformed {
                    reason: e.to_string(),
                },
            )
        }
    }
}

/// Read a gloss table, skipping unknown language codes.
///
/// A malformed table is logged and treated as empty.
pub fn load_meanings(path: &Path) -> Meanings {
    let parsed = std::fs::read_to_string(path)
        .map_err(chatguard_core::Error::from)
        .and_then(|content| {
            Ok(serde_json::from_str::<HashMap<String, HashMap<String, String>>>(&content)?)
        });

    match parsed {
        Ok(raw) => raw
            .into_iter()
            .filter_map(|(code, words)| match code.parse::<LanguageCode>() {
                Ok(language) if language.is_supported() => Some((language, words)),
                _ => {
                    warn!(code = %code, "Ignoring meanings for unknown language");
                    None
                }
            })
            .collect(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Meanings file malformed");
            Meanings::new()
        }
    }
}
