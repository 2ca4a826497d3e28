//! Classifier trait and the keyword-list classifier

use crate::keywords::KeywordStore;
use crate::matcher::match_text;
use crate::normalize::normalize;
use crate::script::script_hints;
use crate::severity::resolve;
use chatguard_core::{ClassificationResult, LanguageCode};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Trait for all message classifiers
pub trait Classifier: Send + Sync {
    /// Classify the given text. Never fails: empty input is simply clean.
    fn classify(&self, text: &str) -> ClassificationResult;

    /// Get the classifier name
    fn name(&self) -> &str;
}

/// Rule-based classifier over per-language keyword lists
pub struct KeywordClassifier {
    name: String,
    store: Arc<KeywordStore>,
    languages: Vec<LanguageCode>,
}

impl KeywordClassifier {
    /// Create a classifier matching every supported language
    pub fn new(store: Arc<KeywordStore>) -> Self {
        Self {
            name: "keywords".to_string(),
            store,
            languages: LanguageCode::SUPPORTED.to_vec(),
        }
    }

    /// Restrict matching to the given languages (kept in the given order)
    pub fn with_languages(mut self, languages: impl IntoIterator<Item = LanguageCode>) -> Self {
        self.languages = languages
            .into_iter()
            .filter(LanguageCode::is_supported)
            .collect();
        self
    }

    /// The backing keyword store
    pub fn store(&self) -> &KeywordStore {
        &self.store
    }

    /// Languages this classifier matches against
    pub fn languages(&self) -> &[LanguageCode] {
        &self.languages
    }
}

impl Classifier for KeywordClassifier {
    fn classify(&self, text: &str) -> ClassificationResult {
        if text.trim().is_empty() {
            return ClassificationResult::clean();
        }

        let start = Instant::now();
        let normalized = normalize(text);
        let matches = match_text(&normalized, &self.store, &self.languages);
        let mut result = resolve(matches, &script_hints(text));

        for word in &mut result.flagged_words {
            word.meaning = self
                .store
                .meaning(word.language, &word.word)
                .map(String::from);
        }

        debug!(
            flagged = result.is_flagged,
            severity = ?result.severity,
            matches = result.matches.len(),
            latency_us = start.elapsed().as_micros() as u64,
            "Classified message"
        );

        result
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatguard_core::Severity;

    fn classifier() -> KeywordClassifier {
        let store = KeywordStore::builder()
            .keywords(LanguageCode::English, Severity::High, ["i will kill you"])
            .keywords(LanguageCode::English, Severity::Medium, ["idiot", "fat"])
            .keywords(LanguageCode::English, Severity::Low, ["nerd"])
            .keywords(LanguageCode::Hindi, Severity::Medium, ["pagal", "पागल"])
            .meaning(LanguageCode::Hindi, "pagal", "crazy")
            .build();
        KeywordClassifier::new(Arc::new(store))
    }

    #[test]
    fn test_clean_message() {
        let result = classifier().classify("See you at lunch, father says hi");
        assert!(!result.is_flagged);
        assert_eq!(result.severity, None);
        assert!(result.detected_languages.contains(&LanguageCode::Unknown));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(classifier().classify(""), ClassificationResult::clean());
        assert_eq!(classifier().classify("   "), ClassificationResult::clean());
    }

    #[test]
    fn test_whole_word_fat() {
        let c = classifier();
        assert!(!c.classify("father").is_flagged);
        let result = c.classify("you are fat");
        assert!(result.is_flagged);
        assert_eq!(result.severity, Some(Severity::Medium));
    }

    #[test]
    fn test_punctuation_around_keyword() {
        let result = classifier().classify("I.D.I.O.T? no, i-d-i-o-t... just idiot!!!");
        assert!(result.is_flagged);
        assert_eq!(result.flagged_words[0].word, "idiot");
    }

    #[test]
    fn test_meaning_attached() {
        let result = classifier().classify("tu pagal hai");
        assert_eq!(result.flagged_words.len(), 1);
        assert_eq!(result.flagged_words[0].meaning.as_deref(), Some("crazy"));
        assert_eq!(result.primary_language(), LanguageCode::Hindi);
    }

    #[test]
    fn test_script_hint_for_unmatched_devanagari() {
        let result = classifier().classify("नमस्ते दोस्त");
        assert!(!result.is_flagged);
        assert!(result.detected_languages.contains(&LanguageCode::Hindi));
    }

    #[test]
    fn test_language_restriction() {
        let c = classifier().with_languages([LanguageCode::English, LanguageCode::Unknown]);
        assert_eq!(c.languages(), &[LanguageCode::English]);
        assert!(!c.classify("tu pagal hai").is_flagged);
    }
}
