//! Reduce keyword matches to a single verdict

use chatguard_core::{ClassificationResult, FlaggedWord, LanguageCode, Match};
use std::collections::BTreeSet;

/// Build the classification for a set of matches.
///
/// `hints` (script sniffing) only label the result when nothing matched;
/// they never change `is_flagged` or `severity`.
pub fn resolve(matches: Vec<Match>, hints: &BTreeSet<LanguageCode>) -> ClassificationResult {
    let severity = matches.iter().map(|m| m.severity).max();

    let detected_languages = if matches.is_empty() {
        let mut fallback = hints.clone();
        fallback.insert(LanguageCode::Unknown);
        fallback
    } else {
        matches.iter().map(|m| m.language).collect()
    };

    let flagged_words = matches
        .iter()
        .map(|m| FlaggedWord {
            word: m.keyword.clone(),
            language: m.language,
            meaning: None,
        })
        .collect::<Vec<_>>();

    ClassificationResult {
        is_flagged: !flagged_words.is_empty(),
        severity,
        detected_languages,
        flagged_words,
        matches,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatguard_core::Severity;

    #[test]
    fn test_no_matches() {
        let result = resolve(Vec::new(), &BTreeSet::new());
        assert!(!result.is_flagged);
        assert_eq!(result.severity, None);
        assert!(result.flagged_words.is_empty());
        assert_eq!(
            result.detected_languages.into_iter().collect::<Vec<_>>(),
            vec![LanguageCode::Unknown]
        );
    }

    #[test]
    fn test_hints_only_used_without_matches() {
        let hints = BTreeSet::from([LanguageCode::Tamil]);

        let clean = resolve(Vec::new(), &hints);
        assert!(clean.detected_languages.contains(&LanguageCode::Tamil));
        assert!(!clean.is_flagged);

        let flagged = resolve(
            vec![Match::new(Severity::Low, "nerd", LanguageCode::English)],
            &hints,
        );
        assert_eq!(
            flagged.detected_languages,
            BTreeSet::from([LanguageCode::English])
        );
    }

    #[test]
    fn test_highest_tier_wins() {
        let result = resolve(
            vec![
                Match::new(Severity::Low, "nerd", LanguageCode::English),
                Match::new(Severity::High, "maar dunga", LanguageCode::Hindi),
                Match::new(Severity::Medium, "idiot", LanguageCode::English),
            ],
            &BTreeSet::new(),
        );

        assert!(result.is_flagged);
        assert_eq!(result.severity, Some(Severity::High));
        let words: Vec<_> = result.flagged_words.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(words, vec!["nerd", "maar dunga", "idiot"]);
    }
}
