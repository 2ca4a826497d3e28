//! Core types for ChatGuard

use crate::{Error, LanguageCode, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Severity tier of a keyword or a repetition pattern.
///
/// Ordering follows harmfulness: `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Tiers in matching order (most severe first)
    pub const DESCENDING: [Severity; 3] = [Self::High, Self::Medium, Self::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Parse a dataset severity label; anything unrecognized is medium.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "high" => Self::High,
            "low" => Self::Low,
            _ => Self::Medium,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One keyword hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// Tier of the list the keyword came from
    pub severity: Severity,

    /// Keyword as written in the list (not normalized)
    pub keyword: String,

    /// Language list the keyword belongs to
    pub language: LanguageCode,
}

impl Match {
    pub fn new(severity: Severity, keyword: impl Into<String>, language: LanguageCode) -> Self {
        Self {
            severity,
            keyword: keyword.into(),
            language,
        }
    }
}

/// A flagged word as reported to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlaggedWord {
    pub word: String,
    pub language: LanguageCode,

    /// English gloss, when the keyword store has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meaning: Option<String>,
}

/// Outcome of classifying one message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// True iff at least one keyword matched
    pub is_flagged: bool,

    /// Highest matched tier, `None` when not flagged
    pub severity: Option<Severity>,

    /// Languages of all matches, or best-effort script hints when nothing matched
    pub detected_languages: BTreeSet<LanguageCode>,

    /// Matched keywords in discovery order
    pub flagged_words: Vec<FlaggedWord>,

    /// Every match, including lower tiers under a higher maximum
    pub matches: Vec<Match>,
}

impl ClassificationResult {
    /// Result for empty input: not flagged, no languages, no words
    pub fn clean() -> Self {
        Self {
            is_flagged: false,
            severity: None,
            detected_languages: BTreeSet::new(),
            flagged_words: Vec::new(),
            matches: Vec::new(),
        }
    }

    /// First detected language, or `und`
    pub fn primary_language(&self) -> LanguageCode {
        self.detected_languages
            .iter()
            .next()
            .copied()
            .unwrap_or(LanguageCode::Unknown)
    }
}

/// Identifier of a chat user
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

/// Identifier of a group conversation
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

macro_rules! string_id {
    ($name:ident) => {
        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(UserId);
string_id!(GroupId);

/// Where a message was sent: a single recipient or a group.
///
/// The variant tag keeps a user and a group with the same id from ever
/// sharing repetition state.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ConversationTarget {
    Direct(UserId),
    Group(GroupId),
}

impl ConversationTarget {
    pub fn direct(id: impl Into<UserId>) -> Self {
        Self::Direct(id.into())
    }

    pub fn group(id: impl Into<GroupId>) -> Self {
        Self::Group(id.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Direct(id) => id.is_empty(),
            Self::Group(id) => id.is_empty(),
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }
}

impl fmt::Display for ConversationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct(id) => write!(f, "user:{}", id),
            Self::Group(id) => write!(f, "group:{}", id),
        }
    }
}

/// Composite key for per-conversation repetition state
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RepetitionKey {
    sender: UserId,
    target: ConversationTarget,
}

impl RepetitionKey {
    /// Build a key, rejecting an absent sender or target
    pub fn new(sender: impl Into<UserId>, target: ConversationTarget) -> Result<Self> {
        let sender = sender.into();
        match (sender.is_empty(), target.is_empty()) {
            (true, true) => Err(Error::invalid_key("sender and target are both missing")),
            (true, false) => Err(Error::invalid_key(format!("sender missing for {}", target))),
            (false, true) => Err(Error::invalid_key(format!("target missing for sender {}", sender))),
            (false, false) => Ok(Self { sender, target }),
        }
    }

    pub fn sender(&self) -> &UserId {
        &self.sender
    }

    pub fn target(&self) -> &ConversationTarget {
        &self.target
    }
}

impl fmt::Display for RepetitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.sender, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert_eq!(Severity::DESCENDING.iter().max(), Some(&Severity::High));
    }

    #[test]
    fn test_severity_from_label() {
        assert_eq!(Severity::from_label(" HIGH "), Severity::High);
        assert_eq!(Severity::from_label("low"), Severity::Low);
        assert_eq!(Severity::from_label("moderate"), Severity::Medium);
        assert_eq!(Severity::from_label(""), Severity::Medium);
    }

    #[test]
    fn test_direct_and_group_keys_never_collide() {
        let direct = RepetitionKey::new("alice", ConversationTarget::direct("42")).unwrap();
        let group = RepetitionKey::new("alice", ConversationTarget::group("42")).unwrap();
        assert_ne!(direct, group);
    }

    #[test]
    fn test_invalid_keys() {
        assert!(matches!(
            RepetitionKey::new("", ConversationTarget::direct("")),
            Err(Error::InvalidKey(_))
        ));
        assert!(RepetitionKey::new("  ", ConversationTarget::group("g1")).is_err());
        assert!(RepetitionKey::new("alice", ConversationTarget::direct("")).is_err());
    }

    #[test]
    fn test_clean_result() {
        let result = ClassificationResult::clean();
        assert!(!result.is_flagged);
        assert!(result.severity.is_none());
        assert!(result.flagged_words.is_empty());
        assert_eq!(result.primary_language(), LanguageCode::Unknown);
    }

    #[test]
    fn test_target_serialization() {
        let json = serde_json::to_string(&ConversationTarget::group("g7")).unwrap();
        assert_eq!(json, r#"{"kind":"group","id":"g7"}"#);
    }
}
