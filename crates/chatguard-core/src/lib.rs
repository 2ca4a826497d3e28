//! ChatGuard Core
//!
//! Core types and error handling shared across ChatGuard components.
//!
//! This crate provides:
//! - Language codes for the supported keyword lists
//! - Classification results, severity tiers, and matches
//! - Strongly typed conversation identities and repetition keys
//! - Error types and result handling

pub mod error;
pub mod language;
pub mod types;

pub use error::{Error, Result};
pub use language::LanguageCode;
pub use types::{
    ClassificationResult, ConversationTarget, FlaggedWord, GroupId, Match, RepetitionKey,
    Severity, UserId,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::language::LanguageCode;
    pub use crate::types::{
        ClassificationResult, ConversationTarget, GroupId, RepetitionKey, Severity, UserId,
    };
}
