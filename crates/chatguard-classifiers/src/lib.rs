//! ChatGuard Classifiers
//!
//! Deterministic, rule-based abuse classification for chat messages.
//!
//! The pipeline is:
//! - [`normalize`](normalize::normalize): lower-case, strip emoji and
//!   punctuation, collapse stretched letters
//! - [`KeywordStore`]: per-language `high`/`medium`/`low` keyword lists,
//!   loaded once with an explicit load status per language
//! - [`match_text`](matcher::match_text): whole-word matching for Latin
//!   keywords, substring matching for other scripts
//! - [`resolve`](severity::resolve): reduce matches to one verdict
//!
//! [`KeywordClassifier`] wires these together behind the [`Classifier`] trait.

pub mod classifier;
pub mod config;
pub mod keywords;
pub mod lists;
pub mod matcher;
pub mod normalize;
pub mod script;
pub mod severity;

pub use classifier::{Classifier, KeywordClassifier};
pub use config::ClassifierConfig;
pub use keywords::{KeywordList, KeywordStore, KeywordStoreBuilder, ListStatus};
pub use lists::{ImportReport, ListSummary};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{Classifier, KeywordClassifier};
    pub use crate::keywords::{KeywordList, KeywordStore, ListStatus};
    pub use crate::normalize::normalize;
}
