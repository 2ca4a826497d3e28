//! Configuration for the keyword classifier

use crate::keywords::load_meanings;
use crate::{KeywordClassifier, KeywordStore};
use chatguard_core::LanguageCode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Where keyword lists come from and which languages to match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Directory holding `<code>.json` lists and `meanings.json`
    #[serde(default = "default_lists_dir")]
    pub lists_dir: PathBuf,

    /// Gloss table overriding `<lists_dir>/meanings.json`
    #[serde(default)]
    pub meanings_file: Option<PathBuf>,

    /// Languages to match, in order. Defaults to every supported language.
    #[serde(default)]
    pub languages: Option<Vec<LanguageCode>>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            lists_dir: default_lists_dir(),
            meanings_file: None,
            languages: None,
        }
    }
}

impl ClassifierConfig {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Load the keyword store described by this configuration
    pub fn load_store(&self) -> KeywordStore {
        let store = KeywordStore::load_dir(&self.lists_dir);
        match &self.meanings_file {
            Some(path) => store.with_meanings(load_meanings(path)),
            None => store,
        }
    }

    /// Build a classifier over a freshly loaded store
    pub fn build_classifier(&self) -> KeywordClassifier {
        let classifier = KeywordClassifier::new(Arc::new(self.load_store()));
        match &self.languages {
            Some(languages) => classifier.with_languages(languages.iter().copied()),
            None => classifier,
        }
    }
}

fn default_lists_dir() -> PathBuf {
    PathBuf::from("./bully_lists")
}
