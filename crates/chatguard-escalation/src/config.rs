//! Engine configuration

use chatguard_classifiers::ClassifierConfig;
use chatguard_core::{Error, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Top-level configuration for [`ModerationEngine`](crate::ModerationEngine)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Keyword lists and matched languages
    #[serde(flatten)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub repetition: RepetitionConfig,

    #[serde(default)]
    pub trust: TrustConfig,

    #[serde(default)]
    pub audit: AuditConfig,
}

impl EngineConfig {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load from `path`, falling back to defaults when the file is absent
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            info!(path = %path.display(), "Loading engine configuration");
            Self::from_file(path)
        } else {
            info!(path = %path.display(), "Configuration file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Reject settings the engine cannot honour
    pub fn validate(&self) -> Result<()> {
        let rep = &self.repetition;
        if rep.window_secs == 0 {
            return Err(Error::config("repetition.window_secs must be positive"));
        }
        if rep.medium_threshold == 0 || rep.medium_threshold > rep.high_threshold {
            return Err(Error::config(format!(
                "repetition thresholds must satisfy 0 < medium ({}) <= high ({})",
                rep.medium_threshold, rep.high_threshold
            )));
        }
        if self.trust.window_days == 0 {
            return Err(Error::config("trust.window_days must be positive"));
        }
        if self.audit.max_events == 0 {
            return Err(Error::config("audit.max_events must be positive"));
        }
        Ok(())
    }
}

/// Sliding-window escalation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepetitionConfig {
    /// Length of the sliding window in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Flags in window at which the tier becomes medium
    #[serde(default = "default_medium_threshold")]
    pub medium_threshold: usize,

    /// Flags in window at which the tier becomes high and moderators are alerted
    #[serde(default = "default_high_threshold")]
    pub high_threshold: usize,
}

impl RepetitionConfig {
    pub fn window(&self) -> Duration {
        let secs = i64::try_from(self.window_secs).unwrap_or(i64::MAX);
        Duration::seconds(secs.min(i64::MAX / 1000))
    }
}

impl Default for RepetitionConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            medium_threshold: default_medium_threshold(),
            high_threshold: default_high_threshold(),
        }
    }
}

/// Relationship and history thresholds for trusted pairs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustConfig {
    /// How far back message history counts
    #[serde(default = "default_window_days")]
    pub window_days: u32,

    /// Messages within the window needed to trust a pair
    #[serde(default = "default_min_messages")]
    pub min_messages: u64,
}

impl TrustConfig {
    pub fn window(&self) -> Duration {
        Duration::days(i64::from(self.window_days))
    }
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            min_messages: default_min_messages(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Record flags, suppressions, alerts and reviews in the audit trail
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Events retained in memory before the oldest are evicted
    #[serde(default = "default_max_events")]
    pub max_events: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_events: default_max_events(),
        }
    }
}

fn default_window_secs() -> u64 {
    600
}

fn default_medium_threshold() -> usize {
    3
}

fn default_high_threshold() -> usize {
    5
}

fn default_window_days() -> u32 {
    30
}

fn default_min_messages() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_max_events() -> usize {
    10_000
}
