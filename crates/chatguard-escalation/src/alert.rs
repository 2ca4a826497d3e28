//! Moderator alerts and review actions

use chatguard_core::{Error, FlaggedWord, RepetitionKey, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::repetition::EscalationDecision;

/// Review state of an alert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    #[default]
    Pending,
    Approved,
    Dismissed,
    Escalated,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Dismissed => "dismissed",
            Self::Escalated => "escalated",
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a moderator decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    /// The alert was justified
    Approve,
    /// False positive or a joke; the sender's repetition record is cleared
    Dismiss,
    /// Needs attention beyond the moderator
    Escalate,
}

impl ReviewAction {
    /// Status an alert takes after this action
    pub fn status(&self) -> AlertStatus {
        match self {
            Self::Approve => AlertStatus::Approved,
            Self::Dismiss => AlertStatus::Dismissed,
            Self::Escalate => AlertStatus::Escalated,
        }
    }
}

impl FromStr for ReviewAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "approve" => Ok(Self::Approve),
            "dismiss" => Ok(Self::Dismiss),
            "escalate" => Ok(Self::Escalate),
            other => Err(Error::config(format!("invalid review action: {other}"))),
        }
    }
}

/// Result of applying a review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReviewOutcome {
    pub previous: AlertStatus,
    pub status: AlertStatus,

    /// The sender should be told the result
    pub notify_sender: bool,
}

/// An alert raised for moderators when a pair reaches the high tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeratorAlert {
    pub id: Uuid,

    /// Host application's id for the triggering message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,

    pub key: RepetitionKey,

    pub text: String,

    /// Escalation tier at the time of the alert
    pub severity: Severity,

    /// Severity of the triggering message alone
    pub message_severity: Severity,

    pub repetition_count: usize,

    pub flagged_words: Vec<FlaggedWord>,

    pub status: AlertStatus,

    pub created_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl ModeratorAlert {
    /// Draft a pending alert for `key`
    pub fn new(
        key: RepetitionKey,
        text: impl Into<String>,
        message_severity: Severity,
        decision: &EscalationDecision,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            message_id: None,
            key,
            text: text.into(),
            severity: decision.tier,
            message_severity,
            repetition_count: decision.repetition_count,
            flagged_words: Vec::new(),
            status: AlertStatus::Pending,
            created_at,
            reviewed_at: None,
        }
    }

    pub fn with_message_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = Some(message_id.into());
        self
    }

    pub fn with_flagged_words(mut self, words: Vec<FlaggedWord>) -> Self {
        self.flagged_words = words;
        self
    }

    pub fn is_pending(&self) -> bool {
        self.status == AlertStatus::Pending
    }

    /// Apply a review. Any status can be revised by a later review.
    pub fn apply(&mut self, action: ReviewAction, at: DateTime<Utc>) -> ReviewOutcome {
        let previous = self.status;
        self.status = action.status();
        self.reviewed_at = Some(at);

        ReviewOutcome {
            previous,
            status: self.status,
            notify_sender: matches!(self.status, AlertStatus::Approved | AlertStatus::Escalated),
        }
    }
}
