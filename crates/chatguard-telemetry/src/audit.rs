//! Hash-chained audit trail of moderation events

use chatguard_core::Severity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::VecDeque;
use tracing::debug;
use uuid::Uuid;

/// Audit trail with hash-chained events for tamper detection.
///
/// Events can be drained for external persistence; the chain continues
/// across drains, anchored on the hash of the last drained event. A bounded
/// trail evicts its oldest events the same way once it is full.
#[derive(Debug, Default)]
pub struct AuditTrail {
    events: VecDeque<AuditEvent>,
    chain_hash: Option<String>,
    anchor: Option<String>,
    max_events: Option<usize>,
}

impl AuditTrail {
    /// Create a new unbounded audit trail
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a trail retaining at most `max_events` events
    pub fn bounded(max_events: usize) -> Self {
        Self {
            max_events: Some(max_events.max(1)),
            ..Self::default()
        }
    }

    /// Add an event to the audit trail
    pub fn add_event(&mut self, event: AuditEvent) {
        let mut event = event;
        event.previous_hash = self.chain_hash.clone();

        let hash = compute_hash(&event);
        event.hash = Some(hash.clone());

        self.chain_hash = Some(hash);
        self.events.push_back(event);

        if let Some(max) = self.max_events {
            while self.events.len() > max {
                if let Some(evicted) = self.events.pop_front() {
                    self.anchor = evicted.hash;
                }
            }
        }
    }

    /// Verify the integrity of the retained events
    pub fn verify(&self) -> bool {
        let mut prev_hash = self.anchor.clone();

        for event in &self.events {
            if event.previous_hash != prev_hash {
                return false;
            }

            let computed_hash = compute_hash(event);
            if event.hash.as_ref() != Some(&computed_hash) {
                return false;
            }

            prev_hash = event.hash.clone();
        }

        true
    }

    /// Retained events, oldest first
    pub fn events(&self) -> impl ExactSizeIterator<Item = &AuditEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Hand retained events to the caller, keeping the chain intact
    pub fn drain(&mut self) -> Vec<AuditEvent> {
        self.anchor = self.chain_hash.clone();
        let events: Vec<_> = std::mem::take(&mut self.events).into();
        debug!(count = events.len(), "Drained audit events");
        events
    }
}

/// Hash an event's content together with its predecessor's hash
fn compute_hash(event: &AuditEvent) -> String {
    let mut hasher = Sha256::new();

    hasher.update(event.id.as_bytes());
    hasher.update(event.kind.as_str().as_bytes());
    if let Some(ref subject) = event.subject {
        hasher.update(subject.as_bytes());
    }
    if let Some(ref data) = event.data {
        hasher.update(data.as_bytes());
    }
    hasher.update(event.timestamp.to_rfc3339().as_bytes());
    hasher.update(event.severity.as_str().as_bytes());
    if let Some(ref prev) = event.previous_hash {
        hasher.update(prev.as_bytes());
    }

    format!("{:x}", hasher.finalize())
}

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventKind {
    /// A flagged message was counted toward repetition
    FlagRecorded,
    /// A notification was withheld because the pair is trusted
    NotificationSuppressed,
    /// The sender was warned privately
    SenderWarned,
    /// A moderator alert was raised
    ModeratorAlert,
    /// A repetition record was discarded
    RepetitionReset,
    /// A moderator acted on an alert
    AlertReviewed,
}

impl AuditEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FlagRecorded => "flag_recorded",
            Self::NotificationSuppressed => "notification_suppressed",
            Self::SenderWarned => "sender_warned",
            Self::ModeratorAlert => "moderator_alert",
            Self::RepetitionReset => "repetition_reset",
            Self::AlertReviewed => "alert_reviewed",
        }
    }
}

/// A single audit event in the trail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: Uuid,

    pub kind: AuditEventKind,

    /// Conversation the event concerns, e.g. `alice -> group:g1`
    pub subject: Option<String>,

    /// Event data (JSON serialized)
    pub data: Option<String>,

    pub timestamp: DateTime<Utc>,

    pub severity: AuditSeverity,

    /// Hash of this event
    pub hash: Option<String>,

    /// Hash of previous event (for chaining)
    pub previous_hash: Option<String>,
}

impl AuditEvent {
    /// Create a new audit event stamped now
    pub fn new(kind: AuditEventKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            subject: None,
            data: None,
            timestamp: Utc::now(),
            severity: AuditSeverity::Info,
            hash: None,
            previous_hash: None,
        }
    }

    /// Set the conversation this event concerns
    pub fn with_subject(mut self, subject: impl ToString) -> Self {
        self.subject = Some(subject.to_string());
        self
    }

    /// Set event data
    pub fn with_data(mut self, data: impl Serialize) -> Self {
        self.data = serde_json::to_string(&data).ok();
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Set severity
    pub fn with_severity(mut self, severity: AuditSeverity) -> Self {
        self.severity = severity;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditSeverity {
    Info,
    Warning,
    High,
    Critical,
}

impl AuditSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl From<Severity> for AuditSeverity {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Low => Self::Info,
            Severity::Medium => Self::Warning,
            Severity::High => Self::High,
        }
    }
}
