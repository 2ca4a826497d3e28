//! Trusted-pair evaluation
//!
//! A pair is trusted when the target is on the sender's relationship list,
//! or when the two have exchanged at least `min_messages` messages in the
//! trailing window. Trust only ever suppresses notifications; flags are
//! still recorded.

use async_trait::async_trait;
use chatguard_core::{ConversationTarget, Result, UserId};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::TrustConfig;

/// Source of relationship and message-history data
#[async_trait]
pub trait InteractionHistory: Send + Sync {
    /// Users on `user`'s relationship list
    async fn trusted_contacts(&self, user: &UserId) -> Result<HashSet<UserId>>;

    /// Messages exchanged between `sender` and `target` since `since`, in
    /// both directions for direct conversations
    async fn count_messages_between(
        &self,
        sender: &UserId,
        target: &ConversationTarget,
        since: DateTime<Utc>,
    ) -> Result<u64>;
}

/// History source with no relationships and no messages; nobody is trusted
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHistory;

#[async_trait]
impl InteractionHistory for NoHistory {
    async fn trusted_contacts(&self, _user: &UserId) -> Result<HashSet<UserId>> {
        Ok(HashSet::new())
    }

    async fn count_messages_between(
        &self,
        _sender: &UserId,
        _target: &ConversationTarget,
        _since: DateTime<Utc>,
    ) -> Result<u64> {
        Ok(0)
    }
}

/// Why a pair was or was not trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "basis", rename_all = "snake_case")]
pub enum TrustBasis {
    /// Target is on the sender's relationship list
    Relationship,
    /// Enough recent messages between the pair
    History { messages: u64 },
    /// Lookups succeeded but neither condition held
    Insufficient { messages: u64 },
    /// Sender or target id was empty
    Anonymous,
    /// The history lookup failed
    LookupFailed,
}

/// Outcome of a trust check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrustAssessment {
    pub trusted: bool,

    #[serde(flatten)]
    pub basis: TrustBasis,

    /// Collaborator calls that failed while deciding
    pub lookup_failures: u8,
}

impl TrustAssessment {
    fn new(basis: TrustBasis, lookup_failures: u8) -> Self {
        let trusted = matches!(basis, TrustBasis::Relationship | TrustBasis::History { .. });
        Self {
            trusted,
            basis,
            lookup_failures,
        }
    }
}

/// Decides whether a sender/target pair is trusted
pub struct TrustEvaluator {
    history: Arc<dyn InteractionHistory>,
    window: Duration,
    min_messages: u64,
}

impl TrustEvaluator {
    pub fn new(history: Arc<dyn InteractionHistory>, config: &TrustConfig) -> Self {
        Self {
            history,
            window: config.window(),
            min_messages: config.min_messages,
        }
    }

    /// Assess the pair as of `now`.
    ///
    /// A failed relationship lookup falls through to the history check; a
    /// failed history lookup means not trusted.
    pub async fn assess(
        &self,
        sender: &UserId,
        target: &ConversationTarget,
        now: DateTime<Utc>,
    ) -> TrustAssessment {
        if sender.is_empty() || target.is_empty() {
            return TrustAssessment::new(TrustBasis::Anonymous, 0);
        }

        let mut failures = 0u8;

        // Group ids never appear on a relationship list
        if let ConversationTarget::Direct(recipient) = target {
            match self.history.trusted_contacts(sender).await {
                Ok(contacts) if contacts.contains(recipient) => {
                    debug!(sender = %sender, target = %target, "Trusted by relationship");
                    return TrustAssessment::new(TrustBasis::Relationship, failures);
                }
                Ok(_) => {}
                Err(e) => {
                    failures += 1;
                    warn!(sender = %sender, error = %e, "Relationship lookup failed, checking history");
                }
            }
        }

        let since = now.checked_sub_signed(self.window).unwrap_or(DateTime::<Utc>::MIN_UTC);
        let basis = match self.history.count_messages_between(sender, target, since).await {
            Ok(messages) if messages >= self.min_messages => TrustBasis::History { messages },
            Ok(messages) => TrustBasis::Insufficient { messages },
            Err(e) => {
                failures += 1;
                warn!(sender = %sender, target = %target, error = %e, "History lookup failed, treating pair as untrusted");
                TrustBasis::LookupFailed
            }
        };

        let assessment = TrustAssessment::new(basis, failures);
        debug!(
            sender = %sender,
            target = %target,
            trusted = assessment.trusted,
            "Trust evaluated"
        );
        assessment
    }

    /// Whether the pair is trusted as of `now`
    pub async fn is_trusted(
        &self,
        sender: &UserId,
        target: &ConversationTarget,
        now: DateTime<Utc>,
    ) -> bool {
        self.assess(sender, target, now).await.trusted
    }
}
