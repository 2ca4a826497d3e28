//! Mock interaction history for testing
//!
//! Configurable in-memory relationship lists and message logs, with
//! switchable failures and call counters for asserting lookup behaviour.

#![allow(dead_code)]

use async_trait::async_trait;
use chatguard_core::{ConversationTarget, Error, Result, UserId};
use chatguard_escalation::InteractionHistory;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

/// One logged message
#[derive(Debug, Clone)]
struct LoggedMessage {
    sender: UserId,
    target: ConversationTarget,
    sent_at: DateTime<Utc>,
}

/// In-memory history source
#[derive(Default)]
pub struct MockHistory {
    contacts: RwLock<HashMap<UserId, HashSet<UserId>>>,
    messages: RwLock<Vec<LoggedMessage>>,
    fail_contacts: AtomicBool,
    fail_counts: AtomicBool,
    simulated_latency: Option<Duration>,
    contact_calls: AtomicU32,
    count_calls: AtomicU32,
}

impl MockHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `contact` on `user`'s relationship list
    pub fn with_contact(self, user: &str, contact: &str) -> Self {
        self.contacts
            .write()
            .entry(UserId::from(user))
            .or_default()
            .insert(UserId::from(contact));
        self
    }

    /// Log `count` messages from `sender` to `target` at `sent_at`
    pub fn with_messages(
        self,
        sender: &str,
        target: ConversationTarget,
        count: usize,
        sent_at: DateTime<Utc>,
    ) -> Self {
        let mut messages = self.messages.write();
        for _ in 0..count {
            messages.push(LoggedMessage {
                sender: UserId::from(sender),
                target: target.clone(),
                sent_at,
            });
        }
        drop(messages);
        self
    }

    /// Set simulated latency for every lookup
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.simulated_latency = Some(latency);
        self
    }

    pub fn fail_contacts(&self, fail: bool) {
        self.fail_contacts.store(fail, Ordering::Relaxed);
    }

    pub fn fail_counts(&self, fail: bool) {
        self.fail_counts.store(fail, Ordering::Relaxed);
    }

    pub fn contact_calls(&self) -> u32 {
        self.contact_calls.load(Ordering::Relaxed)
    }

    pub fn count_calls(&self) -> u32 {
        self.count_calls.load(Ordering::Relaxed)
    }

    async fn delay(&self) {
        if let Some(latency) = self.simulated_latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl InteractionHistory for MockHistory {
    async fn trusted_contacts(&self, user: &UserId) -> Result<HashSet<UserId>> {
        self.contact_calls.fetch_add(1, Ordering::Relaxed);
        self.delay().await;

        if self.fail_contacts.load(Ordering::Relaxed) {
            return Err(Error::lookup("relationship store unavailable"));
        }
        Ok(self.contacts.read().get(user).cloned().unwrap_or_default())
    }

    async fn count_messages_between(
        &self,
        sender: &UserId,
        target: &ConversationTarget,
        since: DateTime<Utc>,
    ) -> Result<u64> {
        self.count_calls.fetch_add(1, Ordering::Relaxed);
        self.delay().await;

        if self.fail_counts.load(Ordering::Relaxed) {
            return Err(Error::lookup("message store unavailable"));
        }

        // Direct conversations count both directions
        let reverse = match target {
            ConversationTarget::Direct(recipient) => {
                Some((recipient.clone(), ConversationTarget::Direct(sender.clone())))
            }
            ConversationTarget::Group(_) => None,
        };

        let count = self
            .messages
            .read()
            .iter()
            .filter(|m| m.sent_at >= since)
            .filter(|m| {
                (&m.sender == sender && &m.target == target)
                    || reverse
                        .as_ref()
                        .is_some_and(|(s, t)| &m.sender == s && &m.target == t)
            })
            .count();
        Ok(count as u64)
    }
}
