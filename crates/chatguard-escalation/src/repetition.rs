//! Sliding-window repetition tracking
//!
//! Every flagged message from a sender to a target is timestamped. The
//! number of flags inside the trailing window decides the escalation tier:
//! below `medium_threshold` the tier is low, from `medium_threshold` it is
//! medium, and from `high_threshold` it is high and moderators are alerted.
//!
//! Records live in a sharded [`DashMap`]. Pruning and appending for one key
//! happen under that key's entry guard, so concurrent flags for the same
//! pair are never lost or double-counted.

use chatguard_core::{RepetitionKey, Severity};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

use crate::config::RepetitionConfig;

/// Escalation derived from the flags currently inside the window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationDecision {
    /// Flags in the window, including the one just recorded
    pub repetition_count: usize,

    pub tier: Severity,

    pub should_alert_moderator: bool,
}

/// Window length and tier thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepetitionPolicy {
    pub window: Duration,
    pub medium_threshold: usize,
    pub high_threshold: usize,
}

impl RepetitionPolicy {
    /// Decision for `count` flags in the window
    pub fn decide(&self, count: usize) -> EscalationDecision {
        let tier = if count >= self.high_threshold {
            Severity::High
        } else if count >= self.medium_threshold {
            Severity::Medium
        } else {
            Severity::Low
        };

        EscalationDecision {
            repetition_count: count,
            tier,
            should_alert_moderator: tier == Severity::High,
        }
    }

    /// Oldest timestamp still inside the window ending at `now`
    fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

impl Default for RepetitionPolicy {
    fn default() -> Self {
        Self::from(&RepetitionConfig::default())
    }
}

impl From<&RepetitionConfig> for RepetitionPolicy {
    fn from(config: &RepetitionConfig) -> Self {
        Self {
            window: config.window(),
            medium_threshold: config.medium_threshold,
            high_threshold: config.high_threshold,
        }
    }
}

/// Flag timestamps for one sender/target pair, oldest first
#[derive(Debug, Default)]
struct FlagRecord {
    timestamps: VecDeque<DateTime<Utc>>,
}

impl FlagRecord {
    /// Drop timestamps strictly older than `cutoff`
    fn prune(&mut self, cutoff: DateTime<Utc>) {
        while let Some(&t) = self.timestamps.front() {
            if t < cutoff {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    /// Insert keeping ascending order; late arrivals slot in place
    fn insert(&mut self, at: DateTime<Utc>) {
        match self.timestamps.back() {
            Some(&last) if at < last => {
                let pos = self.timestamps.partition_point(|t| *t <= at);
                self.timestamps.insert(pos, at);
            }
            _ => self.timestamps.push_back(at),
        }
    }

    fn len(&self) -> usize {
        self.timestamps.len()
    }
}

/// Per-pair flag history with sliding-window escalation
#[derive(Debug, Default)]
pub struct RepetitionTracker {
    policy: RepetitionPolicy,
    records: DashMap<RepetitionKey, FlagRecord>,
}

impl RepetitionTracker {
    pub fn new(policy: RepetitionPolicy) -> Self {
        Self {
            policy,
            records: DashMap::new(),
        }
    }

    pub fn policy(&self) -> &RepetitionPolicy {
        &self.policy
    }

    /// Record a flag at `at` and return the resulting escalation.
    ///
    /// Timestamps older than `at - window` are pruned first, so the count
    /// includes this flag and every flag inside the window ending at `at`.
    pub fn record_flag(&self, key: &RepetitionKey, at: DateTime<Utc>) -> EscalationDecision {
        let cutoff = self.policy.cutoff(at);
        let count = {
            let mut record = self.records.entry(key.clone()).or_default();
            record.prune(cutoff);
            record.insert(at);
            record.len()
        };

        let decision = self.policy.decide(count);
        debug!(
            key = %key,
            count = decision.repetition_count,
            tier = %decision.tier,
            "Flag recorded"
        );
        decision
    }

    /// Flags for `key` inside the window ending at `now`
    pub fn current_count(&self, key: &RepetitionKey, now: DateTime<Utc>) -> usize {
        let cutoff = self.policy.cutoff(now);
        match self.records.get_mut(key) {
            Some(mut record) => {
                record.prune(cutoff);
                record.len()
            }
            None => 0,
        }
    }

    /// Discard the record for `key`; the next flag starts from one
    pub fn reset(&self, key: &RepetitionKey) -> bool {
        self.records.remove(key).is_some()
    }

    /// Drop every record with no flags left in the window ending at `now`.
    ///
    /// Returns the number of records removed.
    pub fn sweep_idle(&self, now: DateTime<Utc>) -> usize {
        let cutoff = self.policy.cutoff(now);
        let before = self.records.len();
        self.records.retain(|_, record| {
            record.prune(cutoff);
            record.len() > 0
        });
        let removed = before.saturating_sub(self.records.len());
        if removed > 0 {
            debug!(removed, remaining = self.records.len(), "Swept idle repetition records");
        }
        removed
    }

    /// Number of pairs currently tracked
    pub fn tracked_pairs(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatguard_core::ConversationTarget;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn key(sender: &str, target: &str) -> RepetitionKey {
        RepetitionKey::new(sender, ConversationTarget::direct(target)).unwrap()
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_tier_thresholds() {
        let policy = RepetitionPolicy::default();
        let tiers: Vec<_> = (1..=6).map(|n| policy.decide(n).tier).collect();
        assert_eq!(
            tiers,
            vec![
                Severity::Low,
                Severity::Low,
                Severity::Medium,
                Severity::Medium,
                Severity::High,
                Severity::High,
            ]
        );
        assert!(!policy.decide(4).should_alert_moderator);
        assert!(policy.decide(5).should_alert_moderator);
    }

    #[test]
    fn test_five_flags_alert() {
        let tracker = RepetitionTracker::default();
        let k = key("alice", "bob");

        let mut decision = tracker.record_flag(&k, t0());
        for i in 1..5 {
            decision = tracker.record_flag(&k, t0() + Duration::seconds(i * 30));
        }

        assert_eq!(decision.repetition_count, 5);
        assert_eq!(decision.tier, Severity::High);
        assert!(decision.should_alert_moderator);
    }

    #[test]
    fn test_two_flags_stay_low() {
        let tracker = RepetitionTracker::default();
        let k = key("alice", "bob");

        tracker.record_flag(&k, t0());
        let decision = tracker.record_flag(&k, t0() + Duration::minutes(1));

        assert_eq!(decision.repetition_count, 2);
        assert_eq!(decision.tier, Severity::Low);
        assert!(!decision.should_alert_moderator);
    }

    #[test]
    fn test_window_expiry() {
        let tracker = RepetitionTracker::default();
        let k = key("alice", "bob");

        for i in 0..5 {
            tracker.record_flag(&k, t0() + Duration::seconds(i));
        }
        let later = t0() + Duration::minutes(10) + Duration::seconds(5);
        let decision = tracker.record_flag(&k, later);

        assert_eq!(decision.repetition_count, 1);
        assert_eq!(decision.tier, Severity::Low);
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        let tracker = RepetitionTracker::default();
        let k = key("alice", "bob");

        tracker.record_flag(&k, t0());
        assert_eq!(tracker.current_count(&k, t0() + Duration::minutes(10)), 1);
        assert_eq!(
            tracker.current_count(&k, t0() + Duration::minutes(10) + Duration::milliseconds(1)),
            0
        );
    }

    #[test]
    fn test_reset() {
        let tracker = RepetitionTracker::default();
        let k = key("alice", "bob");

        tracker.record_flag(&k, t0());
        tracker.record_flag(&k, t0());
        assert!(tracker.reset(&k));
        assert_eq!(tracker.current_count(&k, t0()), 0);
        assert!(!tracker.reset(&k));

        let decision = tracker.record_flag(&k, t0());
        assert_eq!(decision.repetition_count, 1);
    }

    #[test]
    fn test_keys_are_independent() {
        let tracker = RepetitionTracker::default();
        let direct = key("alice", "bob");
        let group = RepetitionKey::new("alice", ConversationTarget::group("bob")).unwrap();

        tracker.record_flag(&direct, t0());
        tracker.record_flag(&direct, t0());
        tracker.record_flag(&group, t0());

        assert_eq!(tracker.current_count(&direct, t0()), 2);
        assert_eq!(tracker.current_count(&group, t0()), 1);
        assert_eq!(tracker.current_count(&key("bob", "alice"), t0()), 0);
    }

    #[test]
    fn test_out_of_order_timestamps() {
        let tracker = RepetitionTracker::default();
        let k = key("alice", "bob");

        tracker.record_flag(&k, t0() + Duration::minutes(5));
        tracker.record_flag(&k, t0());
        tracker.record_flag(&k, t0() + Duration::minutes(2));

        // Only the earliest flag has left the window
        assert_eq!(tracker.current_count(&k, t0() + Duration::minutes(11)), 2);
    }

    #[test]
    fn test_sweep_idle() {
        let tracker = RepetitionTracker::default();
        tracker.record_flag(&key("alice", "bob"), t0());
        tracker.record_flag(&key("carol", "dave"), t0() + Duration::minutes(8));

        let removed = tracker.sweep_idle(t0() + Duration::minutes(12));
        assert_eq!(removed, 1);
        assert_eq!(tracker.tracked_pairs(), 1);
    }

    #[test]
    fn test_custom_thresholds() {
        let tracker = RepetitionTracker::new(RepetitionPolicy {
            window: Duration::seconds(60),
            medium_threshold: 2,
            high_threshold: 3,
        });
        let k = key("alice", "bob");

        assert_eq!(tracker.record_flag(&k, t0()).tier, Severity::Low);
        assert_eq!(tracker.record_flag(&k, t0()).tier, Severity::Medium);
        assert!(tracker.record_flag(&k, t0()).should_alert_moderator);
    }

    #[test]
    fn test_concurrent_flags_same_key() {
        let tracker = Arc::new(RepetitionTracker::default());
        let k = key("alice", "bob");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                let k = k.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        tracker.record_flag(&k, t0());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(tracker.current_count(&k, t0()), 400);
    }
}
