//! Moderation counters and reporting
//!
//! [`MetricsCollector`] keeps in-process totals that callers can snapshot;
//! [`emit`] mirrors the same events onto the `metrics` facade for whatever
//! recorder the host application installs.

use chatguard_core::Severity;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics collector for moderation activity
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    messages_classified: AtomicU64,
    messages_flagged: AtomicU64,
    high_severity_flags: AtomicU64,
    notifications_suppressed: AtomicU64,
    moderator_alerts: AtomicU64,
    trust_lookup_failures: AtomicU64,
    classifier_latency_us: AtomicU64,
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                messages_classified: AtomicU64::new(0),
                messages_flagged: AtomicU64::new(0),
                high_severity_flags: AtomicU64::new(0),
                notifications_suppressed: AtomicU64::new(0),
                moderator_alerts: AtomicU64::new(0),
                trust_lookup_failures: AtomicU64::new(0),
                classifier_latency_us: AtomicU64::new(0),
            }),
        }
    }

    /// Record a classified message and how long classification took
    pub fn record_classification(&self, latency_us: u64) {
        self.inner.messages_classified.fetch_add(1, Ordering::Relaxed);
        self.inner
            .classifier_latency_us
            .fetch_add(latency_us, Ordering::Relaxed);
        emit::message_classified();
    }

    /// Record a flagged message
    pub fn record_flag(&self, severity: Severity) {
        self.inner.messages_flagged.fetch_add(1, Ordering::Relaxed);
        if severity == Severity::High {
            self.inner.high_severity_flags.fetch_add(1, Ordering::Relaxed);
        }
        emit::message_flagged(severity);
    }

    pub fn record_suppressed(&self) {
        self.inner
            .notifications_suppressed
            .fetch_add(1, Ordering::Relaxed);
        emit::notification_suppressed();
    }

    pub fn record_alert(&self) {
        self.inner.moderator_alerts.fetch_add(1, Ordering::Relaxed);
        emit::moderator_alert();
    }

    /// Record a failed relationship or history lookup
    pub fn record_trust_failure(&self) {
        self.inner
            .trust_lookup_failures
            .fetch_add(1, Ordering::Relaxed);
        emit::trust_lookup_failed();
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            messages_classified: self.inner.messages_classified.load(Ordering::Relaxed),
            messages_flagged: self.inner.messages_flagged.load(Ordering::Relaxed),
            high_severity_flags: self.inner.high_severity_flags.load(Ordering::Relaxed),
            notifications_suppressed: self
                .inner
                .notifications_suppressed
                .load(Ordering::Relaxed),
            moderator_alerts: self.inner.moderator_alerts.load(Ordering::Relaxed),
            trust_lookup_failures: self.inner.trust_lookup_failures.load(Ordering::Relaxed),
            classifier_latency_us: self.inner.classifier_latency_us.load(Ordering::Relaxed),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of current metrics
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub messages_classified: u64,
    pub messages_flagged: u64,
    pub high_severity_flags: u64,
    pub notifications_suppressed: u64,
    pub moderator_alerts: u64,
    pub trust_lookup_failures: u64,
    pub classifier_latency_us: u64,
}

impl MetricsSnapshot {
    /// Average classifier latency per message
    pub fn avg_classifier_latency_us(&self) -> u64 {
        if self.messages_classified == 0 {
            0
        } else {
            self.classifier_latency_us / self.messages_classified
        }
    }

    /// Share of classified messages that were flagged
    pub fn flag_rate(&self) -> f64 {
        if self.messages_classified == 0 {
            0.0
        } else {
            self.messages_flagged as f64 / self.messages_classified as f64
        }
    }

    /// Share of flagged messages whose notification was suppressed
    pub fn suppression_rate(&self) -> f64 {
        if self.messages_flagged == 0 {
            0.0
        } else {
            self.notifications_suppressed as f64 / self.messages_flagged as f64
        }
    }
}

/// Counters on the `metrics` facade
pub mod emit {
    use chatguard_core::Severity;

    pub fn message_classified() {
        metrics::counter!("chatguard_messages_total").increment(1);
    }

    pub fn message_flagged(severity: Severity) {
        metrics::counter!("chatguard_flags_total", "severity" => severity.as_str()).increment(1);
    }

    pub fn notification_suppressed() {
        metrics::counter!("chatguard_suppressed_total").increment(1);
    }

    pub fn moderator_alert() {
        metrics::counter!("chatguard_alerts_total").increment(1);
    }

    pub fn trust_lookup_failed() {
        metrics::counter!("chatguard_trust_failures_total").increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collection() {
        let metrics = MetricsCollector::new();

        metrics.record_classification(400);
        metrics.record_classification(200);
        metrics.record_flag(Severity::High);
        metrics.record_suppressed();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.messages_classified, 2);
        assert_eq!(snapshot.messages_flagged, 1);
        assert_eq!(snapshot.high_severity_flags, 1);
        assert_eq!(snapshot.avg_classifier_latency_us(), 300);
        assert!((snapshot.flag_rate() - 0.5).abs() < f64::EPSILON);
        assert!((snapshot.suppression_rate() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = MetricsCollector::new();
        let other = metrics.clone();
        other.record_alert();
        other.record_trust_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.moderator_alerts, 1);
        assert_eq!(snapshot.trust_lookup_failures, 1);
        assert_eq!(snapshot.suppression_rate(), 0.0);
    }

    #[test]
    fn test_facade_counters() {
        use metrics_util::debugging::{DebugValue, DebuggingRecorder};

        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();

        metrics::with_local_recorder(&recorder, || {
            let metrics = MetricsCollector::new();
            metrics.record_classification(10);
            metrics.record_classification(10);
            metrics.record_flag(Severity::High);
            metrics.record_flag(Severity::Medium);
            metrics.record_flag(Severity::High);
            metrics.record_suppressed();
            metrics.record_alert();
            metrics.record_trust_failure();
        });

        let counters: Vec<(String, Vec<(String, String)>, u64)> = snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .filter_map(|(key, _, _, value)| match value {
                DebugValue::Counter(n) => {
                    let key = key.key();
                    let labels = key
                        .labels()
                        .map(|l| (l.key().to_string(), l.value().to_string()))
                        .collect();
                    Some((key.name().to_string(), labels, n))
                }
                _ => None,
            })
            .collect();

        let count = |name: &str, labels: &[(&str, &str)]| {
            counters
                .iter()
                .find(|(n, l, _)| {
                    n == name
                        && l.len() == labels.len()
                        && labels
                            .iter()
                            .all(|(k, v)| l.iter().any(|(lk, lv)| lk == k && lv == v))
                })
                .map(|(_, _, value)| *value)
        };

        assert_eq!(count("chatguard_messages_total", &[]), Some(2));
        assert_eq!(count("chatguard_flags_total", &[("severity", "high")]), Some(2));
        assert_eq!(count("chatguard_flags_total", &[("severity", "medium")]), Some(1));
        assert_eq!(count("chatguard_flags_total", &[("severity", "low")]), None);
        assert_eq!(count("chatguard_suppressed_total", &[]), Some(1));
        assert_eq!(count("chatguard_alerts_total", &[]), Some(1));
        assert_eq!(count("chatguard_trust_failures_total", &[]), Some(1));
    }
}
