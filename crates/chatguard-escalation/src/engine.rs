//! Moderation engine
//!
//! Runs one inbound message through classification, repetition tracking and
//! trust evaluation, and decides who, if anyone, gets notified.

use chatguard_classifiers::Classifier;
use chatguard_core::{
    ClassificationResult, ConversationTarget, RepetitionKey, Result, Severity, UserId,
};
use chatguard_telemetry::{
    AuditEvent, AuditEventKind, AuditSeverity, AuditTrail, MetricsCollector, MetricsSnapshot,
};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::alert::{ModeratorAlert, ReviewAction, ReviewOutcome};
use crate::config::EngineConfig;
use crate::repetition::{EscalationDecision, RepetitionPolicy, RepetitionTracker};
use crate::trust::{InteractionHistory, TrustAssessment, TrustEvaluator};

/// An inbound chat message
#[derive(Debug, Clone)]
pub struct MessageContext {
    pub sender: UserId,
    pub target: ConversationTarget,
    pub text: String,
    pub sent_at: DateTime<Utc>,
    pub message_id: Option<String>,
}

impl MessageContext {
    /// A message sent now
    pub fn new(
        sender: impl Into<UserId>,
        target: ConversationTarget,
        text: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            target,
            text: text.into(),
            sent_at: Utc::now(),
            message_id: None,
        }
    }

    pub fn sent_at(mut self, sent_at: DateTime<Utc>) -> Self {
        self.sent_at = sent_at;
        self
    }

    pub fn with_message_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = Some(message_id.into());
        self
    }
}

/// Who should hear about a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationVerdict {
    /// Message was not flagged
    None,
    /// Flagged between a trusted pair, nothing at high severity
    Suppressed,
    /// Warn the sender privately
    WarnSender,
    /// Warn the sender and raise a moderator alert
    AlertModerator,
}

/// Everything decided about one message
#[derive(Debug, Clone, Serialize)]
pub struct ModerationOutcome {
    pub classification: ClassificationResult,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalation: Option<EscalationDecision>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub trust: Option<TrustAssessment>,

    pub verdict: NotificationVerdict,

    /// Pending alert for the host to persist and route to moderators
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<ModeratorAlert>,
}

impl ModerationOutcome {
    fn clean(classification: ClassificationResult) -> Self {
        Self {
            classification,
            escalation: None,
            trust: None,
            verdict: NotificationVerdict::None,
            alert: None,
        }
    }
}

/// Abuse detection and escalation for chat messages.
///
/// All methods take `&self`; share the engine behind an `Arc`.
pub struct ModerationEngine {
    classifier: Arc<dyn Classifier>,
    tracker: RepetitionTracker,
    trust: TrustEvaluator,
    audit: Option<Mutex<AuditTrail>>,
    metrics: MetricsCollector,
}

impl ModerationEngine {
    /// Create an engine around an existing classifier
    pub fn new(
        classifier: Arc<dyn Classifier>,
        history: Arc<dyn InteractionHistory>,
        config: &EngineConfig,
    ) -> Result<Self> {
        config.validate()?;

        info!(
            classifier = classifier.name(),
            window_secs = config.repetition.window_secs,
            medium_threshold = config.repetition.medium_threshold,
            high_threshold = config.repetition.high_threshold,
            audit = config.audit.enabled,
            audit_max_events = config.audit.max_events,
            "Moderation engine initialized"
        );

        Ok(Self {
            classifier,
            tracker: RepetitionTracker::new(RepetitionPolicy::from(&config.repetition)),
            trust: TrustEvaluator::new(history, &config.trust),
            audit: config
                .audit
                .enabled
                .then(|| Mutex::new(AuditTrail::bounded(config.audit.max_events))),
            metrics: MetricsCollector::new(),
        })
    }

    /// Create an engine with a keyword classifier loaded from `config`
    pub fn from_config(config: &EngineConfig, history: Arc<dyn InteractionHistory>) -> Result<Self> {
        let classifier = config.classifier.build_classifier();
        Self::new(Arc::new(classifier), history, config)
    }

    /// Classify a message without recording anything
    pub fn classify(&self, text: &str) -> ClassificationResult {
        let start = Instant::now();
        let result = self.classifier.classify(text);
        let latency_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);
        self.metrics.record_classification(latency_us);
        result
    }

    /// Count a flag for the pair at `at` and return the escalation
    pub fn record_flag_and_escalate(
        &self,
        sender: &UserId,
        target: &ConversationTarget,
        at: DateTime<Utc>,
    ) -> Result<EscalationDecision> {
        let key = RepetitionKey::new(sender.clone(), target.clone())?;
        Ok(self.record(&key, at))
    }

    /// Whether the pair is trusted right now
    pub async fn is_trusted_pair(&self, sender: &UserId, target: &ConversationTarget) -> bool {
        self.assess_trust(sender, target, Utc::now()).await.trusted
    }

    /// Trust assessment for the pair as of `now`
    pub async fn assess_trust(
        &self,
        sender: &UserId,
        target: &ConversationTarget,
        now: DateTime<Utc>,
    ) -> TrustAssessment {
        let assessment = self.trust.assess(sender, target, now).await;
        for _ in 0..assessment.lookup_failures {
            self.metrics.record_trust_failure();
        }
        assessment
    }

    /// Forget the pair's flag history
    pub fn reset_repetition(&self, sender: &UserId, target: &ConversationTarget) -> Result<()> {
        let key = RepetitionKey::new(sender.clone(), target.clone())?;
        self.reset_key(&key);
        Ok(())
    }

    /// Flags for the pair inside the window ending at `now`
    pub fn current_repetition(
        &self,
        sender: &UserId,
        target: &ConversationTarget,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        let key = RepetitionKey::new(sender.clone(), target.clone())?;
        Ok(self.tracker.current_count(&key, now))
    }

    /// Run the full moderation flow for one message.
    ///
    /// Flags are always recorded, even for trusted pairs. Trust suppresses
    /// notification only while both the escalation tier and the message's
    /// own severity are below high.
    pub async fn evaluate_message(&self, ctx: MessageContext) -> Result<ModerationOutcome> {
        let classification = self.classify(&ctx.text);
        if !classification.is_flagged {
            return Ok(ModerationOutcome::clean(classification));
        }

        let key = RepetitionKey::new(ctx.sender.clone(), ctx.target.clone())?;
        let message_severity = classification.severity.unwrap_or(Severity::Low);
        self.metrics.record_flag(message_severity);

        let decision = self.record(&key, ctx.sent_at);
        let trust = self.assess_trust(&ctx.sender, &ctx.target, ctx.sent_at).await;

        let verdict = if decision.should_alert_moderator {
            NotificationVerdict::AlertModerator
        } else if trust.trusted
            && decision.tier < Severity::High
            && message_severity < Severity::High
        {
            NotificationVerdict::Suppressed
        } else {
            NotificationVerdict::WarnSender
        };

        let alert = match verdict {
            NotificationVerdict::AlertModerator => {
                let mut alert = ModeratorAlert::new(
                    key.clone(),
                    ctx.text.as_str(),
                    message_severity,
                    &decision,
                    ctx.sent_at,
                )
                .with_flagged_words(classification.flagged_words.clone());
                if let Some(id) = ctx.message_id.as_deref() {
                    alert = alert.with_message_id(id);
                }
                Some(alert)
            }
            _ => None,
        };

        self.report(&key, &decision, &trust, verdict, alert.as_ref(), ctx.sent_at);

        Ok(ModerationOutcome {
            classification,
            escalation: Some(decision),
            trust: Some(trust),
            verdict,
            alert,
        })
    }

    /// Apply a moderator's review. Dismissing clears the pair's record.
    pub fn review_alert(&self, alert: &mut ModeratorAlert, action: ReviewAction) -> ReviewOutcome {
        let now = Utc::now();
        let outcome = alert.apply(action, now);

        info!(
            alert_id = %alert.id,
            key = %alert.key,
            previous = %outcome.previous,
            status = %outcome.status,
            "Alert reviewed"
        );
        self.audit(
            AuditEvent::new(AuditEventKind::AlertReviewed)
                .with_subject(&alert.key)
                .with_data(serde_json::json!({
                    "alert_id": alert.id,
                    "previous": outcome.previous,
                    "status": outcome.status,
                }))
                .with_timestamp(now),
        );

        if action == ReviewAction::Dismiss {
            self.reset_key(&alert.key);
        }
        outcome
    }

    /// Drop repetition records with nothing left in the window
    pub fn sweep_idle(&self, now: DateTime<Utc>) -> usize {
        self.tracker.sweep_idle(now)
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn tracker(&self) -> &RepetitionTracker {
        &self.tracker
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Copy of the retained audit events; empty when auditing is disabled
    pub fn audit_events(&self) -> Vec<AuditEvent> {
        self.audit
            .as_ref()
            .map(|trail| trail.lock().events().cloned().collect())
            .unwrap_or_default()
    }

    /// Take the retained audit events for external persistence.
    ///
    /// Events past `audit.max_events` are evicted oldest first, so hosts
    /// that keep a full record should drain more often than that.
    pub fn drain_audit(&self) -> Vec<AuditEvent> {
        self.audit
            .as_ref()
            .map(|trail| trail.lock().drain())
            .unwrap_or_default()
    }

    /// Check the audit chain for tampering
    pub fn verify_audit(&self) -> bool {
        self.audit
            .as_ref()
            .map_or(true, |trail| trail.lock().verify())
    }

    fn record(&self, key: &RepetitionKey, at: DateTime<Utc>) -> EscalationDecision {
        let decision = self.tracker.record_flag(key, at);
        self.audit(
            AuditEvent::new(AuditEventKind::FlagRecorded)
                .with_subject(key)
                .with_data(decision)
                .with_timestamp(at)
                .with_severity(AuditSeverity::from(decision.tier)),
        );
        decision
    }

    fn reset_key(&self, key: &RepetitionKey) {
        let existed = self.tracker.reset(key);
        debug!(key = %key, existed, "Repetition record reset");
        self.audit(AuditEvent::new(AuditEventKind::RepetitionReset).with_subject(key));
    }

    fn report(
        &self,
        key: &RepetitionKey,
        decision: &EscalationDecision,
        trust: &TrustAssessment,
        verdict: NotificationVerdict,
        alert: Option<&ModeratorAlert>,
        at: DateTime<Utc>,
    ) {
        let event = match verdict {
            NotificationVerdict::None => return,
            NotificationVerdict::Suppressed => {
                self.metrics.record_suppressed();
                debug!(key = %key, count = decision.repetition_count, "Notification suppressed for trusted pair");
                AuditEvent::new(AuditEventKind::NotificationSuppressed)
                    .with_data(trust)
                    .with_severity(AuditSeverity::Info)
            }
            NotificationVerdict::WarnSender => {
                debug!(key = %key, tier = %decision.tier, "Sender warned");
                AuditEvent::new(AuditEventKind::SenderWarned)
                    .with_data(decision)
                    .with_severity(AuditSeverity::from(decision.tier))
            }
            NotificationVerdict::AlertModerator => {
                self.metrics.record_alert();
                warn!(
                    key = %key,
                    count = decision.repetition_count,
                    trusted = trust.trusted,
                    "Repeated abuse, alerting moderators"
                );
                AuditEvent::new(AuditEventKind::ModeratorAlert)
                    .with_data(serde_json::json!({
                        "alert_id": alert.map(|a| a.id),
                        "repetition_count": decision.repetition_count,
                        "trusted": trust.trusted,
                    }))
                    .with_severity(AuditSeverity::Critical)
            }
        };

        self.audit(event.with_subject(key).with_timestamp(at));
    }

    fn audit(&self, event: AuditEvent) {
        if let Some(trail) = &self.audit {
            trail.lock().add_event(event);
        }
    }
}
