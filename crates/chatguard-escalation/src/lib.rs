//! ChatGuard Escalation
//!
//! Turns per-message classifications into moderation decisions.
//!
//! - [`RepetitionTracker`]: flags per sender/target pair in a sliding window,
//!   escalating low → medium → high
//! - [`TrustEvaluator`]: relationship list or recent message history,
//!   backed by an [`InteractionHistory`] collaborator
//! - [`ModerationEngine`]: classify, record, evaluate trust, and decide
//!   whether to suppress, warn the sender, or alert moderators

pub mod alert;
pub mod config;
pub mod engine;
pub mod repetition;
pub mod trust;

pub use alert::{AlertStatus, ModeratorAlert, ReviewAction, ReviewOutcome};
pub use config::{AuditConfig, EngineConfig, RepetitionConfig, TrustConfig};
pub use engine::{MessageContext, ModerationEngine, ModerationOutcome, NotificationVerdict};
pub use repetition::{EscalationDecision, RepetitionPolicy, RepetitionTracker};
pub use trust::{InteractionHistory, NoHistory, TrustAssessment, TrustBasis, TrustEvaluator};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::alert::{ModeratorAlert, ReviewAction};
    pub use crate::config::EngineConfig;
    pub use crate::engine::{MessageContext, ModerationEngine, NotificationVerdict};
    pub use crate::repetition::EscalationDecision;
    pub use crate::trust::InteractionHistory;
}
