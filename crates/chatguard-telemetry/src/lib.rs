//! ChatGuard Telemetry
//!
//! Audit trail and counters for the moderation engine.
//!
//! Provides:
//! - A hash-chained audit trail of flags, suppressions, alerts and reviews
//! - In-process moderation counters mirrored onto the `metrics` facade

pub mod audit;
pub mod metrics;

pub use audit::{AuditEvent, AuditEventKind, AuditSeverity, AuditTrail};
pub use metrics::{MetricsCollector, MetricsSnapshot};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::audit::{AuditEvent, AuditEventKind, AuditTrail};
    pub use crate::metrics::MetricsCollector;
}
