// crates/sidebar-cta-core/src/audit.rs
// ============================================================================
// Module: CTA Audit Logging
// Description: Structured audit events for CTA validation outcomes.
// Purpose: Emit redacted JSON-line audit logs without hard dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every CTA evaluation can be reported to a [`CtaAuditSink`]. Events carry
//! the outcome and, for rejections, the stable reason label. Raw payloads are
//! never logged because they come from remote configuration.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::payload::CtaPayload;
use crate::payload::ValidationRejected;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Outcome of a CTA evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CtaOutcome {
    /// Payload validated and will render.
    Accepted,
    /// Payload failed validation and is dropped.
    Rejected,
    /// Flag is disabled; the payload was not inspected.
    Disabled,
}

/// Target kind recorded for accepted payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CtaTargetKind {
    /// Root-relative app path.
    Internal,
    /// Absolute http(s) URL.
    External,
}

/// CTA audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct CtaAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Flag key the payload was delivered under, when known.
    pub flag_key: Option<String>,
    /// Evaluation outcome.
    pub outcome: CtaOutcome,
    /// Rejection reason label.
    pub reason: Option<&'static str>,
    /// Field that caused the rejection.
    pub field: Option<&'static str>,
    /// Target kind for accepted payloads.
    pub target_kind: Option<CtaTargetKind>,
}

impl CtaAuditEvent {
    /// Creates an event for an accepted payload.
    #[must_use]
    pub fn accepted(flag_key: Option<&str>, payload: &CtaPayload) -> Self {
        let target_kind = if payload.target().is_internal() {
            CtaTargetKind::Internal
        } else {
            CtaTargetKind::External
        };
        Self::new(flag_key, CtaOutcome::Accepted, None, Some(target_kind))
    }

    /// Creates an event for a rejected payload.
    #[must_use]
    pub fn rejected(flag_key: Option<&str>, rejection: &ValidationRejected) -> Self {
        Self::new(flag_key, CtaOutcome::Rejected, Some(rejection), None)
    }

    /// Creates an event for a disabled flag.
    #[must_use]
    pub fn disabled(flag_key: Option<&str>) -> Self {
        Self::new(flag_key, CtaOutcome::Disabled, None, None)
    }

    /// Builds an event with a consistent timestamp.
    fn new(
        flag_key: Option<&str>,
        outcome: CtaOutcome,
        rejection: Option<&ValidationRejected>,
        target_kind: Option<CtaTargetKind>,
    ) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        let reason = rejection.map(ValidationRejected::reason);
        Self {
            event: "sidebar_cta",
            timestamp_ms,
            flag_key: flag_key.map(str::to_string),
            outcome,
            reason: reason.map(|reason| reason.label()),
            field: reason.and_then(|reason| reason.field()),
            target_kind,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for CTA evaluation events.
pub trait CtaAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &CtaAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl CtaAuditSink for StderrAuditSink {
    fn record(&self, event: &CtaAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl CtaAuditSink for FileAuditSink {
    fn record(&self, event: &CtaAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl CtaAuditSink for NoopAuditSink {
    fn record(&self, _event: &CtaAuditEvent) {}
}
