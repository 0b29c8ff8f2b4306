// crates/sidebar-cta-core/src/resolve.rs
// ============================================================================
// Module: Sidebar CTA Resolution
// Description: Combines flag evaluation with payload validation.
// Purpose: Decide whether the settings sidebar renders a CTA, and with what.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The sidebar shows a CTA only when its feature flag is enabled and the flag
//! payload validates. Flag delivery is an external collaborator reached
//! through [`FeatureFlagSource`], always passed in explicitly; nothing here
//! reads global flag state.
//!
//! [`CtaValidator`] is the audited entry point. The free functions
//! [`resolve_sidebar_cta`] and [`crate::parse_sidebar_cta_payload`] perform
//! the same checks without emitting events.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::audit::CtaAuditEvent;
use crate::audit::CtaAuditSink;
use crate::audit::NoopAuditSink;
use crate::flag::FlagValue;
use crate::flag::is_feature_flag_enabled;
use crate::payload::CtaPayload;
use crate::payload::parse_sidebar_cta_payload;
use crate::payload::validate_sidebar_cta_payload;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Flag key carrying the sidebar CTA payload.
pub const SIDEBAR_CTA_FEATURE_FLAG: &str = "sidebar-cta";
/// Flag key gating the note window.
pub const NOTE_WINDOW_FEATURE_FLAG: &str = "note-window";

// ============================================================================
// SECTION: Flag Model
// ============================================================================

/// Flag evaluation handed over by the flag-delivery collaborator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureFlag {
    /// Enabled value; absent means disabled.
    #[serde(default)]
    pub enabled: Option<FlagValue>,
    /// Optional structured payload.
    #[serde(default)]
    pub payload: Option<Value>,
}

impl FeatureFlag {
    /// Creates a flag from an enabled value and optional payload.
    #[must_use]
    pub fn new(enabled: impl Into<FlagValue>, payload: Option<Value>) -> Self {
        Self {
            enabled: Some(enabled.into()),
            payload,
        }
    }

    /// Returns whether the flag is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        is_feature_flag_enabled(self.enabled.as_ref())
    }
}

/// Source of feature flag evaluations.
pub trait FeatureFlagSource: Send + Sync {
    /// Returns the evaluation for `key`, or `None` when the flag is unknown.
    fn feature_flag(&self, key: &str) -> Option<FeatureFlag>;
}

/// In-memory flag source keyed by flag name.
#[derive(Debug, Clone, Default)]
pub struct StaticFlagSource {
    /// Flag evaluations by key.
    flags: BTreeMap<String, FeatureFlag>,
}

impl StaticFlagSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a flag, returning the source.
    #[must_use]
    pub fn with_flag(mut self, key: impl Into<String>, flag: FeatureFlag) -> Self {
        self.insert(key, flag);
        self
    }

    /// Adds or replaces a flag.
    pub fn insert(&mut self, key: impl Into<String>, flag: FeatureFlag) {
        self.flags.insert(key.into(), flag);
    }

    /// Returns the number of flags held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Returns true when no flags are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl FromIterator<(String, FeatureFlag)> for StaticFlagSource {
    fn from_iter<I: IntoIterator<Item = (String, FeatureFlag)>>(iter: I) -> Self {
        Self {
            flags: iter.into_iter().collect(),
        }
    }
}

impl FeatureFlagSource for StaticFlagSource {
    fn feature_flag(&self, key: &str) -> Option<FeatureFlag> {
        self.flags.get(key).cloned()
    }
}

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Returns the CTA to render for a flag evaluation.
///
/// Disabled flags yield `None` without inspecting the payload.
#[must_use]
pub fn resolve_sidebar_cta(flag: &FeatureFlag) -> Option<CtaPayload> {
    if !flag.is_enabled() {
        return None;
    }
    flag.payload.as_ref().and_then(parse_sidebar_cta_payload)
}

/// Payload validator that reports every outcome to an audit sink.
pub struct CtaValidator {
    /// Destination for evaluation events.
    audit: Arc<dyn CtaAuditSink>,
}

impl CtaValidator {
    /// Creates a validator reporting to `audit`.
    #[must_use]
    pub fn new(audit: Arc<dyn CtaAuditSink>) -> Self {
        Self {
            audit,
        }
    }

    /// Validates a payload delivered under `flag_key`.
    #[must_use]
    pub fn parse(&self, flag_key: Option<&str>, payload: &Value) -> Option<CtaPayload> {
        match validate_sidebar_cta_payload(payload) {
            Ok(cta) => {
                self.audit.record(&CtaAuditEvent::accepted(flag_key, &cta));
                Some(cta)
            }
            Err(rejection) => {
                self.audit.record(&CtaAuditEvent::rejected(flag_key, &rejection));
                None
            }
        }
    }

    /// Resolves the CTA for an evaluated flag.
    #[must_use]
    pub fn resolve(&self, flag_key: &str, flag: &FeatureFlag) -> Option<CtaPayload> {
        if !flag.is_enabled() {
            self.audit.record(&CtaAuditEvent::disabled(Some(flag_key)));
            return None;
        }
        match flag.payload.as_ref() {
            Some(payload) => self.parse(Some(flag_key), payload),
            None => self.parse(Some(flag_key), &Value::Null),
        }
    }

    /// Looks up `flag_key` in `source` and resolves its CTA.
    ///
    /// Unknown flags are treated as disabled.
    #[must_use]
    pub fn resolve_from(
        &self,
        source: &dyn FeatureFlagSource,
        flag_key: &str,
    ) -> Option<CtaPayload> {
        let flag = source.feature_flag(flag_key).unwrap_or_default();
        self.resolve(flag_key, &flag)
    }
}

impl Default for CtaValidator {
    fn default() -> Self {
        Self::new(Arc::new(NoopAuditSink))
    }
}
