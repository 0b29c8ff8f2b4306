// crates/sidebar-cta-core/src/lib.rs
// ============================================================================
// Module: Sidebar CTA Core
// Description: Validation and flag logic for the settings sidebar CTA.
// Purpose: Decide whether remotely configured CTA content is safe to render.
// Dependencies: serde, serde_json, thiserror, url
// ============================================================================

//! ## Overview
//! The settings sidebar can show a call-to-action configured through the
//! `sidebar-cta` feature flag. This crate owns the three rules behind it:
//! - [`is_internal_url`] classifies root-relative app paths;
//! - [`is_feature_flag_enabled`] coerces boolean/string flag values;
//! - [`parse_sidebar_cta_payload`] validates the flag payload into a
//!   [`CtaPayload`] or drops it.
//!
//! Invariants:
//! - Every operation is pure and synchronous; inputs are explicit parameters.
//! - External links handed to callers are always http(s).
//!
//! Security posture: flag payloads are untrusted remote configuration.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod flag;
pub mod links;
pub mod payload;
pub mod resolve;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::CtaAuditEvent;
pub use audit::CtaAuditSink;
pub use audit::CtaOutcome;
pub use audit::CtaTargetKind;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use flag::FlagValue;
pub use flag::is_feature_flag_enabled;
pub use links::is_internal_url;
pub use payload::CtaPalette;
pub use payload::CtaPayload;
pub use payload::CtaStyle;
pub use payload::CtaTarget;
pub use payload::RejectionReason;
pub use payload::ValidationRejected;
pub use payload::parse_sidebar_cta_payload;
pub use payload::validate_sidebar_cta_payload;
pub use resolve::CtaValidator;
pub use resolve::FeatureFlag;
pub use resolve::FeatureFlagSource;
pub use resolve::NOTE_WINDOW_FEATURE_FLAG;
pub use resolve::SIDEBAR_CTA_FEATURE_FLAG;
pub use resolve::StaticFlagSource;
pub use resolve::resolve_sidebar_cta;
