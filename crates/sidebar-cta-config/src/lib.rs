// crates/sidebar-cta-config/src/lib.rs
// ============================================================================
// Module: Sidebar CTA Config Library
// Description: Canonical config model and validation for sidebar CTA tooling.
// Purpose: Single source of truth for sidebar-cta.toml semantics.
// Dependencies: sidebar-cta-core, serde, toml
// ============================================================================

//! ## Overview
//! `sidebar-cta-config` defines the configuration model used by the
//! `sidebar-cta` tooling: which flag carries the CTA, where audit events go,
//! and local flag overrides. Validation is strict and fail-closed.
//!
//! Security posture: config inputs are untrusted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
