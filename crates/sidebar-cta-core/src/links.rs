// crates/sidebar-cta-core/src/links.rs
// ============================================================================
// Module: Link Classification
// Description: Same-origin classification for CTA link strings.
// Purpose: Separate root-relative app paths from external URLs.
// Dependencies: none
// ============================================================================

//! ## Overview
//! A link is internal only when it is a root-relative path: a single leading
//! `/`. Protocol-relative strings (`//host/...`) resolve to an arbitrary host
//! against the current scheme, so they are never internal.

// ============================================================================
// SECTION: Classification
// ============================================================================

/// Returns true when `url` is a same-origin, root-relative path.
///
/// # Invariants
/// - Total: every input yields a boolean, including the empty string.
/// - `//`-prefixed input is never internal.
#[must_use]
pub fn is_internal_url(url: &str) -> bool {
    url.starts_with('/') && !url.starts_with("//")
}

// ============================================================================
// SECTION: Tests
// ============================================================================
