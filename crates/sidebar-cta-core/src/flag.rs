// crates/sidebar-cta-core/src/flag.rs
// ============================================================================
// Module: Feature Flag Values
// Description: Flag value model and enabled-state coercion.
// Purpose: Turn remotely delivered flag values into a boolean enabled state.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Flag delivery hands over either a boolean, a string, or nothing. Booleans
//! pass through unchanged and absent values are disabled. Strings are
//! normalized (trimmed, lowercased) and are enabled unless they are empty or
//! appear on a fixed deny-list.
//!
//! The string rule is permissive: any token outside the deny-list, including
//! unrecognized ones such as `"maybe"`, counts as enabled.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::payload::trim_js_whitespace;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Normalized string values that turn a flag off.
pub const DISABLED_FLAG_VALUES: [&str; 4] = ["false", "0", "off", "disabled"];

// ============================================================================
// SECTION: Types
// ============================================================================

/// Raw flag value delivered by the flag source.
///
/// # Invariants
/// - Absence is modelled as `Option::None` by callers, never as a variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    /// Boolean flag value.
    Bool(bool),
    /// String flag value (multivariate flags deliver variant keys).
    Text(String),
}

impl FlagValue {
    /// Converts a JSON value into a flag value.
    ///
    /// Returns `None` for JSON types other than booleans and strings, which
    /// the coercion rule treats as absent.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(enabled) => Some(Self::Bool(*enabled)),
            Value::String(text) => Some(Self::Text(text.clone())),
            _ => None,
        }
    }

    /// Returns the enabled state for this value.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Bool(enabled) => *enabled,
            Self::Text(raw) => {
                let normalized = trim_js_whitespace(raw).to_lowercase();
                !normalized.is_empty() && !DISABLED_FLAG_VALUES.contains(&normalized.as_str())
            }
        }
    }
}

impl From<bool> for FlagValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FlagValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

// ============================================================================
// SECTION: Coercion
// ============================================================================

/// Returns whether a possibly absent flag value is enabled.
#[must_use]
pub fn is_feature_flag_enabled(value: Option<&FlagValue>) -> bool {
    value.is_some_and(FlagValue::is_enabled)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
