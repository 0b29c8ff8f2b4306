// crates/sidebar-cta-core/src/payload.rs
// ============================================================================
// Module: Sidebar CTA Payload
// Description: Typed CTA payload and its boundary validator.
// Purpose: Turn untrusted flag payloads into render-safe CTA values.
// Dependencies: serde, serde_json, thiserror, url
// ============================================================================

//! ## Overview
//! The CTA payload arrives as arbitrary JSON attached to a remotely configured
//! feature flag. [`parse_sidebar_cta_payload`] checks its shape, classifies the
//! link, and either returns an immutable [`CtaPayload`] or `None`.
//!
//! Links are accepted in two forms only:
//! - root-relative app paths, kept verbatim;
//! - absolute `http`/`https` URLs, replaced by their canonical serialization.
//!
//! Rejection is silent by contract: malformed remote configuration is expected
//! input and callers simply skip rendering. [`ValidationRejected`] exists so
//! the audit layer can label why a payload was dropped.
//!
//! Security posture: flag payloads are untrusted; only http(s) URLs may ever
//! reach the external-open path.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde::Serializer;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::links::is_internal_url;

// ============================================================================
// SECTION: Closed Enums
// ============================================================================

/// Color palette for the CTA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CtaPalette {
    /// Purple palette (rendered when no palette is given).
    #[default]
    Purple,
    /// Green palette.
    Green,
}

impl CtaPalette {
    /// All palettes in declaration order.
    pub const ALL: [Self; 2] = [Self::Purple, Self::Green];

    /// Returns the stable wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Purple => "purple",
            Self::Green => "green",
        }
    }

    /// Parses an exact wire label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|palette| palette.as_str() == label)
    }
}

impl fmt::Display for CtaPalette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visual treatment for the CTA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CtaStyle {
    /// Filled button (rendered when no style is given).
    #[default]
    Solid,
    /// Text-only link.
    Text,
    /// Animated shimmer.
    Shimmer,
    /// Gradient border wrapper.
    Border,
}

impl CtaStyle {
    /// All styles in declaration order.
    pub const ALL: [Self; 4] = [Self::Solid, Self::Text, Self::Shimmer, Self::Border];

    /// Returns the stable wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::Text => "text",
            Self::Shimmer => "shimmer",
            Self::Border => "border",
        }
    }

    /// Parses an exact wire label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|style| style.as_str() == label)
    }
}

impl fmt::Display for CtaStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Payload
// ============================================================================

/// Navigation decision for an accepted CTA link.
///
/// # Invariants
/// - `Internal` holds a root-relative path (single leading `/`).
/// - `External` holds an `http` or `https` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CtaTarget {
    /// Same-origin path handled by in-app navigation.
    Internal(String),
    /// Absolute URL handed to the external-open action.
    External(Url),
}

impl CtaTarget {
    /// Returns the link as rendered (canonical form for external URLs).
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Internal(path) => path,
            Self::External(url) => url.as_str(),
        }
    }

    /// Returns true for in-app navigation targets.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

/// Validated sidebar call-to-action.
///
/// # Invariants
/// - Only constructed by the validator; fields are immutable.
/// - `text` and `emoji` are trimmed and non-empty.
/// - The link is never empty, never protocol-relative, and never a
///   non-http(s) scheme.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Value")]
pub struct CtaPayload {
    /// Label text.
    text: String,
    /// Classified link.
    target: CtaTarget,
    /// Optional palette.
    palette: Option<CtaPalette>,
    /// Optional style.
    style: Option<CtaStyle>,
    /// Optional leading emoji.
    emoji: Option<String>,
}

impl CtaPayload {
    /// Returns the label text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the link string.
    #[must_use]
    pub fn url(&self) -> &str {
        self.target.as_str()
    }

    /// Returns the navigation target.
    #[must_use]
    pub const fn target(&self) -> &CtaTarget {
        &self.target
    }

    /// Returns the palette as configured.
    #[must_use]
    pub const fn palette(&self) -> Option<CtaPalette> {
        self.palette
    }

    /// Returns the style as configured.
    #[must_use]
    pub const fn style(&self) -> Option<CtaStyle> {
        self.style
    }

    /// Returns the palette to render, falling back to purple.
    #[must_use]
    pub fn palette_or_default(&self) -> CtaPalette {
        self.palette.unwrap_or_default()
    }

    /// Returns the style to render, falling back to solid.
    #[must_use]
    pub fn style_or_default(&self) -> CtaStyle {
        self.style.unwrap_or_default()
    }

    /// Returns the leading emoji.
    #[must_use]
    pub fn emoji(&self) -> Option<&str> {
        self.emoji.as_deref()
    }
}

/// Borrowed wire form used for serialization.
#[derive(Serialize)]
struct CtaPayloadWire<'a> {
    /// Label text.
    text: &'a str,
    /// Link string.
    url: &'a str,
    /// Optional palette.
    #[serde(skip_serializing_if = "Option::is_none")]
    palette: Option<CtaPalette>,
    /// Optional style.
    #[serde(skip_serializing_if = "Option::is_none")]
    style: Option<CtaStyle>,
    /// Optional emoji.
    #[serde(skip_serializing_if = "Option::is_none")]
    emoji: Option<&'a str>,
}

impl Serialize for CtaPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        CtaPayloadWire {
            text: &self.text,
            url: self.url(),
            palette: self.palette,
            style: self.style,
            emoji: self.emoji.as_deref(),
        }
        .serialize(serializer)
    }
}

impl TryFrom<Value> for CtaPayload {
    type Error = ValidationRejected;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        validate_sidebar_cta_payload(&value)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Why a payload was rejected. Labels are stable for audit output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    /// Payload is not a JSON object.
    NotAnObject,
    /// Required field is missing.
    MissingField(&'static str),
    /// Field has the wrong JSON type.
    InvalidType(&'static str),
    /// String field is empty after trimming.
    EmptyField(&'static str),
    /// Enum field holds a value outside its closed set.
    UnsupportedVariant(&'static str),
    /// Link is neither internal nor an absolute URL.
    InvalidUrl,
    /// Absolute URL uses a scheme other than http or https.
    DisallowedScheme,
}

impl RejectionReason {
    /// Returns the stable reason label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NotAnObject => "not_an_object",
            Self::MissingField(_) => "missing_field",
            Self::InvalidType(_) => "invalid_type",
            Self::EmptyField(_) => "empty_field",
            Self::UnsupportedVariant(_) => "unsupported_variant",
            Self::InvalidUrl => "invalid_url",
            Self::DisallowedScheme => "disallowed_scheme",
        }
    }

    /// Returns the offending field, when the reason is field-specific.
    #[must_use]
    pub const fn field(self) -> Option<&'static str> {
        match self {
            Self::MissingField(field)
            | Self::InvalidType(field)
            | Self::EmptyField(field)
            | Self::UnsupportedVariant(field) => Some(field),
            Self::InvalidUrl | Self::DisallowedScheme => Some("url"),
            Self::NotAnObject => None,
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field() {
            Some(field) => write!(f, "{} ({field})", self.label()),
            None => f.write_str(self.label()),
        }
    }
}

/// The single validation failure kind for CTA payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("sidebar cta payload rejected: {reason}")]
pub struct ValidationRejected {
    /// First violation encountered.
    reason: RejectionReason,
}

impl ValidationRejected {
    /// Returns the first violation encountered.
    #[must_use]
    pub const fn reason(&self) -> RejectionReason {
        self.reason
    }
}

impl From<RejectionReason> for ValidationRejected {
    fn from(reason: RejectionReason) -> Self {
        Self {
            reason,
        }
    }
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates an untrusted payload, returning `None` on any violation.
#[must_use]
pub fn parse_sidebar_cta_payload(payload: &Value) -> Option<CtaPayload> {
    validate_sidebar_cta_payload(payload).ok()
}

/// Validates an untrusted payload and reports the first violation.
///
/// # Errors
///
/// Returns [`ValidationRejected`] when the payload shape is wrong, a closed
/// enum is out of range, or the link is not an internal path or http(s) URL.
pub fn validate_sidebar_cta_payload(payload: &Value) -> Result<CtaPayload, ValidationRejected> {
    let Value::Object(map) = payload else {
        return Err(RejectionReason::NotAnObject.into());
    };
    let text = required_string(map, "text")?;
    let url = required_string(map, "url")?;
    let palette = optional_enum(map, "palette", CtaPalette::from_label)?;
    let style = optional_enum(map, "style", CtaStyle::from_label)?;
    let emoji = optional_string(map, "emoji")?;
    let target = resolve_target(url)?;
    Ok(CtaPayload {
        text: text.to_string(),
        target,
        palette,
        style,
        emoji: emoji.map(str::to_string),
    })
}

/// Classifies the link and canonicalizes external URLs.
fn resolve_target(url: &str) -> Result<CtaTarget, RejectionReason> {
    if is_internal_url(url) {
        return Ok(CtaTarget::Internal(url.to_string()));
    }
    // No base URL: protocol-relative and bare relative strings fail here.
    let parsed = Url::parse(url).map_err(|_| RejectionReason::InvalidUrl)?;
    match parsed.scheme() {
        "http" | "https" => Ok(CtaTarget::External(parsed)),
        _ => Err(RejectionReason::DisallowedScheme),
    }
}

/// Reads a required, non-empty trimmed string field.
fn required_string<'a>(
    map: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, RejectionReason> {
    let value = map.get(field).ok_or(RejectionReason::MissingField(field))?;
    trimmed_string(value, field)
}

/// Reads an optional, non-empty trimmed string field.
fn optional_string<'a>(
    map: &'a Map<String, Value>,
    field: &'static str,
) -> Result<Option<&'a str>, RejectionReason> {
    map.get(field).map(|value| trimmed_string(value, field)).transpose()
}

/// Reads an optional closed-enum field.
fn optional_enum<T>(
    map: &Map<String, Value>,
    field: &'static str,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>, RejectionReason> {
    let Some(value) = map.get(field) else {
        return Ok(None);
    };
    let Value::String(label) = value else {
        return Err(RejectionReason::InvalidType(field));
    };
    parse(label).map(Some).ok_or(RejectionReason::UnsupportedVariant(field))
}

/// Trims a string value and rejects non-strings and blank strings.
fn trimmed_string<'a>(value: &'a Value, field: &'static str) -> Result<&'a str, RejectionReason> {
    let Value::String(raw) = value else {
        return Err(RejectionReason::InvalidType(field));
    };
    let trimmed = trim_js_whitespace(raw);
    if trimmed.is_empty() {
        return Err(RejectionReason::EmptyField(field));
    }
    Ok(trimmed)
}

/// Trims leading and trailing ECMAScript whitespace and line terminators.
///
/// Payloads are authored for a JavaScript runtime, so the trim set is the
/// ECMAScript one: U+FEFF is stripped and U+0085 is kept, unlike
/// [`str::trim`].
pub(crate) fn trim_js_whitespace(raw: &str) -> &str {
    raw.trim_matches(is_js_whitespace)
}

/// Returns true for ECMAScript `WhiteSpace` and `LineTerminator` code points.
const fn is_js_whitespace(ch: char) -> bool {
    matches!(
        ch,
        '\t' | '\n'
            | '\u{0B}'
            | '\u{0C}'
            | '\r'
            | ' '
            | '\u{A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}
