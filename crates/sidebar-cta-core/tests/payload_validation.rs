//! Sidebar CTA payload validation tests.
//!
//! ## Purpose
//! These tests pin the accept/reject contract for remotely delivered CTA
//! payloads: shape checks, closed enums, trimming, and link safety.
//!
//! ## Threat model
//! - Remote flag payloads may carry script, data, or file URLs.
//! - Protocol-relative links must never be treated as same-origin.
// crates/sidebar-cta-core/tests/payload_validation.rs
// ============================================================================
// Module: Payload Validation Tests
// Description: Accept/reject behavior of the CTA payload validator.
// Purpose: Ensure unsafe or malformed payloads are dropped silently.
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

use serde_json::Value;
use serde_json::json;
use sidebar_cta_core::CtaPalette;
use sidebar_cta_core::CtaPayload;
use sidebar_cta_core::CtaStyle;
use sidebar_cta_core::CtaTarget;
use sidebar_cta_core::RejectionReason;
use sidebar_cta_core::parse_sidebar_cta_payload;
use sidebar_cta_core::validate_sidebar_cta_payload;

fn accepted(payload: &Value) -> CtaPayload {
    parse_sidebar_cta_payload(payload).expect("payload should be accepted")
}

fn rejection(payload: &Value) -> RejectionReason {
    validate_sidebar_cta_payload(payload).expect_err("payload should be rejected").reason()
}

// ============================================================================
// SECTION: Accepted Payloads
// ============================================================================

#[test]
fn external_payload_round_trips_unchanged() {
    let input = json!({
        "text": "Vote on Product Hunt",
        "url": "https://www.producthunt.com/posts/amical",
        "palette": "purple",
        "style": "solid",
        "emoji": "🚀",
    });
    let cta = accepted(&input);
    assert_eq!(cta.text(), "Vote on Product Hunt");
    assert_eq!(cta.url(), "https://www.producthunt.com/posts/amical");
    assert_eq!(cta.palette(), Some(CtaPalette::Purple));
    assert_eq!(cta.style(), Some(CtaStyle::Solid));
    assert_eq!(cta.emoji(), Some("🚀"));
    assert_eq!(serde_json::to_value(&cta).unwrap(), input);
}

#[test]
fn internal_payload_is_kept_verbatim() {
    let input = json!({
        "text": "Read changelog",
        "url": "/settings/about",
        "palette": "green",
        "style": "border",
    });
    let cta = accepted(&input);
    assert_eq!(cta.target(), &CtaTarget::Internal("/settings/about".to_string()));
    assert_eq!(serde_json::to_value(&cta).unwrap(), input);
}

#[test]
fn external_urls_are_canonicalized() {
    let cta = accepted(&json!({"text": "Docs", "url": "HTTPS://Amical.AI"}));
    assert_eq!(cta.url(), "https://amical.ai/");
    assert!(!cta.target().is_internal());

    let cta = accepted(&json!({"text": "Docs", "url": "http://amical.ai/a/../docs"}));
    assert_eq!(cta.url(), "http://amical.ai/docs");
}

#[test]
fn string_fields_are_trimmed() {
    let cta = accepted(&json!({
        "text": "  Read changelog  ",
        "url": "\t/settings/about\n",
        "emoji": " ✨ ",
    }));
    assert_eq!(cta.text(), "Read changelog");
    assert_eq!(cta.url(), "/settings/about");
    assert_eq!(cta.emoji(), Some("✨"));
}

#[test]
fn trimming_strips_byte_order_marks_and_keeps_next_line() {
    let cta = accepted(&json!({
        "text": "\u{85}Read changelog\u{3000}",
        "url": "\u{FEFF}/settings/about\u{2028}",
        "emoji": "\u{A0}✨\u{FEFF}",
    }));
    assert_eq!(cta.text(), "\u{85}Read changelog");
    assert_eq!(cta.target(), &CtaTarget::Internal("/settings/about".to_string()));
    assert_eq!(cta.emoji(), Some("✨"));
    assert_eq!(
        rejection(&json!({"text": "\u{FEFF}", "url": "/settings/about"})),
        RejectionReason::EmptyField("text")
    );
}

#[test]
fn unknown_fields_are_ignored() {
    let cta = accepted(&json!({
        "text": "Join the community",
        "url": "https://amical.ai/community",
        "variant": "b",
        "priority": 3,
    }));
    let serialized = serde_json::to_value(&cta).unwrap();
    assert_eq!(serialized, json!({"text": "Join the community", "url": "https://amical.ai/community"}));
}

#[test]
fn absent_optionals_fall_back_to_render_defaults() {
    let cta = accepted(&json!({"text": "Docs", "url": "/docs"}));
    assert_eq!(cta.palette(), None);
    assert_eq!(cta.style(), None);
    assert_eq!(cta.palette_or_default(), CtaPalette::Purple);
    assert_eq!(cta.style_or_default(), CtaStyle::Solid);
}

#[test]
fn every_closed_variant_is_accepted() {
    for palette in CtaPalette::ALL {
        for style in CtaStyle::ALL {
            let cta = accepted(&json!({
                "text": "x",
                "url": "/x",
                "palette": palette.as_str(),
                "style": style.as_str(),
            }));
            assert_eq!(cta.palette(), Some(palette));
            assert_eq!(cta.style(), Some(style));
        }
    }
}

#[test]
fn revalidating_an_accepted_payload_is_idempotent() {
    let first = accepted(&json!({"text": " Docs ", "url": "HTTPS://Example.COM", "style": "shimmer"}));
    let second = accepted(&serde_json::to_value(&first).unwrap());
    assert_eq!(first, second);
}

#[test]
fn deserialization_goes_through_the_validator() {
    let cta: CtaPayload =
        serde_json::from_str(r#"{"text":"Docs","url":"https://amical.ai/docs"}"#).unwrap();
    assert_eq!(cta.url(), "https://amical.ai/docs");

    let error = serde_json::from_str::<CtaPayload>(r#"{"text":"Bad","url":"javascript:alert(1)"}"#)
        .unwrap_err();
    assert!(error.to_string().contains("disallowed_scheme"));
}

// ============================================================================
// SECTION: Rejected Payloads
// ============================================================================

#[test]
fn non_http_schemes_are_rejected() {
    for url in [
        "javascript:alert(1)",
        "data:text/plain,hello",
        "file:///tmp/amical.txt",
        "ftp://amical.ai/file",
        "mailto:hello@amical.ai",
    ] {
        let payload = json!({"text": "Bad Link", "url": url});
        assert_eq!(parse_sidebar_cta_payload(&payload), None, "{url}");
        assert_eq!(rejection(&payload), RejectionReason::DisallowedScheme, "{url}");
    }
}

#[test]
fn paths_without_leading_slash_are_rejected() {
    let payload = json!({"text": "Read changelog", "url": "settings/about"});
    assert_eq!(parse_sidebar_cta_payload(&payload), None);
    assert_eq!(rejection(&payload), RejectionReason::InvalidUrl);
}

#[test]
fn protocol_relative_urls_are_rejected() {
    let payload = json!({"text": "Read changelog", "url": "//amical.ai/changelog"});
    assert_eq!(parse_sidebar_cta_payload(&payload), None);
    assert_eq!(rejection(&payload), RejectionReason::InvalidUrl);

    let padded = json!({"text": "Read changelog", "url": "  //amical.ai/changelog"});
    assert_eq!(parse_sidebar_cta_payload(&padded), None);
}

#[test]
fn missing_required_fields_are_rejected() {
    assert_eq!(
        rejection(&json!({"url": "https://amical.ai/changelog"})),
        RejectionReason::MissingField("text")
    );
    assert_eq!(rejection(&json!({"text": "Docs"})), RejectionReason::MissingField("url"));
}

#[test]
fn empty_required_strings_are_rejected() {
    assert_eq!(
        rejection(&json!({"text": "", "url": "/settings/about"})),
        RejectionReason::EmptyField("text")
    );
    assert_eq!(
        rejection(&json!({"text": "Read changelog", "url": ""})),
        RejectionReason::EmptyField("url")
    );
    assert_eq!(
        rejection(&json!({"text": "   ", "url": "/x"})),
        RejectionReason::EmptyField("text")
    );
}

#[test]
fn out_of_set_enum_values_are_rejected() {
    assert_eq!(
        rejection(&json!({"text": "x", "url": "/x", "style": "neon"})),
        RejectionReason::UnsupportedVariant("style")
    );
    assert_eq!(
        rejection(&json!({"text": "x", "url": "/x", "palette": "Purple"})),
        RejectionReason::UnsupportedVariant("palette")
    );
}

#[test]
fn wrong_types_are_rejected() {
    assert_eq!(rejection(&json!({"text": 5, "url": "/x"})), RejectionReason::InvalidType("text"));
    assert_eq!(
        rejection(&json!({"text": "x", "url": "/x", "palette": null})),
        RejectionReason::InvalidType("palette")
    );
    assert_eq!(
        rejection(&json!({"text": "x", "url": "/x", "emoji": ""})),
        RejectionReason::EmptyField("emoji")
    );
    assert_eq!(
        rejection(&json!({"text": "x", "url": "/x", "emoji": ["🚀"]})),
        RejectionReason::InvalidType("emoji")
    );
}

#[test]
fn non_object_payloads_are_rejected() {
    for payload in [json!(null), json!("text"), json!(["/x"]), json!(42)] {
        assert_eq!(rejection(&payload), RejectionReason::NotAnObject);
    }
}

#[test]
fn rejection_display_names_reason_and_field() {
    let error = validate_sidebar_cta_payload(&json!({"text": "x", "url": "/x", "style": "neon"}))
        .unwrap_err();
    assert_eq!(error.to_string(), "sidebar cta payload rejected: unsupported_variant (style)");
}
