//! # Response Construction
//!
//! Turns a [`FetchedResponse`] into the [`ResponseEnvelope`] sent back
//! across the relay: status-text fallback, flattened headers, raw body,
//! and the opportunistic structured parse.

use crate::fetch::FetchedResponse;
use courier_types::ResponseEnvelope;
use serde_json::Value;
use std::collections::BTreeMap;

/// Reason phrases for servers/platforms that omit them.
#[must_use]
pub fn fallback_status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        409 => "Conflict",
        413 => "Payload Too Large",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "Unknown Status",
    }
}

/// Whether the body looks like structured data worth parsing: either the
/// content type says so, or the trimmed body's first character sniffs as
/// JSON (mislabeled APIs are common).
fn should_attempt_parse(headers: &BTreeMap<String, String>, body: &str) -> bool {
    let content_type_says_json = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-type"))
        .is_some_and(|(_, v)| v.to_ascii_lowercase().contains("json"));
    if content_type_says_json {
        return true;
    }
    matches!(body.trim_start().chars().next(), Some('{' | '['))
}

/// Build the response envelope. A failed parse never fails the call; it
/// only leaves `body_parsed` unset.
#[must_use]
pub fn build_response(fetched: FetchedResponse) -> ResponseEnvelope {
    let status_text = fetched
        .status_text
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| fallback_status_text(fetched.status).to_string());

    let body_parsed = if should_attempt_parse(&fetched.headers, &fetched.body) {
        serde_json::from_str::<Value>(&fetched.body).ok()
    } else {
        None
    };

    ResponseEnvelope {
        ok: (200..300).contains(&fetched.status),
        status: fetched.status,
        status_text,
        headers: fetched.headers,
        body: fetched.body,
        body_parsed,
    }
}
