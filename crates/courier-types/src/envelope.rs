//! # Request and Response Envelopes
//!
//! The universal records for one logical cross-origin request.
//!
//! ## Correlation
//!
//! - Requests carry a fresh correlation `id` minted by the page client.
//! - Responses are matched to their request purely by that `id`.
//!
//! ## Lifetime
//!
//! A `RequestEnvelope` exists only as carrier-node text and as a message
//! port payload. It is never persisted anywhere.

use crate::body::RequestBody;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Default per-request deadline when the caller does not set one.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// One outbound cross-origin request, as published by the page client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope {
    /// Correlation ID linking this request across all three contexts.
    pub id: String,

    /// Absolute target URL.
    pub url: String,

    /// HTTP method, upper-case ("GET", "POST", ...).
    pub method: String,

    /// Request headers. Ordered map so envelope encoding is deterministic.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Request body, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<RequestBody>,

    /// Per-request deadline in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl RequestEnvelope {
    /// Create a bodiless GET envelope with the default deadline.
    #[must_use]
    pub fn get(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            method: "GET".to_string(),
            headers: BTreeMap::new(),
            body: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Look up a header value, matching the name case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The content type the caller negotiated, if any.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

/// The settled outcome of one cross-origin request.
///
/// `body` is always present as raw text. `body_parsed` is populated only
/// when the content type indicated structured data (or the body sniffed as
/// JSON) and the parse succeeded; its absence is never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    /// HTTP status code. `0` for synthetic failure envelopes.
    pub status: u16,

    /// Reason phrase, with a fallback for servers that omit it.
    pub status_text: String,

    /// Flattened response headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Raw response body text. Always present.
    #[serde(default)]
    pub body: String,

    /// Structured parse of `body`, when one succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_parsed: Option<Value>,

    /// True when `status` is in the 2xx range.
    pub ok: bool,
}

impl ResponseEnvelope {
    /// The synthetic envelope a request settles with when its page-side
    /// deadline fires before any reply arrives.
    ///
    /// Deliberately a *resolution*, not a rejection: callers that only
    /// check `status`/`ok` need no separate failure path.
    #[must_use]
    pub fn timed_out() -> Self {
        Self {
            status: 0,
            status_text: "timeout".to_string(),
            headers: BTreeMap::new(),
            body: String::new(),
            body_parsed: None,
            ok: false,
        }
    }

    /// Whether the response content type indicates structured data.
    #[must_use]
    pub fn has_json_content_type(&self) -> bool {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-type"))
            .is_some_and(|(_, v)| v.to_ascii_lowercase().contains("json"))
    }
}
