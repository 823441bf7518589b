//! Request options accepted by [`PageClient::request`].
//!
//! [`PageClient::request`]: crate::PageClient::request

use courier_codec::{serialize_form, FormPayload};
use courier_types::{RequestBody, DEFAULT_TIMEOUT_MS};
use serde_json::Value;
use std::collections::BTreeMap;

/// What to request. Converted into a [`courier_types::RequestEnvelope`]
/// once a correlation ID is assigned.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub url: String,
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<RequestBody>,
    pub timeout_ms: u64,
}

impl RequestOptions {
    /// Options for a bare request with the default 30 s deadline.
    #[must_use]
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: method.into().to_ascii_uppercase(),
            headers: BTreeMap::new(),
            body: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    #[must_use]
    pub fn post(url: impl Into<String>) -> Self {
        Self::new("POST", url)
    }

    /// Set a request header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn json_body(mut self, value: Value) -> Self {
        self.body = Some(RequestBody::Json(value));
        self
    }

    /// Attach a raw text body.
    #[must_use]
    pub fn text_body(mut self, text: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Text(text.into()));
        self
    }

    /// Attach a multi-part payload, flattening it for transport.
    #[must_use]
    pub fn form_body(mut self, payload: &FormPayload) -> Self {
        self.body = Some(RequestBody::Form(serialize_form(payload)));
        self
    }

    /// Override the per-request deadline.
    #[must_use]
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}
