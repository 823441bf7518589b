//! # Outbound HTTP Port
//!
//! The seam between request handling and the actual network. The executor
//! prepares a transport-agnostic request; [`ReqwestFetcher`] is the
//! production adapter, and tests substitute stubs.

use async_trait::async_trait;
use courier_codec::{FormPayload, FormValue};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// A fully reconstructed request, ready for the network layer.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: String,
    pub url: String,
    /// Headers to send. Any caller-supplied multipart content type has
    /// already been stripped by this point.
    pub headers: BTreeMap<String, String>,
    pub payload: PreparedPayload,
}

/// The reconstructed request payload.
#[derive(Debug, Clone)]
pub enum PreparedPayload {
    /// No body.
    None,
    /// Raw text, sent as-is.
    Raw(String),
    /// JSON-encoded body.
    Json(Value),
    /// `application/x-www-form-urlencoded` pairs.
    FormUrlEncoded(Vec<(String, String)>),
    /// Native multi-part payload; the network layer generates the boundary
    /// and the multipart content-type header itself.
    Multipart(FormPayload),
}

/// What came back over the network, before envelope construction.
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    pub status: u16,
    /// Reason phrase as reported; some servers/platforms omit it.
    pub status_text: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

/// Failures from the network layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchFailure {
    /// The cancellation token fired while the call was in flight.
    #[error("fetch cancelled")]
    Cancelled,

    /// Raw transport error text, classified upstream.
    #[error("{0}")]
    Transport(String),
}

/// The outbound HTTP port.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    /// Perform the call. Implementations must abandon the in-flight
    /// operation and return [`FetchFailure::Cancelled`] once `cancel`
    /// fires.
    async fn fetch(
        &self,
        request: PreparedRequest,
        cancel: CancellationToken,
    ) -> Result<FetchedResponse, FetchFailure>;
}

/// Production adapter over [`reqwest`].
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Build the adapter with credential-including defaults: cookies in,
    /// cross-origin allowed, no client-side timeout (the executor owns the
    /// deadline via the cancellation token).
    pub fn new() -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self { client })
    }

    fn build_request(
        &self,
        request: &PreparedRequest,
    ) -> Result<reqwest::RequestBuilder, FetchFailure> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|e| FetchFailure::Transport(format!("invalid method: {e}")))?;

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        builder = match &request.payload {
            PreparedPayload::None => builder,
            PreparedPayload::Raw(text) => builder.body(text.clone()),
            PreparedPayload::Json(value) => builder.json(value),
            PreparedPayload::FormUrlEncoded(pairs) => builder.form(pairs),
            PreparedPayload::Multipart(payload) => {
                builder.multipart(multipart_form(payload)?)
            }
        };
        Ok(builder)
    }
}

/// Rebuild a native multi-part form, preserving entry order and bytes.
fn multipart_form(payload: &FormPayload) -> Result<reqwest::multipart::Form, FetchFailure> {
    let mut form = reqwest::multipart::Form::new();
    for (key, value) in &payload.entries {
        form = match value {
            FormValue::Text(text) => form.text(key.clone(), text.clone()),
            FormValue::Blob(blob) => {
                let part = reqwest::multipart::Part::bytes(blob.bytes.clone())
                    .file_name(blob.name.clone())
                    .mime_str(&blob.mime_type)
                    .map_err(|e| {
                        FetchFailure::Transport(format!("invalid mime type {}: {e}", blob.mime_type))
                    })?;
                form.part(key.clone(), part)
            }
        };
    }
    Ok(form)
}

#[async_trait]
impl HttpFetch for ReqwestFetcher {
    async fn fetch(
        &self,
        request: PreparedRequest,
        cancel: CancellationToken,
    ) -> Result<FetchedResponse, FetchFailure> {
        let builder = self.build_request(&request)?;

        let response = tokio::select! {
            () = cancel.cancelled() => return Err(FetchFailure::Cancelled),
            result = builder.send() => {
                result.map_err(|e| FetchFailure::Transport(e.to_string()))?
            }
        };

        let status = response.status();
        let status_text = status.canonical_reason().map(str::to_string);
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();

        let body = tokio::select! {
            () = cancel.cancelled() => return Err(FetchFailure::Cancelled),
            body = response.text() => {
                body.map_err(|e| FetchFailure::Transport(e.to_string()))?
            }
        };

        Ok(FetchedResponse {
            status: status.as_u16(),
            status_text,
            headers,
            body,
        })
    }
}
