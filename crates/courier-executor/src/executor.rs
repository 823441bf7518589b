//! # Background Executor Service
//!
//! The service loop of the privileged context: policy check, payload
//! reconstruction, the deadline-bounded fetch, failure classification, and
//! the tagged reply.

use crate::classify::classify_network_failure;
use crate::diagnostics::DiagnosticsHub;
use crate::fetch::{FetchFailure, HttpFetch, PreparedPayload, PreparedRequest};
use crate::policy::AllowListPolicy;
use crate::response::build_response;
use courier_codec::deserialize_form;
use courier_transport::PortServer;
use courier_types::{
    PortReply, PortRequest, RequestBody, RequestEnvelope, RequestSummary, ResponseEnvelope,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// How often the liveness timer ticks. Exists only to keep the privileged
/// context alive; not part of request processing.
const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(20);

/// Executor-side failures. Classification detail stays here; only the
/// rendered message crosses the relay.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExecError {
    /// The allow-list policy rejected the destination.
    #[error("domain not allowed: {url}")]
    Disallowed { url: String },

    /// The deadline fired while the network call was in flight.
    #[error("request timed out after {timeout_ms}ms")]
    DeadlineExceeded { timeout_ms: u64 },

    /// A classified network failure; the message names the target URL.
    #[error("{0}")]
    Network(String),

    /// The envelope could not be turned into a network request.
    #[error("invalid request: {0}")]
    BadRequest(String),
}

/// The privileged executor.
///
/// Each request is handled independently; the only shared state is the
/// allow-list policy and the diagnostics hub.
pub struct BackgroundExecutor<F> {
    fetcher: Arc<F>,
    policy: Arc<dyn AllowListPolicy>,
    diagnostics: Arc<DiagnosticsHub>,
}

impl<F> Clone for BackgroundExecutor<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            policy: Arc::clone(&self.policy),
            diagnostics: Arc::clone(&self.diagnostics),
        }
    }
}

impl<F: HttpFetch + 'static> BackgroundExecutor<F> {
    pub fn new(fetcher: F, policy: Arc<dyn AllowListPolicy>) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            policy,
            diagnostics: Arc::new(DiagnosticsHub::new()),
        }
    }

    /// The diagnostics hub for this executor.
    #[must_use]
    pub fn diagnostics(&self) -> Arc<DiagnosticsHub> {
        Arc::clone(&self.diagnostics)
    }

    /// Serve the message port until every client is gone.
    ///
    /// Each exchange is handled on its own task, so slow requests never
    /// block the intake loop.
    pub async fn serve(&self, mut server: PortServer) {
        let keepalive = tokio::spawn(async move {
            let mut tick = tokio::time::interval(KEEPALIVE_INTERVAL);
            loop {
                tick.tick().await;
                trace!("Executor keepalive tick");
            }
        });

        while let Some(exchange) = server.next().await {
            let executor = self.clone();
            tokio::spawn(async move {
                let reply = executor.handle(exchange.request.clone()).await;
                exchange.respond(reply);
            });
        }

        keepalive.abort();
        debug!("Message port closed, executor stopping");
    }

    /// Handle one forwarded request end to end, producing the tagged reply.
    pub async fn handle(&self, request: PortRequest) -> PortReply {
        let envelope = request.data;
        let started = Instant::now();

        match self.execute(&envelope).await {
            Ok(response) => {
                self.diagnostics.publish(RequestSummary {
                    id: envelope.id.clone(),
                    url: envelope.url.clone(),
                    method: envelope.method.clone(),
                    status: Some(response.status),
                    duration_ms: started.elapsed().as_millis() as u64,
                    error: None,
                });
                PortReply::ok(response)
            }
            Err(error) => {
                warn!(id = %envelope.id, url = %envelope.url, %error, "Request failed");
                self.diagnostics.publish(RequestSummary {
                    id: envelope.id.clone(),
                    url: envelope.url.clone(),
                    method: envelope.method.clone(),
                    status: None,
                    duration_ms: started.elapsed().as_millis() as u64,
                    error: Some(error.to_string()),
                });
                PortReply::err(
                    error.to_string(),
                    Some(json!({ "url": envelope.url, "method": envelope.method })),
                )
            }
        }
    }

    async fn execute(&self, envelope: &RequestEnvelope) -> Result<ResponseEnvelope, ExecError> {
        if !self.policy.is_allowed(&envelope.url).await {
            return Err(ExecError::Disallowed {
                url: envelope.url.clone(),
            });
        }

        let prepared = prepare_request(envelope)?;
        debug!(id = %envelope.id, method = %prepared.method, url = %prepared.url, "Executing request");

        // The deadline is a cancellation token bound to timeoutMs; the
        // fetcher abandons the in-flight call once it fires.
        let cancel = CancellationToken::new();
        let watchdog = {
            let cancel = cancel.clone();
            let timeout = Duration::from_millis(envelope.timeout_ms);
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                cancel.cancel();
            })
        };

        let result = self.fetcher.fetch(prepared, cancel).await;
        watchdog.abort();

        match result {
            Ok(fetched) => Ok(build_response(fetched)),
            Err(FetchFailure::Cancelled) => Err(ExecError::DeadlineExceeded {
                timeout_ms: envelope.timeout_ms,
            }),
            Err(FetchFailure::Transport(raw)) => Err(ExecError::Network(
                classify_network_failure(&raw, &envelope.url),
            )),
        }
    }
}

/// Reconstruct the network request from the envelope.
///
/// - Serialized forms become native multi-part payloads; any caller
///   multipart content-type header is stripped so the network layer
///   generates its own boundary.
/// - Plain JSON bodies encode as JSON, or as URL-encoded form data when
///   the negotiated content type asks for it.
fn prepare_request(envelope: &RequestEnvelope) -> Result<PreparedRequest, ExecError> {
    let mut headers = envelope.headers.clone();

    let payload = match &envelope.body {
        None => PreparedPayload::None,
        Some(RequestBody::Text(text)) => PreparedPayload::Raw(text.clone()),
        Some(RequestBody::Form(form)) => {
            headers.retain(|name, value| {
                !(name.eq_ignore_ascii_case("content-type")
                    && value.to_ascii_lowercase().contains("multipart"))
            });
            let payload = deserialize_form(form)
                .map_err(|e| ExecError::BadRequest(format!("unreadable form payload: {e}")))?;
            PreparedPayload::Multipart(payload)
        }
        Some(RequestBody::Json(value)) => {
            let wants_form = envelope
                .content_type()
                .is_some_and(|ct| ct.to_ascii_lowercase().contains("x-www-form-urlencoded"));
            if wants_form {
                PreparedPayload::FormUrlEncoded(flatten_form_pairs(value)?)
            } else {
                PreparedPayload::Json(value.clone())
            }
        }
    };

    Ok(PreparedRequest {
        method: envelope.method.clone(),
        url: envelope.url.clone(),
        headers,
        payload,
    })
}

/// Flatten a top-level JSON object into URL-encoded pairs. String values
/// are taken verbatim; everything else keeps its JSON rendering.
fn flatten_form_pairs(value: &Value) -> Result<Vec<(String, String)>, ExecError> {
    let object = value.as_object().ok_or_else(|| {
        ExecError::BadRequest("form-encoded body requires a JSON object".to_string())
    })?;
    Ok(object
        .iter()
        .map(|(key, value)| {
            let rendered = match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            (key.clone(), rendered)
        })
        .collect())
}
