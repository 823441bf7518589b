//! # Board Events and Diagnostics
//!
//! Typed events the relay agent dispatches back onto the shared document
//! board, plus the best-effort observability summary.

use crate::envelope::ResponseEnvelope;
use serde::{Deserialize, Serialize};

/// A reply event dispatched on the shared document board.
///
/// Exactly one of these settles each published carrier node: either the
/// executor's response or a normalized error message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BoardEvent {
    /// The executor produced a response for the correlated request.
    Response {
        id: String,
        response: ResponseEnvelope,
    },
    /// The request failed; `error` is the normalized message.
    Error { id: String, error: String },
}

impl BoardEvent {
    /// The correlation ID this event settles.
    #[must_use]
    pub fn correlation_id(&self) -> &str {
        match self {
            Self::Response { id, .. } | Self::Error { id, .. } => id,
        }
    }
}

/// Best-effort request/response summary broadcast for observers.
///
/// Delivery is not guaranteed and failures never affect the request itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSummary {
    /// Correlation ID of the summarized request.
    pub id: String,
    /// Target URL.
    pub url: String,
    /// HTTP method.
    pub method: String,
    /// Response status, when a response was produced.
    pub status: Option<u16>,
    /// Wall-clock duration of the executor-side handling.
    pub duration_ms: u64,
    /// Error message, when the request failed.
    pub error: Option<String>,
}
