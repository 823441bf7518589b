//! # Page Client
//!
//! Publishes request envelopes as carrier nodes and settles them from the
//! correlated reply events the relay agent dispatches back on the board.

use crate::options::RequestOptions;
use crate::pending::PendingTable;
use courier_codec::{carrier_node_id, encode_carrier};
use courier_transport::{BoardEvents, CarrierNode, DocumentBoard};
use courier_types::{BoardEvent, RequestEnvelope, ResponseEnvelope};
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

/// Errors surfaced to page callers.
///
/// All relay failures are normalized to a single message string at this
/// boundary; classification detail lives in the executor only.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// The relay reported a failure for this request.
    #[error("{0}")]
    Request(String),

    /// The envelope could not be encoded for transport.
    #[error("failed to encode request envelope: {0}")]
    Encode(String),

    /// The board's event channel closed while the request was pending.
    #[error("document board closed while request was pending")]
    BoardClosed,
}

/// The page-context client.
///
/// Cheap to share via `Arc`; supports unbounded concurrent in-flight
/// requests, each with its own correlation ID, deadline, and entry.
pub struct PageClient {
    board: Arc<DocumentBoard>,
    pending: Arc<PendingTable>,
    /// Instance prefix for correlation IDs.
    instance: String,
    /// Monotonic per-instance sequence.
    next_seq: AtomicU64,
    /// Event pump settling pending entries from board events.
    pump: JoinHandle<()>,
}

impl PageClient {
    /// Create a client bound to a document board.
    ///
    /// Subscribes to reply events before returning, so no event published
    /// after construction can be missed.
    #[must_use]
    pub fn new(board: Arc<DocumentBoard>) -> Self {
        let pending = Arc::new(PendingTable::default());
        let events = board.events();
        let pump = tokio::spawn(Self::pump_events(events, Arc::clone(&pending)));

        let mut instance = Uuid::new_v4().simple().to_string();
        instance.truncate(8);

        Self {
            board,
            pending,
            instance,
            next_seq: AtomicU64::new(0),
            pump,
        }
    }

    /// Perform one cross-origin request through the relay.
    ///
    /// Settles exactly once. Deadline expiry resolves (never rejects) with
    /// the synthetic timeout envelope; the executor-side work, if any, runs
    /// on unobserved.
    pub async fn request(&self, options: RequestOptions) -> Result<ResponseEnvelope, ClientError> {
        let id = self.next_correlation_id();
        let envelope = RequestEnvelope {
            id: id.clone(),
            url: options.url,
            method: options.method,
            headers: options.headers,
            body: options.body,
            timeout_ms: options.timeout_ms,
        };

        let text = encode_carrier(&envelope).map_err(|e| ClientError::Encode(e.to_string()))?;

        let mut settled = self.pending.insert(&id);
        self.board
            .append(CarrierNode::new(carrier_node_id(&id), text));
        debug!(id = %id, url = %envelope.url, timeout_ms = envelope.timeout_ms, "Request published");

        tokio::select! {
            biased;
            outcome = &mut settled => match outcome {
                Ok(outcome) => outcome,
                // Entry vanished without settling; only possible if the
                // pump died with the board.
                Err(_) => Err(ClientError::BoardClosed),
            },
            () = tokio::time::sleep(Duration::from_millis(envelope.timeout_ms)) => {
                // Destroy the entry so any late reply becomes a no-op.
                self.pending.forget(&id);
                warn!(id = %id, timeout_ms = envelope.timeout_ms, "Request deadline expired");
                Ok(ResponseEnvelope::timed_out())
            }
        }
    }

    /// Number of requests currently awaiting settlement.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn next_correlation_id(&self) -> String {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", self.instance, seq)
    }

    async fn pump_events(mut events: BoardEvents, pending: Arc<PendingTable>) {
        while let Some(event) = events.recv().await {
            match event {
                BoardEvent::Response { id, mut response } => {
                    reconcile_parsed_body(&mut response);
                    if !pending.settle(&id, Ok(response)) {
                        // Already settled or timed out; late replies drop.
                        debug!(id = %id, "Uncorrelated response event ignored");
                    }
                }
                BoardEvent::Error { id, error } => {
                    if !pending.settle(&id, Err(ClientError::Request(error))) {
                        debug!(id = %id, "Uncorrelated error event ignored");
                    }
                }
            }
        }
    }
}

impl Drop for PageClient {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

/// Reconcile `body_parsed` against the raw `body`.
///
/// When the content type indicates structured data and no parsed value
/// arrived, attempt the parse here. A parse failure never errors the
/// request; it yields a diagnostic wrapper so callers can see what came
/// back.
fn reconcile_parsed_body(response: &mut ResponseEnvelope) {
    if response.body_parsed.is_some() || !response.has_json_content_type() {
        return;
    }
    if response.body.trim().is_empty() {
        return;
    }
    response.body_parsed = match serde_json::from_str(&response.body) {
        Ok(value) => Some(value),
        Err(e) => Some(json!({
            "parseError": e.to_string(),
            "raw": response.body,
        })),
    };
}
