//! # Diagnostics Hub
//!
//! Best-effort broadcast of request/response summaries to any interested
//! observer (debug consoles, log sinks). Delivery failures are swallowed
//! and never affect the request being summarized.

use courier_types::RequestSummary;
use tokio::sync::broadcast;
use tracing::trace;

/// Summaries buffered per observer before older entries are dropped.
const DIAGNOSTICS_CAPACITY: usize = 256;

/// Broadcast hub for request summaries.
pub struct DiagnosticsHub {
    tx: broadcast::Sender<RequestSummary>,
}

impl DiagnosticsHub {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(DIAGNOSTICS_CAPACITY);
        Self { tx }
    }

    /// Subscribe to future summaries.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RequestSummary> {
        self.tx.subscribe()
    }

    /// Publish a summary. No observers is not an error.
    pub fn publish(&self, summary: RequestSummary) {
        trace!(id = %summary.id, url = %summary.url, status = ?summary.status, "Request summary");
        let _ = self.tx.send(summary);
    }
}

impl Default for DiagnosticsHub {
    fn default() -> Self {
        Self::new()
    }
}
