//! # Relay Agent
//!
//! Structural observation of the board plus per-node forwarding over the
//! message port.

use courier_codec::{correlation_from_node_id, decode_carrier};
use courier_transport::{DocumentBoard, PortClient, TransportError};
use courier_types::{BoardEvent, PortRequest};
use std::sync::Arc;
use tracing::{debug, warn};

/// The mediating-context relay.
///
/// One agent serves one board/port pair. Node pickup is serialized on the
/// observation loop; forwarding and reply handling run as one task per
/// request, so replies may settle in any order.
pub struct RelayAgent {
    board: Arc<DocumentBoard>,
    port: PortClient,
}

impl RelayAgent {
    #[must_use]
    pub fn new(board: Arc<DocumentBoard>, port: PortClient) -> Self {
        Self { board, port }
    }

    /// Observe the board until it is gone.
    ///
    /// Subscribes to added-node notifications first, then runs a one-time
    /// scan of existing nodes, covering the race where a node was
    /// published before observation began. The processing mark keeps a
    /// node seen by both paths from being forwarded twice.
    pub async fn run(&self) {
        let mut added = self.board.watch_added();

        for node_id in self.board.snapshot() {
            self.observe_node(&node_id);
        }

        while let Some(node_id) = added.recv().await {
            self.observe_node(&node_id);
        }
        debug!("Board closed, relay agent stopping");
    }

    /// Handle one observed node; spawns the forwarding task on success.
    fn observe_node(&self, node_id: &str) {
        // Nodes outside the carrier naming convention are not ours.
        let Some(correlation_id) = correlation_from_node_id(node_id) else {
            return;
        };
        if self.board.is_processing(node_id) {
            return;
        }
        let Some(text) = self.board.text(node_id) else {
            // Already consumed between notification and pickup.
            return;
        };

        let envelope = match decode_carrier(&text) {
            Ok(envelope) => envelope,
            Err(e) => {
                // Malformed carrier: leave the node in place as evidence,
                // dispatch nothing. The page-side deadline settles it.
                warn!(node = %node_id, error = %e, "Malformed carrier node left unprocessed");
                return;
            }
        };

        if !self.board.mark_processing(node_id) {
            // Lost the race to another observation path.
            return;
        }

        debug!(id = %correlation_id, url = %envelope.url, "Forwarding request to executor");

        let board = Arc::clone(&self.board);
        let port = self.port.clone();
        let node_id = node_id.to_string();
        let correlation_id = correlation_id.to_string();

        tokio::spawn(async move {
            let event = match port.send(PortRequest::cross_origin(envelope)).await {
                Ok(reply) if reply.success => match reply.data {
                    Some(response) => BoardEvent::Response {
                        id: correlation_id,
                        response,
                    },
                    // Success with no payload: generic rejection.
                    None => BoardEvent::Error {
                        id: correlation_id,
                        error: TransportError::NoReply.to_string(),
                    },
                },
                Ok(reply) => BoardEvent::Error {
                    id: correlation_id,
                    error: reply
                        .error
                        .unwrap_or_else(|| "request failed with no error message".to_string()),
                },
                // Includes the suspended case and its "request cancelled"
                // wording.
                Err(transport) => BoardEvent::Error {
                    id: correlation_id,
                    error: transport.to_string(),
                },
            };

            board.dispatch(event);
            // Success and failure both clean up the carrier node.
            board.remove(&node_id);
        });
    }
}
