//! # Document Board
//!
//! Models the document tree the page and mediating contexts share: a store
//! of carrier nodes with added-node notifications, plus a broadcast channel
//! for the typed reply events the agent dispatches back to the page.
//!
//! ## Lifecycle rules
//!
//! - A carrier node is created once (by the page client), consumed at most
//!   once (by the relay agent), and removed by the agent.
//! - `remove` is idempotent; a second removal is a no-op.
//! - The board is constructed at context startup and handed by reference
//!   into handlers; it carries no cross-context persistence.

use crate::DEFAULT_CHANNEL_CAPACITY;
use courier_types::BoardEvent;
use parking_lot::RwLock;
use std::collections::HashMap;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// One element of the shared document tree carrying an encoded envelope.
#[derive(Debug, Clone)]
pub struct CarrierNode {
    /// Node identifier; embeds the correlation ID per the carrier
    /// naming convention.
    pub id: String,
    /// Encoded envelope text.
    pub text: String,
    /// Set once the agent has picked the node up.
    processing: bool,
}

impl CarrierNode {
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            processing: false,
        }
    }

    /// Whether the agent has already started handling this node.
    #[must_use]
    pub fn is_processing(&self) -> bool {
        self.processing
    }
}

/// The shared document board.
pub struct DocumentBoard {
    /// Carrier nodes currently attached.
    nodes: RwLock<HashMap<String, CarrierNode>>,

    /// Added-node notifications for structural observers.
    added_tx: broadcast::Sender<String>,

    /// Typed reply events dispatched back toward the page context.
    events_tx: broadcast::Sender<BoardEvent>,
}

impl DocumentBoard {
    /// Create a board with default notification capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a board with a specific notification capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (added_tx, _) = broadcast::channel(capacity);
        let (events_tx, _) = broadcast::channel(capacity);
        Self {
            nodes: RwLock::new(HashMap::new()),
            added_tx,
            events_tx,
        }
    }

    /// Attach a carrier node and notify structural observers.
    pub fn append(&self, node: CarrierNode) {
        let id = node.id.clone();
        self.nodes.write().insert(id.clone(), node);
        debug!(node = %id, "Carrier node appended");
        // No observers yet is fine: the agent scans existing nodes at startup.
        let _ = self.added_tx.send(id);
    }

    /// Ids of carrier nodes currently attached.
    ///
    /// The agent runs this one-time scan at startup to cover nodes
    /// published before observation began.
    #[must_use]
    pub fn snapshot(&self) -> Vec<String> {
        self.nodes.read().keys().cloned().collect()
    }

    /// The encoded text of a node, if it is still attached.
    #[must_use]
    pub fn text(&self, node_id: &str) -> Option<String> {
        self.nodes.read().get(node_id).map(|n| n.text.clone())
    }

    /// Whether a node is attached and already being handled.
    #[must_use]
    pub fn is_processing(&self, node_id: &str) -> bool {
        self.nodes
            .read()
            .get(node_id)
            .is_some_and(CarrierNode::is_processing)
    }

    /// Mark a node as picked up. Returns false when the node is gone or
    /// was already marked, so at most one caller wins.
    pub fn mark_processing(&self, node_id: &str) -> bool {
        let mut nodes = self.nodes.write();
        match nodes.get_mut(node_id) {
            Some(node) if !node.processing => {
                node.processing = true;
                true
            }
            _ => false,
        }
    }

    /// Detach a node. Idempotent.
    pub fn remove(&self, node_id: &str) -> bool {
        let removed = self.nodes.write().remove(node_id).is_some();
        if removed {
            debug!(node = %node_id, "Carrier node removed");
        }
        removed
    }

    /// Number of carrier nodes currently attached.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.read().len()
    }

    /// Subscribe to added-node notifications.
    #[must_use]
    pub fn watch_added(&self) -> AddedNodes {
        AddedNodes {
            receiver: self.added_tx.subscribe(),
        }
    }

    /// Dispatch a typed reply event toward the page context.
    ///
    /// Returns the number of subscribers that received it. Zero receivers
    /// means the page context is gone; the event is dropped.
    pub fn dispatch(&self, event: BoardEvent) -> usize {
        let id = event.correlation_id().to_string();
        match self.events_tx.send(event) {
            Ok(receivers) => {
                debug!(id = %id, receivers, "Board event dispatched");
                receivers
            }
            Err(_) => {
                warn!(id = %id, "Board event dropped (no receivers)");
                0
            }
        }
    }

    /// Subscribe to typed reply events.
    #[must_use]
    pub fn events(&self) -> BoardEvents {
        BoardEvents {
            receiver: self.events_tx.subscribe(),
        }
    }
}

impl Default for DocumentBoard {
    fn default() -> Self {
        Self::new()
    }
}

/// Subscription to added-node notifications.
pub struct AddedNodes {
    receiver: broadcast::Receiver<String>,
}

impl AddedNodes {
    /// Next added node id, or `None` once the board is gone.
    pub async fn recv(&mut self) -> Option<String> {
        loop {
            match self.receiver.recv().await {
                Ok(id) => return Some(id),
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    warn!(lagged = count, "Node observer lagged, notifications dropped");
                }
            }
        }
    }
}

/// Subscription to typed reply events.
pub struct BoardEvents {
    receiver: broadcast::Receiver<BoardEvent>,
}

impl BoardEvents {
    /// Next reply event, or `None` once the board is gone.
    pub async fn recv(&mut self) -> Option<BoardEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    warn!(lagged = count, "Event subscriber lagged, events dropped");
                }
            }
        }
    }
}
