//! # Message Port
//!
//! The narrow channel between the mediating context and the privileged
//! executor, shaped as typed async request/reply.
//!
//! ## Design
//!
//! - [`PortClient::send`] returns a tagged result: the executor's
//!   [`PortReply`] or a [`TransportError`].
//! - Page suspension (back/forward cache) is modeled as an explicit
//!   [`CancellationToken`]: once [`PortClient::suspend`] fires, in-flight
//!   and subsequent sends resolve to [`TransportError::Suspended`].
//! - There is no backpressure: the underlying channel is unbounded, so
//!   callers may have unboundedly many requests in flight.

use courier_types::{PortReply, PortRequest};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Errors from sending over the message port.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The page context was suspended before a reply arrived.
    #[error("request cancelled: page context suspended before a reply arrived")]
    Suspended,

    /// The executor side of the port is gone.
    #[error("message channel closed")]
    Closed,

    /// The reply callback fired with no payload.
    #[error("empty reply from executor")]
    NoReply,
}

/// One request awaiting its reply on the executor side.
///
/// Dropping an exchange without calling [`PortExchange::respond`] surfaces
/// as [`TransportError::NoReply`] at the client.
pub struct PortExchange {
    /// The forwarded request.
    pub request: PortRequest,
    reply_tx: oneshot::Sender<PortReply>,
}

impl PortExchange {
    /// Answer the request. A reply after the client stopped waiting is
    /// silently dropped.
    pub fn respond(self, reply: PortReply) {
        if self.reply_tx.send(reply).is_err() {
            debug!("Port reply dropped (client no longer waiting)");
        }
    }
}

/// Sending half of the port, held by the mediating context.
#[derive(Clone)]
pub struct PortClient {
    tx: mpsc::UnboundedSender<PortExchange>,
    suspend: CancellationToken,
}

impl PortClient {
    /// Send one request and await its tagged reply.
    pub async fn send(&self, request: PortRequest) -> Result<PortReply, TransportError> {
        if self.suspend.is_cancelled() {
            return Err(TransportError::Suspended);
        }

        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(PortExchange { request, reply_tx })
            .map_err(|_| TransportError::Closed)?;

        tokio::select! {
            () = self.suspend.cancelled() => Err(TransportError::Suspended),
            reply = reply_rx => reply.map_err(|_| TransportError::NoReply),
        }
    }

    /// Suspend the port, as when the page enters the back/forward cache.
    /// All in-flight sends resolve to [`TransportError::Suspended`].
    pub fn suspend(&self) {
        self.suspend.cancel();
    }

    /// Whether the port has been suspended.
    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.suspend.is_cancelled()
    }
}

/// Receiving half of the port, held by the executor context.
pub struct PortServer {
    rx: mpsc::UnboundedReceiver<PortExchange>,
}

impl PortServer {
    /// Next pending exchange, or `None` once every client is gone.
    pub async fn next(&mut self) -> Option<PortExchange> {
        self.rx.recv().await
    }
}

/// Create a connected client/server port pair.
#[must_use]
pub fn message_port() -> (PortClient, PortServer) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        PortClient {
            tx,
            suspend: CancellationToken::new(),
        },
        PortServer { rx },
    )
}
