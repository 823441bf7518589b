//! # Courier Transports
//!
//! The two narrow, asynchronous channels over which the three isolated
//! contexts coordinate. No two contexts share domain state; everything
//! crosses one of these seams.
//!
//! ```text
//! ┌─────────────┐  board.append()   ┌─────────────┐  port.send()   ┌────────────┐
//! │ PageClient  │ ────────────────→ │ RelayAgent  │ ─────────────→ │  Executor  │
//! │             │ ←──────────────── │             │ ←───────────── │            │
//! └─────────────┘  board.dispatch() └─────────────┘  tagged reply  └────────────┘
//! ```
//!
//! - [`board::DocumentBoard`] models the shared document tree: an observable
//!   store of carrier nodes plus a typed reply-event channel.
//! - [`port`] models the page↔executor message channel: typed async
//!   request/reply with suspension expressed as an explicit cancellation
//!   token rather than inferred from timing.

pub mod board;
pub mod port;

pub use board::{AddedNodes, BoardEvents, CarrierNode, DocumentBoard};
pub use port::{message_port, PortClient, PortExchange, PortServer, TransportError};

/// Events buffered per board subscriber before older entries are dropped.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
