//! # Courier Shared Types
//!
//! Defines the records exchanged between the three relay contexts.
//!
//! ## Architecture Rules
//!
//! - All page → executor traffic travels as a [`RequestEnvelope`]; all
//!   executor → page traffic travels as a [`ResponseEnvelope`].
//! - The envelope `id` (correlation ID) is the sole way a reply is matched
//!   to its request; no component may rely on arrival order.
//! - Envelopes are transient: they exist as board text and port payloads,
//!   never as persisted state.

pub mod body;
pub mod envelope;
pub mod events;
pub mod port;

pub use body::{
    FileKind, FormEntry, FormEntryValue, FormKind, RequestBody, SerializedFile, SerializedForm,
};
pub use envelope::{RequestEnvelope, ResponseEnvelope, DEFAULT_TIMEOUT_MS};
pub use events::{BoardEvent, RequestSummary};
pub use port::{PortAction, PortReply, PortRequest};
