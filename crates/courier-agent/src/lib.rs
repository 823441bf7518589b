//! # Courier Relay Agent
//!
//! The mediating-context bridge. Watches the shared document board for
//! carrier nodes, forwards their envelopes over the message port to the
//! privileged executor, and turns each tagged reply back into a typed
//! board event for the page client.
//!
//! ## Cleanup rules
//!
//! - A carrier node is consumed at most once: the processing mark is taken
//!   before forwarding, and the node is removed after the reply or error
//!   event is dispatched — both paths clean up.
//! - The one exception is a node whose text fails to decode: it is left in
//!   place untouched and triggers no event. The request eventually times
//!   out page-side.

pub mod agent;

pub use agent::RelayAgent;
