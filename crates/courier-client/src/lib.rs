//! # Courier Page Client
//!
//! The request API exposed to unprivileged page code. `request()` publishes
//! an encoded envelope onto the shared document board and awaits the
//! correlated reply event dispatched back by the relay agent.
//!
//! ## Settlement rules
//!
//! - Every call settles exactly once: correlated reply, correlated error,
//!   or deadline expiry, whichever comes first.
//! - Deadline expiry *resolves* with a synthetic
//!   `{status: 0, statusText: "timeout", ok: false}` envelope. Callers that
//!   only check `status`/`ok` need no separate failure path.
//! - The deadline does not cancel executor-side work; a late reply finds no
//!   pending entry and is dropped silently.
//! - Concurrent in-flight requests are unbounded; replies may arrive in any
//!   order and each settles its own entry by correlation ID alone.

pub mod client;
pub mod options;
pub mod pending;

pub use client::{ClientError, PageClient};
pub use options::RequestOptions;
