//! # Courier Background Executor
//!
//! The privileged context. Receives forwarded request envelopes over the
//! message port, applies the allow-list policy, reconstructs binary
//! payloads, performs the network call under a deadline, classifies
//! failures, and replies with a structured result.
//!
//! ## Structure
//!
//! - [`policy`]: the pluggable allow-list seam.
//! - [`fetch`]: the outbound HTTP port and its `reqwest` adapter.
//! - [`classify`]: the deterministic network-failure message table.
//! - [`response`]: response-envelope construction (status-text fallback,
//!   header flattening, opportunistic structured parse).
//! - [`diagnostics`]: best-effort request/response summaries.
//! - [`executor`]: the service loop tying the above together.
//!
//! Requests are handled independently with no shared mutable state beyond
//! the policy; replies may complete in any order.

pub mod classify;
pub mod diagnostics;
pub mod executor;
pub mod fetch;
pub mod policy;
pub mod response;

pub use classify::classify_network_failure;
pub use diagnostics::DiagnosticsHub;
pub use executor::{BackgroundExecutor, ExecError};
pub use fetch::{FetchFailure, FetchedResponse, HttpFetch, PreparedPayload, PreparedRequest, ReqwestFetcher};
pub use policy::{AllowAll, AllowListPolicy, DomainAllowList};
pub use response::build_response;
