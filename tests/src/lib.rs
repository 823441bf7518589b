//! # Courier Test Suite
//!
//! Unified test crate exercising the full relay path across all three
//! contexts.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── flows.rs        # End-to-end page → agent → executor flows
//!     └── edge_cases.rs   # Timeouts, malformed carriers, suspension
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p courier-tests
//!
//! # By category
//! cargo test -p courier-tests integration::
//! ```

#![allow(dead_code)]

pub mod integration;
