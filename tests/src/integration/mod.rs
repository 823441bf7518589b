//! Cross-context integration tests for the relay pipeline.

pub mod edge_cases;
pub mod flows;

#[cfg(test)]
pub(crate) mod harness;
