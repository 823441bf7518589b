//! # Message Port Contract
//!
//! The request/reply shapes exchanged over the narrow channel between the
//! mediating context and the privileged executor.

use crate::envelope::{RequestEnvelope, ResponseEnvelope};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Actions the executor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortAction {
    #[serde(rename = "crossOriginRequest")]
    CrossOriginRequest,
}

/// A message sent over the port to the executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortRequest {
    pub action: PortAction,
    pub data: RequestEnvelope,
}

impl PortRequest {
    #[must_use]
    pub fn cross_origin(data: RequestEnvelope) -> Self {
        Self {
            action: PortAction::CrossOriginRequest,
            data,
        }
    }
}

/// The executor's reply: a success payload or an error message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortReply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseEnvelope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_details: Option<Value>,
}

impl PortReply {
    /// A successful reply carrying the response envelope.
    #[must_use]
    pub fn ok(response: ResponseEnvelope) -> Self {
        Self {
            success: true,
            data: Some(response),
            error: None,
            error_details: None,
        }
    }

    /// A failed reply carrying a normalized error message.
    #[must_use]
    pub fn err(message: impl Into<String>, details: Option<Value>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            error_details: details,
        }
    }
}
