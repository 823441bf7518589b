//! # Carrier-Node Codec
//!
//! A carrier node transports one [`RequestEnvelope`] from the page context
//! to the mediating context through the shared document board.
//!
//! ## Wire format
//!
//! - Node id: `courier-req-<correlation-id>`.
//! - Node text: `base64(percent_encode(json(envelope)))`. The percent-encode
//!   step keeps the base64 input ASCII-only, so envelopes containing any
//!   UTF-8 (URLs, header values, body text) survive unchanged.
//!
//! The node is created once by the page client, consumed exactly once by
//! the relay agent, and removed by the agent.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use courier_types::RequestEnvelope;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::CodecError;

/// Prefix every carrier node id carries; the remainder is the correlation ID.
pub const CARRIER_ID_PREFIX: &str = "courier-req-";

/// The `encodeURIComponent` character set: everything except alphanumerics
/// and `- _ . ! ~ * ' ( )` is escaped.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Build the document-board node id for a correlation ID.
#[must_use]
pub fn carrier_node_id(correlation_id: &str) -> String {
    format!("{CARRIER_ID_PREFIX}{correlation_id}")
}

/// Extract the correlation ID from a node id, if the node follows the
/// carrier naming convention.
#[must_use]
pub fn correlation_from_node_id(node_id: &str) -> Option<&str> {
    node_id.strip_prefix(CARRIER_ID_PREFIX)
}

/// Encode an envelope into carrier-node text.
pub fn encode_carrier(envelope: &RequestEnvelope) -> Result<String, CodecError> {
    let json = serde_json::to_string(envelope)?;
    let escaped = utf8_percent_encode(&json, COMPONENT).to_string();
    Ok(BASE64.encode(escaped.as_bytes()))
}

/// Decode carrier-node text back into an envelope. Exact inverse of
/// [`encode_carrier`] for JSON-safe envelopes.
pub fn decode_carrier(text: &str) -> Result<RequestEnvelope, CodecError> {
    let escaped = BASE64.decode(text.trim())?;
    let escaped = std::str::from_utf8(&escaped)?;
    let json = percent_decode_str(escaped).decode_utf8()?;
    Ok(serde_json::from_str(&json)?)
}
