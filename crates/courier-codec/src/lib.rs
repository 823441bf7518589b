//! # Courier Codec
//!
//! Two wire codecs with one shared rule: decoding must be the exact
//! inverse of encoding.
//!
//! - [`carrier`]: the document-board carrier-node format —
//!   `base64(percent_encode(json(RequestEnvelope)))` under a well-known
//!   node-id prefix.
//! - [`multipart`]: flattening multi-part form payloads (text fields mixed
//!   with binary files) into a JSON-safe [`courier_types::SerializedForm`]
//!   and back, byte-identically.

pub mod carrier;
pub mod multipart;

use thiserror::Error;

pub use carrier::{
    carrier_node_id, correlation_from_node_id, decode_carrier, encode_carrier, CARRIER_ID_PREFIX,
};
pub use multipart::{deserialize_form, serialize_form, BlobPart, FormPayload, FormValue};

/// Errors from decoding a carrier node or a serialized form.
///
/// A decode failure is never fatal to the relay: the agent leaves the
/// offending node in place and the request eventually times out page-side.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Carrier text or file data was not valid base64.
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Decoded bytes were not valid UTF-8.
    #[error("invalid utf-8 in decoded payload: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The decoded JSON did not match the expected envelope shape.
    #[error("malformed envelope json: {0}")]
    Json(#[from] serde_json::Error),
}
