//! # Request Body Payloads
//!
//! JSON-safe body representations, including the serialized multi-part
//! form shape produced by `courier-codec`.
//!
//! ## Invariant
//!
//! Serialized forms must round-trip exactly: entry order, entry keys, and
//! the byte content of binary entries are preserved bit for bit.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A request body on the wire.
///
/// Untagged on purpose: the wire shape is whatever the page handed over —
/// a serialized form (recognised by its `kind` tag), a plain string, or an
/// arbitrary JSON value. Variant order matters for deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestBody {
    /// A serialized multi-part form.
    Form(SerializedForm),
    /// A raw string body, sent as-is.
    Text(String),
    /// Any other JSON value, encoded per the negotiated content type.
    Json(Value),
}

/// Discriminator for [`SerializedForm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormKind {
    #[serde(rename = "form")]
    Form,
}

/// Discriminator for [`SerializedFile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileKind {
    #[serde(rename = "file")]
    File,
}

/// A multi-part form flattened into a JSON-safe record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedForm {
    pub kind: FormKind,
    pub entries: Vec<FormEntry>,
}

impl SerializedForm {
    #[must_use]
    pub fn new(entries: Vec<FormEntry>) -> Self {
        Self {
            kind: FormKind::Form,
            entries,
        }
    }
}

/// One `(key, value)` form entry. Order within the form is significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormEntry {
    pub key: String,
    pub value: FormEntryValue,
}

/// A form entry value: plain text or an encoded binary file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormEntryValue {
    /// An encoded file part (recognised by its `kind` tag).
    File(SerializedFile),
    /// A plain text field.
    Text(String),
}

/// A binary file part, base64-encoded for JSON transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedFile {
    pub kind: FileKind,
    /// Original file name.
    pub name: String,
    /// MIME type of the file content.
    pub mime_type: String,
    /// Base64 of the raw file bytes.
    pub data: String,
}
