//! # Binary Form Serializer
//!
//! Flattens a multi-part payload (text fields mixed with binary files)
//! into the JSON-safe [`SerializedForm`] shape and back.
//!
//! ## Invariant
//!
//! `deserialize_form(serialize_form(p))` yields the same entry count, the
//! same keys in the same order, and byte-identical file content.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use courier_types::{FileKind, FormEntry, FormEntryValue, SerializedFile, SerializedForm};

use crate::CodecError;

/// Bytes encoded per base64 call. A multiple of 3, so per-chunk outputs
/// concatenate without interior padding.
const ENCODE_CHUNK_BYTES: usize = 57 * 1024;

/// A binary file part held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobPart {
    /// Original file name.
    pub name: String,
    /// MIME type of the content.
    pub mime_type: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
}

/// One native form value: a text field or a binary file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    Blob(BlobPart),
}

/// A native multi-part payload: ordered `(key, value)` entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormPayload {
    pub entries: Vec<(String, FormValue)>,
}

impl FormPayload {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text field.
    pub fn push_text(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries
            .push((key.into(), FormValue::Text(value.into())));
    }

    /// Append a binary file part.
    pub fn push_blob(
        &mut self,
        key: impl Into<String>,
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) {
        self.entries.push((
            key.into(),
            FormValue::Blob(BlobPart {
                name: name.into(),
                mime_type: mime_type.into(),
                bytes,
            }),
        ));
    }
}

/// Encode bytes as base64 in bounded chunks.
///
/// Chunking keeps any single encode call's input bounded regardless of
/// file size; chunk outputs are plain concatenation because the chunk
/// length is a multiple of 3.
fn encode_chunked(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len().div_ceil(3) * 4);
    for chunk in bytes.chunks(ENCODE_CHUNK_BYTES) {
        out.push_str(&BASE64.encode(chunk));
    }
    out
}

/// Flatten a native payload into its JSON-safe form.
#[must_use]
pub fn serialize_form(payload: &FormPayload) -> SerializedForm {
    let entries = payload
        .entries
        .iter()
        .map(|(key, value)| FormEntry {
            key: key.clone(),
            value: match value {
                FormValue::Text(text) => FormEntryValue::Text(text.clone()),
                FormValue::Blob(blob) => FormEntryValue::File(SerializedFile {
                    kind: FileKind::File,
                    name: blob.name.clone(),
                    mime_type: blob.mime_type.clone(),
                    data: encode_chunked(&blob.bytes),
                }),
            },
        })
        .collect();
    SerializedForm::new(entries)
}

/// Rebuild the native payload from its JSON-safe form. Exact inverse of
/// [`serialize_form`].
pub fn deserialize_form(form: &SerializedForm) -> Result<FormPayload, CodecError> {
    let mut payload = FormPayload::new();
    for entry in &form.entries {
        let value = match &entry.value {
            FormEntryValue::Text(text) => FormValue::Text(text.clone()),
            FormEntryValue::File(file) => FormValue::Blob(BlobPart {
                name: file.name.clone(),
                mime_type: file.mime_type.clone(),
                bytes: BASE64.decode(&file.data)?,
            }),
        };
        payload.entries.push((entry.key.clone(), value));
    }
    Ok(payload)
}
