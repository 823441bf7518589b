//! Pending-entry table: one entry per in-flight request, keyed by
//! correlation ID.
//!
//! Owned exclusively by the page client. An entry is created when
//! `request()` is called and destroyed exactly once — correlated reply,
//! correlated error, or deadline expiry, whichever happens first. The table
//! lives and dies with its client; nothing persists across contexts.

use crate::client::ClientError;
use courier_types::ResponseEnvelope;
use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::oneshot;

/// How one pending request settles.
pub(crate) type Settlement = Result<ResponseEnvelope, ClientError>;

/// The settle channel for one in-flight request.
pub(crate) struct PendingEntry {
    settle: oneshot::Sender<Settlement>,
}

/// Table of in-flight requests.
#[derive(Default)]
pub(crate) struct PendingTable {
    entries: Mutex<HashMap<String, PendingEntry>>,
}

impl PendingTable {
    /// Register a new in-flight request, returning its settle receiver.
    pub(crate) fn insert(&self, id: &str) -> oneshot::Receiver<Settlement> {
        let (settle, rx) = oneshot::channel();
        self.entries
            .lock()
            .insert(id.to_string(), PendingEntry { settle });
        rx
    }

    /// Settle and destroy the entry for `id`. Returns false when no entry
    /// exists (already settled, timed out, or never created) — the caller
    /// treats that as a no-op.
    pub(crate) fn settle(&self, id: &str, outcome: Settlement) -> bool {
        let Some(entry) = self.entries.lock().remove(id) else {
            return false;
        };
        // A receiver dropped mid-settle just means the caller went away.
        let _ = entry.settle.send(outcome);
        true
    }

    /// Drop the entry for `id` without settling, used on deadline expiry
    /// after the caller already resolved itself.
    pub(crate) fn forget(&self, id: &str) -> bool {
        self.entries.lock().remove(id).is_some()
    }

    /// Number of in-flight requests.
    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }
}
