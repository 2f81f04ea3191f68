//! Store-backed history reconciliation.
//!
//! [`HistoryReconciler`] owns the local history record and talks to the remote store:
//!
//! - **write path** ([`HistoryReconciler::record`]): prepend locally, persist, then send to the
//!   remote in a detached task
//! - **read path** ([`HistoryReconciler::load`]): fetch remote, merge into local, persist
//!
//! The local record is authoritative. Remote failures are logged and never undo or block a
//! local change.

use crate::constants::{HISTORY_KEY, HISTORY_LIMIT};
use crate::history::{decode_remote, merge, timestamp_now, HistoryEntry};
use crate::remote::RemoteHistory;
use crate::store::KeyValueStore;
use crate::{CoreError, CoreResult};
use serde_json::Value;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Folds a remote response body into the local list.
///
/// Remote entries take precedence on dedup-key collisions. An unrecognised body contributes
/// nothing, leaving `local` unchanged.
pub fn reconcile(
    local: Vec<HistoryEntry>,
    remote_body: Value,
    fallback_when: &str,
) -> Vec<HistoryEntry> {
    merge(decode_remote(remote_body, fallback_when), local)
}

pub struct HistoryReconciler<S, R> {
    store: S,
    remote: Arc<R>,
}

impl<S, R> HistoryReconciler<S, R>
where
    S: KeyValueStore,
    R: RemoteHistory,
{
    pub fn new(store: S, remote: R) -> Self {
        Self {
            store,
            remote: Arc::new(remote),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads the local history, newest first.
    ///
    /// A stored value that does not parse as a history list is treated as empty.
    ///
    /// # Errors
    ///
    /// Returns an error only if the underlying store cannot be read.
    pub fn local(&self) -> CoreResult<Vec<HistoryEntry>> {
        let Some(raw) = self.store.get(HISTORY_KEY)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!("stored history is corrupt, starting empty: {}", e);
                Ok(Vec::new())
            }
        }
    }

    /// Replaces the local history, keeping at most [`HISTORY_LIMIT`] entries.
    fn save(&self, entries: &[HistoryEntry]) -> CoreResult<()> {
        let kept = &entries[..entries.len().min(HISTORY_LIMIT)];
        let raw = serde_json::to_string(kept).map_err(CoreError::Serialization)?;
        self.store.set(HISTORY_KEY, &raw)
    }

    /// Records a new prediction.
    ///
    /// The entry is persisted locally before this returns. The remote send runs in a spawned
    /// task; the returned handle resolves once that attempt has finished, whatever its outcome.
    /// Must be called from within a Tokio runtime.
    pub fn record(&self, entry: HistoryEntry) -> CoreResult<JoinHandle<()>> {
        let mut entries = self.local()?;
        entries.insert(0, entry.clone());
        self.save(&entries)?;

        let remote = Arc::clone(&self.remote);
        Ok(tokio::spawn(async move {
            match remote.send(&entry).await {
                Ok(()) => tracing::debug!("sent history entry '{}' to remote", entry.query),
                Err(e) => tracing::warn!("failed to send history entry to remote: {}", e),
            }
        }))
    }

    /// Refreshes local history from the remote and returns the list to display.
    ///
    /// When the remote cannot be reached the current local list is returned unchanged.
    pub async fn load(&self) -> CoreResult<Vec<HistoryEntry>> {
        let body = match self.remote.fetch().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("could not fetch remote history, using local only: {}", e);
                return self.local();
            }
        };

        let merged = reconcile(self.local()?, body, &timestamp_now());
        self.save(&merged)?;
        Ok(merged.into_iter().take(HISTORY_LIMIT).collect())
    }
}
