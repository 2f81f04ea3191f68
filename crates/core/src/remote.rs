//! The remote history collaborator.
//!
//! The remote store is reached through two calls: fetch the whole history (`GET /api/history`)
//! and send one new entry (`POST /api/history`). The HTTP implementation lives in the
//! `medtracker-client` crate; this module only defines the seam.

use crate::history::HistoryEntry;
use std::future::Future;

/// Failures talking to the remote history store.
///
/// None of these reach the user: every caller in this crate degrades to local-only behaviour.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("no remote history store configured")]
    Unavailable,
    #[error("remote request failed: {0}")]
    Transport(String),
    #[error("remote request timed out")]
    Timeout,
    #[error("remote responded with status {0}")]
    Status(u16),
    #[error("remote response was not valid JSON: {0}")]
    Decode(String),
}

/// A remote history store.
pub trait RemoteHistory: Send + Sync + 'static {
    /// Fetches the raw response body of the history listing.
    ///
    /// The body is returned undecoded because its shape varies between deployments.
    fn fetch(&self) -> impl Future<Output = Result<serde_json::Value, RemoteError>> + Send;

    /// Sends one entry. Success means the store acknowledged it with a success status.
    fn send(&self, entry: &HistoryEntry) -> impl Future<Output = Result<(), RemoteError>> + Send;
}

/// Stand-in used when no remote is configured. Every call fails with
/// [`RemoteError::Unavailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineRemote;

impl RemoteHistory for OfflineRemote {
    async fn fetch(&self) -> Result<serde_json::Value, RemoteError> {
        Err(RemoteError::Unavailable)
    }

    async fn send(&self, _entry: &HistoryEntry) -> Result<(), RemoteError> {
        Err(RemoteError::Unavailable)
    }
}
