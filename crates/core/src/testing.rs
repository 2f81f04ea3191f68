//! Test doubles shared by the unit tests in this crate.

use crate::history::HistoryEntry;
use crate::remote::{RemoteError, RemoteHistory};
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// Scripted remote store that records every entry it is sent.
#[derive(Default)]
pub(crate) struct FakeRemote {
    body: Option<Value>,
    fail_send: bool,
    sent: Arc<Mutex<Vec<HistoryEntry>>>,
}

impl FakeRemote {
    /// A remote whose fetch fails and whose sends succeed.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub(crate) fn failing_send(mut self) -> Self {
        self.fail_send = true;
        self
    }

    pub(crate) fn sent_log(&self) -> Arc<Mutex<Vec<HistoryEntry>>> {
        Arc::clone(&self.sent)
    }
}

impl RemoteHistory for FakeRemote {
    async fn fetch(&self) -> Result<Value, RemoteError> {
        self.body
            .clone()
            .ok_or_else(|| RemoteError::Transport("connection refused".into()))
    }

    async fn send(&self, entry: &HistoryEntry) -> Result<(), RemoteError> {
        if self.fail_send {
            return Err(RemoteError::Status(500));
        }
        self.sent.lock().unwrap().push(entry.clone());
        Ok(())
    }
}
