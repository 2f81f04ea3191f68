//! # Medical Tracker Client
//!
//! HTTP implementation of the remote history store used by the core reconciler.
//!
//! - `GET {base}/api/history` returns the history listing in whatever shape the server uses
//! - `POST {base}/api/history` stores one `{query, when, top}` entry
//!
//! Every request carries the configured timeout, so a hung server surfaces as
//! [`RemoteError::Timeout`] and the reconciler falls back to local history.

#![warn(rust_2018_idioms)]

use medtracker_core::{CoreConfig, HistoryEntry, OfflineRemote, RemoteError, RemoteHistory};
use medtracker_core::HISTORY_API_PATH;
use serde_json::Value;
use std::time::Duration;

/// Errors constructing a client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("failed to build HTTP client: {0}")]
    Build(reqwest::Error),
}

/// Remote history store reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpHistoryClient {
    history_url: String,
    client: reqwest::Client,
}

impl HttpHistoryClient {
    /// Creates a client for the store at `base_url` (for example `https://tracker.example.org`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            history_url: format!("{}{}", base_url.trim_end_matches('/'), HISTORY_API_PATH),
            client,
        })
    }
}

fn remote_error(e: reqwest::Error) -> RemoteError {
    if e.is_timeout() {
        RemoteError::Timeout
    } else if e.is_decode() {
        RemoteError::Decode(e.to_string())
    } else if let Some(status) = e.status() {
        RemoteError::Status(status.as_u16())
    } else {
        RemoteError::Transport(e.to_string())
    }
}

impl RemoteHistory for HttpHistoryClient {
    async fn fetch(&self) -> Result<Value, RemoteError> {
        let response = self
            .client
            .get(&self.history_url)
            .send()
            .await
            .map_err(remote_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status(status.as_u16()));
        }

        response.json::<Value>().await.map_err(remote_error)
    }

    async fn send(&self, entry: &HistoryEntry) -> Result<(), RemoteError> {
        let response = self
            .client
            .post(&self.history_url)
            .json(entry)
            .send()
            .await
            .map_err(remote_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status(status.as_u16()));
        }
        Ok(())
    }
}

/// The remote chosen by configuration: HTTP when a URL is set, offline otherwise.
#[derive(Debug, Clone)]
pub enum ConfiguredRemote {
    Http(HttpHistoryClient),
    Offline(OfflineRemote),
}

impl ConfiguredRemote {
    pub fn from_config(cfg: &CoreConfig) -> Result<Self, ClientError> {
        match cfg.remote_url() {
            Some(url) => {
                tracing::info!("using remote history store at {}", url);
                Ok(Self::Http(HttpHistoryClient::new(url, cfg.remote_timeout())?))
            }
            None => {
                tracing::info!("no remote history store configured; history stays local");
                Ok(Self::Offline(OfflineRemote))
            }
        }
    }
}

impl RemoteHistory for ConfiguredRemote {
    async fn fetch(&self) -> Result<Value, RemoteError> {
        match self {
            Self::Http(client) => client.fetch().await,
            Self::Offline(offline) => offline.fetch().await,
        }
    }

    async fn send(&self, entry: &HistoryEntry) -> Result<(), RemoteError> {
        match self {
            Self::Http(client) => client.send(entry).await,
            Self::Offline(offline) => offline.send(entry).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use std::sync::{Arc, Mutex};

    type Received = Arc<Mutex<Vec<Value>>>;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn history_app(received: Received) -> Router {
        Router::new()
            .route(
                "/api/history",
                get(|| async {
                    Json(serde_json::json!({"history": [{"query": "fever", "when": "t1", "top": "Malaria"}]}))
                })
                .post(|State(received): State<Received>, Json(body): Json<Value>| async move {
                    received.lock().unwrap().push(body);
                    Json(serde_json::json!({"ok": true}))
                }),
            )
            .with_state(received)
    }

    #[tokio::test]
    async fn fetch_returns_raw_body() {
        let base = serve(history_app(Received::default())).await;
        let client = HttpHistoryClient::new(&base, Duration::from_secs(5)).unwrap();

        let body = client.fetch().await.unwrap();
        assert_eq!(body["history"][0]["top"], "Malaria");
    }

    #[tokio::test]
    async fn send_posts_entry_as_json() {
        let received = Received::default();
        let base = serve(history_app(Arc::clone(&received))).await;
        let client = HttpHistoryClient::new(&format!("{base}/"), Duration::from_secs(5)).unwrap();

        client
            .send(&HistoryEntry::new("fever, cough", "t2", None))
            .await
            .unwrap();

        let bodies = received.lock().unwrap();
        assert_eq!(
            *bodies,
            vec![serde_json::json!({"query": "fever, cough", "when": "t2", "top": null})]
        );
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let app = Router::new().route(
            "/api/history",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR })
                .post(|| async { StatusCode::BAD_REQUEST }),
        );
        let base = serve(app).await;
        let client = HttpHistoryClient::new(&base, Duration::from_secs(5)).unwrap();

        assert!(matches!(client.fetch().await, Err(RemoteError::Status(500))));
        let entry = HistoryEntry::new("fever", "t", None);
        assert!(matches!(client.send(&entry).await, Err(RemoteError::Status(400))));
    }

    #[tokio::test]
    async fn non_json_body_is_a_decode_error() {
        let app = Router::new().route("/api/history", get(|| async { "<html>oops</html>" }));
        let base = serve(app).await;
        let client = HttpHistoryClient::new(&base, Duration::from_secs(5)).unwrap();

        assert!(matches!(client.fetch().await, Err(RemoteError::Decode(_))));
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let app = Router::new().route(
            "/api/history",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "[]"
            }),
        );
        let base = serve(app).await;
        let client = HttpHistoryClient::new(&base, Duration::from_millis(100)).unwrap();

        assert!(matches!(client.fetch().await, Err(RemoteError::Timeout)));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client =
            HttpHistoryClient::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();
        assert!(matches!(client.fetch().await, Err(RemoteError::Transport(_))));
    }

    #[tokio::test]
    async fn configured_remote_without_url_is_offline() {
        let remote = ConfiguredRemote::from_config(&CoreConfig::default()).unwrap();
        assert!(matches!(remote, ConfiguredRemote::Offline(_)));
        assert!(matches!(remote.fetch().await, Err(RemoteError::Unavailable)));
    }
}
