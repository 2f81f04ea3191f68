//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the core. Library
//! code never reads environment variables while handling a command; binaries gather the values
//! (see [`CoreConfig::from_env_values`]) and hand the result down.

use crate::constants::{DEFAULT_DATA_DIR, DEFAULT_REMOTE_TIMEOUT_SECS};
use crate::{CoreError, CoreResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Core configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoreConfig {
    data_dir: PathBuf,
    remote_url: Option<String>,
    remote_timeout: Duration,
    catalog_file: Option<PathBuf>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidInput` if the remote URL is not an `http(s)` URL or the
    /// timeout is zero.
    pub fn new(
        data_dir: PathBuf,
        remote_url: Option<String>,
        remote_timeout: Duration,
        catalog_file: Option<PathBuf>,
    ) -> CoreResult<Self> {
        let remote_url = remote_url
            .map(|u| u.trim().trim_end_matches('/').to_owned())
            .filter(|u| !u.is_empty());

        if let Some(url) = &remote_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(CoreError::InvalidInput(format!(
                    "remote URL must start with http:// or https://: {url}"
                )));
            }
        }

        if remote_timeout.is_zero() {
            return Err(CoreError::InvalidInput(
                "remote timeout must be greater than zero".into(),
            ));
        }

        Ok(Self {
            data_dir,
            remote_url,
            remote_timeout,
            catalog_file,
        })
    }

    /// Builds a configuration from raw environment values.
    ///
    /// `None` or blank values fall back to the defaults.
    pub fn from_env_values(
        data_dir: Option<String>,
        remote_url: Option<String>,
        remote_timeout_secs: Option<String>,
        catalog_file: Option<String>,
    ) -> CoreResult<Self> {
        let non_blank = |v: Option<String>| {
            v.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
        };

        let timeout_secs = match non_blank(remote_timeout_secs) {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                CoreError::InvalidInput(format!("remote timeout is not a number of seconds: {raw}"))
            })?,
            None => DEFAULT_REMOTE_TIMEOUT_SECS,
        };

        Self::new(
            non_blank(data_dir)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            non_blank(remote_url),
            Duration::from_secs(timeout_secs),
            non_blank(catalog_file).map(PathBuf::from),
        )
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Base URL of the remote history store, without a trailing slash.
    pub fn remote_url(&self) -> Option<&str> {
        self.remote_url.as_deref()
    }

    pub fn remote_timeout(&self) -> Duration {
        self.remote_timeout
    }

    pub fn catalog_file(&self) -> Option<&Path> {
        self.catalog_file.as_deref()
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            remote_url: None,
            remote_timeout: Duration::from_secs(DEFAULT_REMOTE_TIMEOUT_SECS),
            catalog_file: None,
        }
    }
}
