//! Persisted prediction endpoint URL with change notification.
//!
//! The operator-chosen base URL lives in a small JSON file. Consumers hold a
//! `watch::Receiver` and re-run enrichment when the URL changes.

use crate::config::DEFAULT_ENDPOINT_URL;
use crate::error::SettingsError;
use crate::prediction::client::EndpointConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::watch;
use tracing::{debug, info};

#[derive(Debug, Serialize, Deserialize)]
struct StoredSettings {
    fraud_api_url: String,
}

/// File-backed endpoint URL store
#[derive(Debug)]
pub struct EndpointSettings {
    path: PathBuf,
    sender: watch::Sender<String>,
}

impl EndpointSettings {
    /// Load the stored URL, or start from the default when the file does not exist
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        Self::open_with_default(path, DEFAULT_ENDPOINT_URL)
    }

    /// Like [`EndpointSettings::open`], with the URL used when nothing is stored yet
    pub fn open_with_default<P: AsRef<Path>>(
        path: P,
        default_url: &str,
    ) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();

        let url = match std::fs::read_to_string(&path) {
            Ok(text) => {
                let stored: StoredSettings = serde_json::from_str(&text)?;
                normalize_url(&stored.fraud_api_url)?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No endpoint settings file, using default");
                normalize_url(default_url)?
            }
            Err(e) => return Err(e.into()),
        };

        let (sender, _) = watch::channel(url);
        Ok(Self { path, sender })
    }

    /// Current base URL
    pub fn current(&self) -> String {
        self.sender.borrow().clone()
    }

    /// Current URL applied to `template`'s timeout
    pub fn endpoint(&self, template: &EndpointConfig) -> EndpointConfig {
        template.with_base_url(self.current())
    }

    /// Receive every subsequent URL change
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.sender.subscribe()
    }

    /// Validate, persist and broadcast a new base URL.
    ///
    /// Subscribers are only notified when the URL actually changes.
    pub fn set(&self, raw_url: &str) -> Result<String, SettingsError> {
        let url = normalize_url(raw_url)?;
        self.persist(&url)?;

        let changed = self.sender.send_if_modified(|current| {
            if *current == url {
                false
            } else {
                *current = url.clone();
                true
            }
        });

        if changed {
            info!(url = %url, "Prediction endpoint updated");
        }
        Ok(url)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, url: &str) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let body = serde_json::to_string_pretty(&StoredSettings {
            fraud_api_url: url.to_string(),
        })?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, body)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Trim whitespace and trailing slashes; require an http(s) scheme
fn normalize_url(raw: &str) -> Result<String, SettingsError> {
    let url = raw.trim().trim_end_matches('/');
    let has_host = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
        .is_some_and(|rest| !rest.is_empty());

    if has_host {
        Ok(url.to_string())
    } else {
        Err(SettingsError::InvalidUrl(raw.to_string()))
    }
}
