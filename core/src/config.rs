/// Configuration for the translation client
use crate::error::{ClientError, ClientResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

/// How progress messages reach the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    /// Re-fetch the whole message list on a fixed interval.
    #[default]
    Polling,
    /// Follow the server's `data:` event stream.
    Stream,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimingOptions {
    pub poll_interval_ms: u64,
    pub history_refresh_delay_ms: u64,
    pub processing_hide_delay_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for TimingOptions {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1_000,
            history_refresh_delay_ms: 1_000,
            processing_hide_delay_ms: 15_000,
            request_timeout_secs: 30,
        }
    }
}

impl TimingOptions {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn history_refresh_delay(&self) -> Duration {
        Duration::from_millis(self.history_refresh_delay_ms)
    }

    pub fn processing_hide_delay(&self) -> Duration {
        Duration::from_millis(self.processing_hide_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    pub server_url: String,
    pub timing: TimingOptions,
    pub feed: FeedKind,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            timing: TimingOptions::default(),
            feed: FeedKind::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> ClientResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ClientError::Storage(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        Self::from_json(&content)
    }

    /// Save configuration to a JSON file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> ClientResult<()> {
        let content = self.to_json()?;
        fs::write(path, content)
            .map_err(|e| ClientError::Storage(format!("Failed to write config file: {}", e)))
    }

    pub fn from_json(json: &str) -> ClientResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| ClientError::Decode(format!("Failed to parse config: {}", e)))
    }

    pub fn to_json(&self) -> ClientResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ClientError::Decode(format!("Failed to serialize config: {}", e)))
    }

    /// Server base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.server_url.trim_end_matches('/')
    }
}
