// ABOUTME: Configuration loading for chainclaw.
// ABOUTME: Reads ~/.chainclaw/config.toml, then environment overrides; CLI flags apply last.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::backend::client::{DEFAULT_REQUEST_ATTEMPTS, DEFAULT_TIMEOUT_MS};
use crate::backend::{BackendClientConfig, DEFAULT_HISTORY_LIMIT};
use crate::wallet::JsonRpcProviderConfig;
use crate::wallet::json_rpc::{DEFAULT_POLL_INTERVAL_MS, DEFAULT_RPC_TIMEOUT_MS};

pub const BACKEND_URL_ENV: &str = "CHAINCLAW_BACKEND_URL";
pub const WALLET_RPC_ENV: &str = "CHAINCLAW_WALLET_RPC";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub wallet: WalletConfig,
    pub history: HistoryConfig,
}

/// Agent backend connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub request_attempts: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            request_attempts: DEFAULT_REQUEST_ATTEMPTS,
        }
    }
}

impl BackendConfig {
    pub fn client_config(&self) -> BackendClientConfig {
        BackendClientConfig {
            base_url: self.base_url.clone(),
            timeout_ms: self.timeout_ms,
            request_attempts: self.request_attempts,
        }
    }
}

/// Wallet provider endpoint. An empty `rpc_url` means no wallet is available.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    pub rpc_url: String,
    pub poll_interval_ms: u64,
    pub timeout_ms: u64,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            rpc_url: String::new(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            timeout_ms: DEFAULT_RPC_TIMEOUT_MS,
        }
    }
}

impl WalletConfig {
    /// Provider settings, or `None` when no endpoint is configured.
    pub fn provider_config(&self) -> Option<JsonRpcProviderConfig> {
        let url = self.rpc_url.trim();
        if url.is_empty() {
            return None;
        }
        Some(JsonRpcProviderConfig {
            url: url.to_string(),
            poll_interval_ms: self.poll_interval_ms,
            timeout_ms: self.timeout_ms,
        })
    }
}

/// Conversation history paging.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Entries shown per page in the chat pane.
    pub page_size: usize,
    /// Entries requested per backend call.
    pub fetch_limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            page_size: 5,
            fetch_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl Config {
    /// Load config from ~/.chainclaw/config.toml, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load config from an explicit path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Apply `CHAINCLAW_*` environment overrides.
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(BACKEND_URL_ENV).ok(),
            std::env::var(WALLET_RPC_ENV).ok(),
        );
    }

    /// Replace the backend URL and wallet endpoint when values are given.
    pub fn apply_overrides(&mut self, backend_url: Option<String>, wallet_rpc: Option<String>) {
        if let Some(url) = backend_url.filter(|s| !s.trim().is_empty()) {
            self.backend.base_url = url;
        }
        if let Some(url) = wallet_rpc {
            self.wallet.rpc_url = url;
        }
    }

    /// Directory holding config and logs.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".chainclaw")
    }

    /// Path to the config file.
    pub fn config_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Path to the log file.
    pub fn log_path() -> PathBuf {
        Self::home_dir().join("chainclaw.log")
    }
}
