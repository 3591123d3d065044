// ABOUTME: JSON-RPC wallet provider: eth_requestAccounts / eth_accounts over HTTP.
// ABOUTME: Account changes are detected by polling eth_accounts while listeners are registered.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::wallet::provider::{ListenerId, ProviderError, WalletProvider};

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;
pub const DEFAULT_RPC_TIMEOUT_MS: u64 = 5_000;

/// Connection settings for a JSON-RPC wallet endpoint.
#[derive(Debug, Clone)]
pub struct JsonRpcProviderConfig {
    pub url: String,
    pub poll_interval_ms: u64,
    pub timeout_ms: u64,
}

impl JsonRpcProviderConfig {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            timeout_ms: DEFAULT_RPC_TIMEOUT_MS,
        }
    }
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: [(); 0],
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    #[serde(default)]
    message: String,
}

struct Inner {
    url: String,
    http: reqwest::Client,
    timeout: Duration,
    poll_interval: Duration,
    next_request_id: AtomicU64,
    next_listener_id: AtomicU64,
    listeners: Mutex<HashMap<ListenerId, mpsc::UnboundedSender<Vec<String>>>>,
    poller: Mutex<Option<JoinHandle<()>>>,
}

/// Wallet provider backed by an EIP-1193 style JSON-RPC endpoint.
pub struct JsonRpcProvider {
    inner: Arc<Inner>,
}

impl JsonRpcProvider {
    pub fn new(config: JsonRpcProviderConfig) -> Result<Self, ProviderError> {
        let url = config.url.trim().to_string();
        if url.is_empty() {
            return Err(ProviderError::Transport("wallet RPC url is empty".to_string()));
        }
        Ok(Self {
            inner: Arc::new(Inner {
                url,
                http: reqwest::Client::new(),
                timeout: Duration::from_millis(config.timeout_ms.max(100)),
                poll_interval: Duration::from_millis(config.poll_interval_ms.max(10)),
                next_request_id: AtomicU64::new(1),
                next_listener_id: AtomicU64::new(1),
                listeners: Mutex::new(HashMap::new()),
                poller: Mutex::new(None),
            }),
        })
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }

    /// Whether the account polling task is currently running.
    pub fn is_polling(&self) -> bool {
        self.inner
            .poller
            .lock()
            .map(|p| p.as_ref().is_some_and(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().map(|l| l.len()).unwrap_or(0)
    }

    fn ensure_poller(&self) {
        let Ok(mut poller) = self.inner.poller.lock() else {
            return;
        };
        if poller.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let weak = Arc::downgrade(&self.inner);
                *poller = Some(handle.spawn(poll_accounts(weak, self.inner.poll_interval)));
                debug!(url = %self.inner.url, "started wallet account polling");
            }
            Err(_) => warn!("no async runtime; wallet account changes will not be observed"),
        }
    }

    fn stop_poller(&self) {
        if let Ok(mut poller) = self.inner.poller.lock()
            && let Some(handle) = poller.take()
        {
            handle.abort();
            debug!(url = %self.inner.url, "stopped wallet account polling");
        }
    }
}

impl Drop for JsonRpcProvider {
    fn drop(&mut self) {
        self.stop_poller();
    }
}

impl Inner {
    async fn call_accounts(
        &self,
        method: &str,
        timeout: Option<Duration>,
    ) -> Result<Vec<String>, ProviderError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_request_id.fetch_add(1, Ordering::Relaxed),
            method,
            params: [],
        };

        let mut builder = self.http.post(self.url.as_str()).json(&request);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(ProviderError::Transport(format!("HTTP {}", status)));
        }

        let decoded: RpcResponse = serde_json::from_slice(&bytes)
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;
        if let Some(err) = decoded.error {
            return Err(ProviderError::Rejected {
                code: err.code,
                message: err.message,
            });
        }
        let result = decoded
            .result
            .ok_or_else(|| ProviderError::Malformed(format!("{} returned no result", method)))?;
        serde_json::from_value::<Vec<String>>(result)
            .map_err(|e| ProviderError::Malformed(e.to_string()))
    }

    fn broadcast(&self, accounts: &[String]) {
        let Ok(mut listeners) = self.listeners.lock() else {
            return;
        };
        listeners.retain(|id, tx| {
            let delivered = tx.send(accounts.to_vec()).is_ok();
            if !delivered {
                debug!(listener = id.0, "dropping closed wallet listener");
            }
            delivered
        });
    }
}

/// Poll eth_accounts and fan out changes.
///
/// The first successful poll only records a baseline; the startup restore
/// covers the initial state.
async fn poll_accounts(inner: Weak<Inner>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut last: Option<Vec<String>> = None;

    loop {
        ticker.tick().await;
        let Some(inner) = inner.upgrade() else {
            break;
        };
        let timeout = Some(inner.timeout);
        match inner.call_accounts("eth_accounts", timeout).await {
            Ok(accounts) => {
                if last.as_ref() != Some(&accounts) {
                    if last.is_some() {
                        debug!(count = accounts.len(), "wallet accounts changed");
                        inner.broadcast(&accounts);
                    }
                    last = Some(accounts);
                }
            }
            Err(e) => debug!(error = %e, "wallet account poll failed"),
        }
    }
}

#[async_trait]
impl WalletProvider for JsonRpcProvider {
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError> {
        // Interactive: the wallet may wait on the user, so no timeout.
        self.inner.call_accounts("eth_requestAccounts", None).await
    }

    async fn get_accounts(&self) -> Result<Vec<String>, ProviderError> {
        self.inner
            .call_accounts("eth_accounts", Some(self.inner.timeout))
            .await
    }

    fn on_accounts_changed(&self, listener: mpsc::UnboundedSender<Vec<String>>) -> ListenerId {
        let id = ListenerId(self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed));
        if let Ok(mut listeners) = self.inner.listeners.lock() {
            listeners.insert(id, listener);
        }
        self.ensure_poller();
        id
    }

    fn remove_accounts_changed_listener(&self, id: ListenerId) {
        let remaining = match self.inner.listeners.lock() {
            Ok(mut listeners) => {
                listeners.remove(&id);
                listeners.len()
            }
            Err(_) => return,
        };
        if remaining == 0 {
            self.stop_poller();
        }
    }
}
