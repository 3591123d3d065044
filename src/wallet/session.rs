// ABOUTME: Wallet session manager: connected-account state machine with stale-completion guards.
// ABOUTME: Mirrors provider account changes and publishes snapshots over a watch channel.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::display::format_address;
use crate::wallet::error::WalletError;
use crate::wallet::provider::{ListenerId, ProviderError, WalletProvider};

/// Snapshot of the wallet session shared with UI consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletSession {
    /// Address as returned by the provider, or `None` when disconnected.
    pub account: Option<String>,
    /// True only while an interactive connect request is in flight.
    pub connecting: bool,
}

/// Coarse state of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Disconnected,
    Connecting,
    Connected(String),
}

impl WalletSession {
    pub fn status(&self) -> SessionStatus {
        if self.connecting {
            SessionStatus::Connecting
        } else if let Some(ref account) = self.account {
            SessionStatus::Connected(account.clone())
        } else {
            SessionStatus::Disconnected
        }
    }

    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }
}

/// Monotonic token identifying one account request issued by the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

/// Which provider call a request performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Silent `get_accounts` at startup.
    Restore,
    /// Interactive `request_accounts`.
    Connect,
}

/// An account request that can be driven to completion off the UI loop.
pub struct AccountsRequest {
    token: RequestToken,
    kind: RequestKind,
    provider: Arc<dyn WalletProvider>,
}

/// Result of an `AccountsRequest`, handed back to `WalletSessionManager::complete`.
#[derive(Debug, Clone)]
pub struct AccountsCompletion {
    pub token: RequestToken,
    pub kind: RequestKind,
    pub result: Result<Vec<String>, ProviderError>,
}

impl AccountsRequest {
    pub fn token(&self) -> RequestToken {
        self.token
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    /// Perform the provider call. Holds no reference to the manager.
    pub async fn run(self) -> AccountsCompletion {
        let result = match self.kind {
            RequestKind::Restore => self.provider.get_accounts().await,
            RequestKind::Connect => self.provider.request_accounts().await,
        };
        AccountsCompletion {
            token: self.token,
            kind: self.kind,
            result,
        }
    }
}

/// Owns the wallet session and is its only writer.
///
/// Every transition bumps an internal epoch. A request remembers the epoch it
/// was issued under and its completion is applied only if nothing else has
/// happened since; otherwise it is a stale completion and is dropped.
pub struct WalletSessionManager {
    provider: Option<Arc<dyn WalletProvider>>,
    state: watch::Sender<WalletSession>,
    epoch: u64,
    listener: Option<ListenerId>,
    last_notice: Option<WalletError>,
}

impl WalletSessionManager {
    /// Create a disconnected manager. `None` means no wallet provider is present.
    pub fn new(provider: Option<Arc<dyn WalletProvider>>) -> Self {
        let (state, _) = watch::channel(WalletSession::default());
        Self {
            provider,
            state,
            epoch: 0,
            listener: None,
            last_notice: None,
        }
    }

    /// Current snapshot.
    pub fn session(&self) -> WalletSession {
        self.state.borrow().clone()
    }

    /// Read-only receiver that observes every snapshot the manager publishes.
    pub fn watch(&self) -> watch::Receiver<WalletSession> {
        self.state.subscribe()
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub fn is_subscribed(&self) -> bool {
        self.listener.is_some()
    }

    /// Most recent user-visible failure, if any.
    pub fn last_notice(&self) -> Option<&WalletError> {
        self.last_notice.as_ref()
    }

    /// Take the most recent failure so the UI can show it once.
    pub fn take_notice(&mut self) -> Option<WalletError> {
        self.last_notice.take()
    }

    fn current_token(&self) -> RequestToken {
        RequestToken(self.epoch)
    }

    fn advance(&mut self) -> RequestToken {
        self.epoch += 1;
        self.current_token()
    }

    fn record(&mut self, err: WalletError) -> WalletError {
        if err.is_user_visible() {
            self.last_notice = Some(err.clone());
        }
        err
    }

    fn publish(&self, account: Option<String>, connecting: bool) {
        self.state.send_replace(WalletSession {
            account,
            connecting,
        });
    }

    /// Build the silent startup query for already-authorized accounts.
    ///
    /// Returns `None` when there is no provider or an account is already known.
    /// Issuing it does not change the session.
    pub fn begin_restore(&self) -> Option<AccountsRequest> {
        let provider = self.provider.clone()?;
        if self.state.borrow().account.is_some() {
            return None;
        }
        Some(AccountsRequest {
            token: self.current_token(),
            kind: RequestKind::Restore,
            provider,
        })
    }

    /// Start an interactive connect.
    ///
    /// A connect issued while another is pending abandons the earlier one.
    pub fn begin_connect(&mut self) -> Result<AccountsRequest, WalletError> {
        let session = self.session();
        if session.account.is_some() && !session.connecting {
            return Err(self.record(WalletError::AlreadyConnected));
        }
        let Some(provider) = self.provider.clone() else {
            warn!("connect requested without a wallet provider");
            return Err(self.record(WalletError::ProviderUnavailable));
        };

        let token = self.advance();
        self.last_notice = None;
        self.publish(session.account, true);
        debug!(token = token.0, "wallet connect started");
        Ok(AccountsRequest {
            token,
            kind: RequestKind::Connect,
            provider,
        })
    }

    /// Apply a finished request.
    ///
    /// Returns the connected address on success, `Ok(None)` for a restore that
    /// found nothing, and `StaleCompletion` when the session moved on in the
    /// meantime. A stale completion never changes the session.
    pub fn complete(
        &mut self,
        completion: AccountsCompletion,
    ) -> Result<Option<String>, WalletError> {
        if completion.token != self.current_token() {
            debug!(
                token = completion.token.0,
                current = self.epoch,
                kind = ?completion.kind,
                "discarding stale wallet completion"
            );
            return Err(WalletError::StaleCompletion);
        }
        self.advance();

        match completion.kind {
            RequestKind::Restore => match completion.result {
                Ok(accounts) => match accounts.into_iter().next() {
                    Some(account) => {
                        info!(account = %format_address(&account), "restored authorized wallet account");
                        self.publish(Some(account.clone()), false);
                        Ok(Some(account))
                    }
                    None => Ok(None),
                },
                Err(e) => {
                    warn!(error = %e, "silent wallet account query failed");
                    Ok(None)
                }
            },
            RequestKind::Connect => match completion.result {
                Ok(accounts) => match accounts.into_iter().next() {
                    Some(account) => {
                        info!(account = %format_address(&account), "wallet connected");
                        self.publish(Some(account.clone()), false);
                        Ok(Some(account))
                    }
                    None => {
                        warn!("wallet authorized no accounts");
                        self.publish(None, false);
                        Err(self.record(WalletError::AuthorizationRejected(
                            "wallet returned no accounts".to_string(),
                        )))
                    }
                },
                Err(e) => {
                    warn!(error = %e, "wallet connect failed");
                    self.publish(None, false);
                    Err(self.record(WalletError::AuthorizationRejected(e.to_string())))
                }
            },
        }
    }

    /// Forget the connected account locally. Provider authorization is untouched.
    pub fn disconnect(&mut self) {
        self.advance();
        self.publish(None, false);
        info!("wallet disconnected");
    }

    /// Apply a provider account-change notification, whatever the current state.
    pub fn apply_accounts_changed(&mut self, accounts: Vec<String>) {
        self.advance();
        let account = accounts.into_iter().next();
        match account {
            Some(ref a) => info!(account = %format_address(a), "wallet account changed"),
            None => info!("wallet reports no authorized accounts"),
        }
        self.publish(account, false);
    }

    /// Register the manager's account-change listener with the provider.
    ///
    /// Returns the receiving end the first time only; later calls return
    /// `None` so at most one listener is ever active.
    pub fn subscribe(&mut self) -> Option<mpsc::UnboundedReceiver<Vec<String>>> {
        if self.listener.is_some() {
            return None;
        }
        let provider = self.provider.as_ref()?;
        let (tx, rx) = mpsc::unbounded_channel();
        let id = provider.on_accounts_changed(tx);
        debug!(listener = id.0, "subscribed to wallet account changes");
        self.listener = Some(id);
        Some(rx)
    }

    /// Remove the listener registered by `subscribe`, if any.
    pub fn teardown(&mut self) {
        if let Some(id) = self.listener.take()
            && let Some(ref provider) = self.provider
        {
            provider.remove_accounts_changed_listener(id);
            debug!(listener = id.0, "unsubscribed from wallet account changes");
        }
    }

    /// Silent startup query driven inline.
    pub async fn restore(&mut self) -> Option<String> {
        let request = self.begin_restore()?;
        let completion = request.run().await;
        self.complete(completion).ok().flatten()
    }

    /// Interactive connect driven inline.
    pub async fn connect(&mut self) -> Result<String, WalletError> {
        let request = self.begin_connect()?;
        let completion = request.run().await;
        self.complete(completion)?
            .ok_or_else(|| WalletError::AuthorizationRejected("wallet returned no accounts".into()))
    }
}

impl Drop for WalletSessionManager {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;

    #[derive(Default)]
    struct FixedProvider {
        accounts: Vec<String>,
        listeners: Mutex<Vec<ListenerId>>,
        removed: Mutex<Vec<ListenerId>>,
    }

    #[async_trait]
    impl WalletProvider for FixedProvider {
        async fn request_accounts(&self) -> Result<Vec<String>, ProviderError> {
            Ok(self.accounts.clone())
        }

        async fn get_accounts(&self) -> Result<Vec<String>, ProviderError> {
            Ok(self.accounts.clone())
        }

        fn on_accounts_changed(&self, _listener: mpsc::UnboundedSender<Vec<String>>) -> ListenerId {
            let mut listeners = self.listeners.lock().unwrap();
            let id = ListenerId(listeners.len() as u64 + 1);
            listeners.push(id);
            id
        }

        fn remove_accounts_changed_listener(&self, id: ListenerId) {
            self.removed.lock().unwrap().push(id);
        }
    }

    fn provider_with(accounts: &[&str]) -> Arc<FixedProvider> {
        Arc::new(FixedProvider {
            accounts: accounts.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        })
    }

    #[test]
    fn status_reflects_fields() {
        let mut session = WalletSession::default();
        assert_eq!(session.status(), SessionStatus::Disconnected);
        session.connecting = true;
        assert_eq!(session.status(), SessionStatus::Connecting);
        session.connecting = false;
        session.account = Some("0xabc".to_string());
        assert_eq!(session.status(), SessionStatus::Connected("0xabc".to_string()));
    }

    #[test]
    fn new_manager_is_disconnected() {
        let manager = WalletSessionManager::new(None);
        assert_eq!(manager.session(), WalletSession::default());
        assert!(!manager.has_provider());
        assert!(manager.last_notice().is_none());
    }

    #[test]
    fn begin_connect_sets_connecting() {
        let mut manager = WalletSessionManager::new(Some(provider_with(&["0x1"])));
        let request = manager.begin_connect().unwrap();
        assert_eq!(request.kind(), RequestKind::Connect);
        assert!(manager.session().connecting);
    }

    #[test]
    fn provider_absent_records_notice() {
        let mut manager = WalletSessionManager::new(None);
        let err = manager.begin_connect().err().unwrap();
        assert_eq!(err, WalletError::ProviderUnavailable);
        assert_eq!(manager.last_notice(), Some(&WalletError::ProviderUnavailable));
        assert!(!manager.session().connecting);
    }

    #[tokio::test]
    async fn connect_while_connected_is_refused() {
        let mut manager = WalletSessionManager::new(Some(provider_with(&["0x1"])));
        manager.connect().await.unwrap();
        let err = manager.begin_connect().err().unwrap();
        assert_eq!(err, WalletError::AlreadyConnected);
        assert_eq!(manager.session().account.as_deref(), Some("0x1"));
    }

    #[tokio::test]
    async fn reissued_connect_supersedes_pending_one() {
        let mut manager = WalletSessionManager::new(Some(provider_with(&["0x1"])));
        let first = manager.begin_connect().unwrap();
        let second = manager.begin_connect().unwrap();
        assert!(second.token() > first.token());

        let stale = first.run().await;
        assert_eq!(manager.complete(stale), Err(WalletError::StaleCompletion));
        assert!(manager.session().connecting, "newer connect still pending");

        let fresh = second.run().await;
        assert_eq!(manager.complete(fresh), Ok(Some("0x1".to_string())));
        assert!(!manager.session().connecting);
    }

    #[tokio::test]
    async fn completion_applies_only_once() {
        let mut manager = WalletSessionManager::new(Some(provider_with(&["0x1"])));
        let completion = manager.begin_connect().unwrap().run().await;
        assert!(manager.complete(completion.clone()).is_ok());
        manager.disconnect();
        assert_eq!(manager.complete(completion), Err(WalletError::StaleCompletion));
        assert!(manager.session().account.is_none());
    }

    #[tokio::test]
    async fn empty_connect_result_is_rejection() {
        let mut manager = WalletSessionManager::new(Some(provider_with(&[])));
        let err = manager.connect().await.err().unwrap();
        assert!(matches!(err, WalletError::AuthorizationRejected(_)));
        assert_eq!(manager.session(), WalletSession::default());
    }

    #[tokio::test]
    async fn restore_with_no_accounts_stays_disconnected() {
        let mut manager = WalletSessionManager::new(Some(provider_with(&[])));
        assert_eq!(manager.restore().await, None);
        assert_eq!(manager.session(), WalletSession::default());
        assert!(manager.last_notice().is_none());
    }

    #[tokio::test]
    async fn restore_is_stale_after_user_action() {
        let mut manager = WalletSessionManager::new(Some(provider_with(&["0x1"])));
        let restore = manager.begin_restore().unwrap();
        manager.apply_accounts_changed(vec!["0x2".to_string()]);
        let completion = restore.run().await;
        assert_eq!(manager.complete(completion), Err(WalletError::StaleCompletion));
        assert_eq!(manager.session().account.as_deref(), Some("0x2"));
    }

    #[test]
    fn accounts_changed_invalidates_pending_connect() {
        let mut manager = WalletSessionManager::new(Some(provider_with(&["0x1"])));
        let request = manager.begin_connect().unwrap();
        manager.apply_accounts_changed(vec!["0x2".to_string()]);
        assert_eq!(manager.session().account.as_deref(), Some("0x2"));
        assert!(!manager.session().connecting);

        let completion = AccountsCompletion {
            token: request.token(),
            kind: RequestKind::Connect,
            result: Ok(vec!["0x1".to_string()]),
        };
        assert_eq!(manager.complete(completion), Err(WalletError::StaleCompletion));
        assert_eq!(manager.session().account.as_deref(), Some("0x2"));
    }

    #[test]
    fn watch_receivers_observe_changes() {
        let mut manager = WalletSessionManager::new(Some(provider_with(&[])));
        let rx = manager.watch();
        manager.apply_accounts_changed(vec!["0xabc".to_string()]);
        assert_eq!(rx.borrow().account.as_deref(), Some("0xabc"));
        manager.disconnect();
        assert!(rx.borrow().account.is_none());
    }

    #[test]
    fn subscribe_registers_exactly_one_listener() {
        let provider = provider_with(&[]);
        let mut manager = WalletSessionManager::new(Some(provider.clone()));
        assert!(manager.subscribe().is_some());
        assert!(manager.subscribe().is_none());
        assert_eq!(provider.listeners.lock().unwrap().len(), 1);

        manager.teardown();
        assert!(!manager.is_subscribed());
        assert_eq!(*provider.removed.lock().unwrap(), vec![ListenerId(1)]);

        // A fresh subscription after teardown is allowed.
        assert!(manager.subscribe().is_some());
    }

    #[test]
    fn drop_releases_listener() {
        let provider = provider_with(&[]);
        {
            let mut manager = WalletSessionManager::new(Some(provider.clone()));
            let _rx = manager.subscribe();
        }
        assert_eq!(provider.removed.lock().unwrap().len(), 1);
    }

    #[test]
    fn subscribe_without_provider_is_none() {
        let mut manager = WalletSessionManager::new(None);
        assert!(manager.subscribe().is_none());
    }
}
