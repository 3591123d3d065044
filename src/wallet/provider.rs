// ABOUTME: Wallet provider capability: the account interface a wallet exposes to this client.
// ABOUTME: Interactive and silent account queries plus account-change listener registration.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// EIP-1193 error code for "user rejected the request".
pub const USER_REJECTED_CODE: i64 = 4001;

/// Handle for a registered account-change listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Failure reported by a wallet provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("wallet refused the request ({code}): {message}")]
    Rejected { code: i64, message: String },
    #[error("wallet transport failed: {0}")]
    Transport(String),
    #[error("malformed wallet response: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// Whether the user explicitly declined the request.
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, ProviderError::Rejected { code, .. } if *code == USER_REJECTED_CODE)
    }
}

/// The account surface of a wallet.
///
/// Listeners receive the full list of authorized addresses on every change;
/// an empty list means the wallet no longer authorizes any account.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the user to authorize accounts. May stay pending indefinitely.
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError>;

    /// Accounts already authorized for this client, without prompting.
    async fn get_accounts(&self) -> Result<Vec<String>, ProviderError>;

    /// Register a listener for account changes.
    fn on_accounts_changed(&self, listener: mpsc::UnboundedSender<Vec<String>>) -> ListenerId;

    /// Remove a listener previously returned by `on_accounts_changed`.
    fn remove_accounts_changed_listener(&self, id: ListenerId);
}
