// ABOUTME: Wallet session failure taxonomy.
// ABOUTME: Failures are recorded as notices for the UI; none of them abort the event loop.

use thiserror::Error;

/// Why a wallet session operation did not take effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    /// No wallet provider is configured or reachable at connect time.
    #[error("no wallet provider detected; configure a wallet RPC endpoint to connect")]
    ProviderUnavailable,
    /// The user declined, or the provider failed during the interactive request.
    #[error("wallet connection rejected: {0}")]
    AuthorizationRejected(String),
    /// A connect completion arrived after the session had already moved on.
    #[error("stale wallet completion discarded")]
    StaleCompletion,
    /// Connect was requested while an account is already connected.
    #[error("wallet already connected")]
    AlreadyConnected,
}

impl WalletError {
    /// Whether the failure should be shown to the user.
    ///
    /// Stale completions are dropped silently.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, WalletError::StaleCompletion)
    }
}
