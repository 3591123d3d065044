// ABOUTME: Wallet module: provider capability, JSON-RPC provider, and the session manager.
// ABOUTME: The session manager is the single writer of the connected-account state.

pub mod error;
pub mod json_rpc;
pub mod provider;
pub mod session;

pub use error::WalletError;
pub use json_rpc::{JsonRpcProvider, JsonRpcProviderConfig};
pub use provider::{ListenerId, ProviderError, USER_REJECTED_CODE, WalletProvider};
pub use session::{
    AccountsCompletion, AccountsRequest, RequestKind, RequestToken, SessionStatus,
    WalletSession, WalletSessionManager,
};
