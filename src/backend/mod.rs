// ABOUTME: Backend module: typed client for the external agent service.
// ABOUTME: The backend owns all agent and conversation data; this side only calls it.

pub mod aigent;
pub mod blend;
pub mod client;
pub mod types;

pub use aigent::{AigentService, DEFAULT_HISTORY_LIMIT};
pub use blend::BlendService;
pub use client::{BackendClient, BackendClientConfig, BackendError};
pub use types::*;
