// ABOUTME: Aigent routes: single-agent creation, chat, conversation history, and agent listing.
// ABOUTME: Agents are keyed by an NFT hash and scoped to the user's wallet address.

use urlencoding::encode;

use crate::backend::client::{BackendClient, BackendError};
use crate::backend::types::{
    ConversationHistory, CreateAgentRequest, CreateAgentResponse, InteractRequest,
    InteractResponse, UserAgentsResponse,
};

/// Server-side page size the backend uses when none is given.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone)]
pub struct AigentService {
    client: BackendClient,
}

impl AigentService {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn create_agent_path(user_id: &str) -> String {
        format!("/aigent/create-agent/{}", encode(user_id.trim()))
    }

    #[must_use]
    pub fn interact_path(nft_hash: &str, user_id: &str) -> String {
        format!(
            "/aigent/agent-interact/{}/{}",
            encode(nft_hash.trim()),
            encode(user_id.trim())
        )
    }

    #[must_use]
    pub fn history_path(nft_hash: &str, user_id: &str, offset: usize, limit: usize) -> String {
        format!(
            "/aigent/conversation-history/{}/{}?offset={offset}&limit={limit}",
            encode(nft_hash.trim()),
            encode(user_id.trim())
        )
    }

    #[must_use]
    pub fn user_agents_path(user_id: &str) -> String {
        format!("/aigent/user-agents/{}", encode(user_id.trim()))
    }

    pub async fn create_agent(
        &self,
        user_id: &str,
        nft_hash: &str,
        prompt: &str,
    ) -> Result<CreateAgentResponse, BackendError> {
        let body = CreateAgentRequest {
            nft_hash: nft_hash.to_string(),
            prompt: prompt.to_string(),
        };
        self.client
            .post_json(Self::create_agent_path(user_id).as_str(), &body)
            .await
    }

    pub async fn interact(
        &self,
        nft_hash: &str,
        user_id: &str,
        prompt: &str,
    ) -> Result<InteractResponse, BackendError> {
        let body = InteractRequest {
            nft_hash: nft_hash.to_string(),
            user_id: user_id.to_string(),
            prompt: prompt.to_string(),
        };
        self.client
            .post_json(Self::interact_path(nft_hash, user_id).as_str(), &body)
            .await
    }

    pub async fn conversation_history(
        &self,
        nft_hash: &str,
        user_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<ConversationHistory, BackendError> {
        self.client
            .get_json(Self::history_path(nft_hash, user_id, offset, limit).as_str())
            .await
    }

    pub async fn user_agents(&self, user_id: &str) -> Result<UserAgentsResponse, BackendError> {
        self.client
            .get_json(Self::user_agents_path(user_id).as_str())
            .await
    }
}
