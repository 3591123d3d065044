// ABOUTME: Blend routes: the web3 manager that turns a project prompt into a team of agents.
// ABOUTME: Agents are created in bulk, listed per user, and run with their wallet and functions.

use urlencoding::encode;

use crate::backend::client::{BackendClient, BackendError};
use crate::backend::types::{
    BlendAgent, CreateAgentsRequest, CreateAgentsResponse, RunAgentRequest, RunAgentResponse,
};

#[derive(Debug, Clone)]
pub struct BlendService {
    client: BackendClient,
}

impl BlendService {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn manager_path(user_id: &str, action: &str) -> String {
        format!("/blend/web3_manager/{}/{}", encode(user_id.trim()), action)
    }

    pub async fn create_agents(
        &self,
        user_id: &str,
        prompt: &str,
    ) -> Result<CreateAgentsResponse, BackendError> {
        let body = CreateAgentsRequest {
            prompt: prompt.to_string(),
        };
        self.client
            .post_json(Self::manager_path(user_id, "create-agents").as_str(), &body)
            .await
    }

    pub async fn run_agent(
        &self,
        user_id: &str,
        request: &RunAgentRequest,
    ) -> Result<RunAgentResponse, BackendError> {
        self.client
            .post_json(Self::manager_path(user_id, "run-agent").as_str(), request)
            .await
    }

    /// The backend answers with a bare JSON array.
    pub async fn list_agents(&self, user_id: &str) -> Result<Vec<BlendAgent>, BackendError> {
        self.client
            .get_json(Self::manager_path(user_id, "agents").as_str())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manager_paths() {
        assert_eq!(
            BlendService::manager_path("0xabc", "create-agents"),
            "/blend/web3_manager/0xabc/create-agents"
        );
        assert_eq!(
            BlendService::manager_path(" 0xabc", "agents"),
            "/blend/web3_manager/0xabc/agents"
        );
        assert_eq!(
            BlendService::manager_path("../admin", "agents"),
            "/blend/web3_manager/..%2Fadmin/agents"
        );
    }
}
