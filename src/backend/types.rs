// ABOUTME: Request and response shapes for the agent backend's aigent and blend routes.
// ABOUTME: Deserialization is lenient: missing optional fields fall back to defaults.

use serde::{Deserialize, Serialize};

/// Body of `POST /aigent/create-agent/{user_id}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAgentRequest {
    pub nft_hash: String,
    pub prompt: String,
}

/// The backend answers agent creation with the agent's wallet address.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAgentResponse {
    pub wallet_address: String,
}

/// Body of `POST /aigent/agent-interact/{nft_hash}/{user_id}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractRequest {
    pub nft_hash: String,
    pub user_id: String,
    pub prompt: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InteractResponse {
    pub response: String,
    #[serde(rename = "isMetaMask", default)]
    pub is_meta_mask: bool,
    #[serde(rename = "walletAddress", default)]
    pub wallet_address: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(rename = "Responses", default)]
    pub responses: i64,
}

/// Agent personality as stored by the backend. All parts may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Personality {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub concepts: Vec<String>,
    #[serde(default)]
    pub tools: Vec<serde_json::Value>,
}

/// One recorded exchange, or the raw text when the backend could not parse it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ConversationEntry {
    Exchange {
        question: String,
        answer: String,
        #[serde(default)]
        timestamp: Option<String>,
    },
    Raw {
        raw: String,
    },
}

/// An agent visible to a user, from `GET /aigent/user-agents/{user_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgent {
    pub nft_hash: String,
    #[serde(default)]
    pub wallet_id: Option<String>,
    #[serde(default)]
    pub is_creator: bool,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub personality: Personality,
    #[serde(default)]
    pub parsed_conversation: Vec<ConversationEntry>,
}

impl UserAgent {
    /// Short label: the start of the personality description, or a hash-based name.
    pub fn label(&self) -> String {
        let description = self.personality.description.trim();
        if description.is_empty() {
            let prefix: String = self.nft_hash.chars().take(4).collect();
            format!("Agent {}", prefix)
        } else {
            description.chars().take(20).collect()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentsResponse {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub agents: Vec<UserAgent>,
}

/// Paged conversation history, from `GET /aigent/conversation-history/{nft_hash}/{user_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationHistory {
    pub nft_hash: String,
    #[serde(default)]
    pub wallet_id: Option<String>,
    #[serde(default)]
    pub wallet_address: String,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub personality: Personality,
    #[serde(default)]
    pub total_conversations: usize,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub limit: usize,
    #[serde(default)]
    pub conversations: Vec<ConversationEntry>,
}

/// An agent created by the blend manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendAgent {
    pub name: String,
    #[serde(default)]
    pub functions: Vec<String>,
    #[serde(default)]
    pub wallet_address: String,
    #[serde(default)]
    pub wallet_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nft_hash: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateAgentsRequest {
    pub prompt: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAgentsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub agent_count: usize,
    #[serde(default)]
    pub agents: Vec<BlendAgent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunAgentRequest {
    pub agent_index: usize,
    pub prompt: String,
    pub wallet_id: String,
    pub functions: Vec<String>,
}

impl RunAgentRequest {
    pub fn for_agent(agent: &BlendAgent, agent_index: usize, prompt: impl Into<String>) -> Self {
        Self {
            agent_index,
            prompt: prompt.into(),
            wallet_id: agent.wallet_id.clone(),
            functions: agent.functions.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunAgentResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl RunAgentResponse {
    /// Text to show for the run: the error if any, else result, else output.
    pub fn display_text(&self) -> String {
        if let Some(ref error) = self.error {
            return format!("error: {}", error);
        }
        match self.result {
            Some(serde_json::Value::String(ref s)) => return s.clone(),
            Some(serde_json::Value::Null) | None => {}
            Some(ref other) => return other.to_string(),
        }
        self.output.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_agent_request_uses_camel_case() {
        let body = CreateAgentRequest {
            nft_hash: "abc".to_string(),
            prompt: "be helpful".to_string(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"nftHash": "abc", "prompt": "be helpful"}));
    }

    #[test]
    fn interact_response_reads_backend_names() {
        let json = r#"{"response":"hi","isMetaMask":true,"walletAddress":"0x1","value":0.5,"Responses":2}"#;
        let parsed: InteractResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.response, "hi");
        assert!(parsed.is_meta_mask);
        assert_eq!(parsed.wallet_address.as_deref(), Some("0x1"));
        assert_eq!(parsed.value, Some(0.5));
        assert_eq!(parsed.responses, 2);
    }

    #[test]
    fn conversation_entry_variants() {
        let exchange: ConversationEntry =
            serde_json::from_str(r#"{"question":"q","answer":"a","timestamp":null}"#).unwrap();
        assert_eq!(
            exchange,
            ConversationEntry::Exchange {
                question: "q".to_string(),
                answer: "a".to_string(),
                timestamp: None,
            }
        );
        let raw: ConversationEntry = serde_json::from_str(r#"{"raw":"garbled"}"#).unwrap();
        assert_eq!(raw, ConversationEntry::Raw { raw: "garbled".to_string() });
    }

    #[test]
    fn user_agent_tolerates_empty_personality() {
        let json = r#"{"nft_hash":"deadbeef","wallet_id":"w1","is_creator":true,"members":[],
            "conversation":"No conversations yet","address":"","personality":{}}"#;
        let agent: UserAgent = serde_json::from_str(json).unwrap();
        assert_eq!(agent.label(), "Agent dead");
        assert!(agent.parsed_conversation.is_empty());
    }

    #[test]
    fn user_agent_label_uses_description() {
        let json = r#"{"nft_hash":"x","personality":{"description":"A cheerful trading assistant"}}"#;
        let agent: UserAgent = serde_json::from_str(json).unwrap();
        assert_eq!(agent.label(), "A cheerful trading a");
    }

    #[test]
    fn run_agent_display_prefers_error_then_result() {
        let failed = RunAgentResponse {
            error: Some("boom".to_string()),
            result: Some(serde_json::json!("ignored")),
            ..Default::default()
        };
        assert_eq!(failed.display_text(), "error: boom");

        let ok = RunAgentResponse {
            result: Some(serde_json::json!("sent 1 ETH")),
            output: Some("ignored".to_string()),
            ..Default::default()
        };
        assert_eq!(ok.display_text(), "sent 1 ETH");

        let output_only = RunAgentResponse {
            output: Some("done".to_string()),
            ..Default::default()
        };
        assert_eq!(output_only.display_text(), "done");
    }
}
