//! Orchestrated chat DTOs

use agentmart_llm::Message;
use agentmart_types::AgentCall;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestrateRequest {
    #[serde(default)]
    pub wallet_address: Option<String>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// Execution of a call the user approved
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    #[serde(default)]
    pub wallet_address: Option<String>,
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecuteResponse {
    pub message: String,
    pub call: AgentCall,
}
