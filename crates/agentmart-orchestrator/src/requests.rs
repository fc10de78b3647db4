//! Completion requests sent to the model

use agentmart_catalog::prompt::summary_user_prompt;
use agentmart_catalog::{tool_specs, DEFAULT_SUMMARY, SUMMARY_SYSTEM_PROMPT, SYSTEM_PROMPT};
use agentmart_llm::{CompletionRequest, LLMRouter, Message, MessageRole, Result, ToolChoice};
use serde_json::Value;

pub const CHAT_TEMPERATURE: f32 = 0.7;
pub const CHAT_MAX_TOKENS: u32 = 500;
pub const SUMMARY_TEMPERATURE: f32 = 0.3;
pub const SUMMARY_MAX_TOKENS: u32 = 100;

/// Chat turn with the function catalog attached
///
/// Client-supplied system messages are dropped; the marketplace system
/// prompt always comes first.
pub fn chat_request(messages: Vec<Message>) -> CompletionRequest {
    let messages = messages
        .into_iter()
        .filter(|m| m.role != MessageRole::System)
        .collect();

    CompletionRequest::new(messages)
        .with_system(SYSTEM_PROMPT)
        .with_tools(tool_specs(), ToolChoice::Auto)
        .with_temperature(CHAT_TEMPERATURE)
        .with_max_tokens(CHAT_MAX_TOKENS)
}

pub fn summary_request(agent_name: &str, input: &Value, output: &Value) -> CompletionRequest {
    CompletionRequest::new(vec![Message::user(summary_user_prompt(agent_name, input, output))])
        .with_system(SUMMARY_SYSTEM_PROMPT)
        .with_temperature(SUMMARY_TEMPERATURE)
        .with_max_tokens(SUMMARY_MAX_TOKENS)
}

/// One-line summary of an execution; blank model output becomes the default
pub async fn summarize(llm: &LLMRouter, agent_name: &str, input: &Value, output: &Value) -> Result<String> {
    let response = llm.complete(summary_request(agent_name, input, output)).await?;
    let summary = response.content.trim();
    if summary.is_empty() {
        Ok(DEFAULT_SUMMARY.to_string())
    } else {
        Ok(summary.to_string())
    }
}
