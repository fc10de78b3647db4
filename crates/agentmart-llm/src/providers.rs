//! LLM Provider implementations

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::*;

/// Trait for LLM providers
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &'static str;

    /// Get the provider kind
    fn kind(&self) -> ProviderKind;

    /// Check if the provider is available
    async fn is_available(&self) -> bool;

    /// Complete a conversation
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;
}

// ============================================================================
// Chat Completions wire format (shared by OpenAI and compatible servers)
// ============================================================================

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ChatTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<serde_json::Value>,
    stream: bool,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(default, skip_serializing)]
    tool_calls: Vec<ChatToolCall>,
}

#[derive(Serialize)]
struct ChatTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: ToolSpec,
}

#[derive(Deserialize)]
struct ChatToolCall {
    #[serde(default)]
    id: String,
    function: ChatFunctionCall,
}

#[derive(Deserialize)]
struct ChatFunctionCall {
    name: String,
    /// JSON-encoded arguments, as returned by the API
    #[serde(default)]
    arguments: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize, Default)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

fn tool_choice_value(choice: &ToolChoice) -> serde_json::Value {
    match choice {
        ToolChoice::Auto => serde_json::json!("auto"),
        ToolChoice::None => serde_json::json!("none"),
        ToolChoice::Required => serde_json::json!("required"),
        ToolChoice::Specific { name } => serde_json::json!({
            "type": "function",
            "function": { "name": name },
        }),
    }
}

fn build_chat_request(request: CompletionRequest, default_model: &str) -> ChatRequest {
    let mut messages: Vec<ChatMessage> = vec![];

    if let Some(system) = request.system {
        messages.push(ChatMessage {
            role: MessageRole::System.as_str().to_string(),
            content: Some(system),
            tool_call_id: None,
            tool_calls: vec![],
        });
    }

    for msg in request.messages {
        messages.push(ChatMessage {
            role: msg.role.as_str().to_string(),
            content: Some(msg.content),
            tool_call_id: msg.tool_call_id,
            tool_calls: vec![],
        });
    }

    let tools = request.tools.map(|tools| {
        tools
            .into_iter()
            .map(|function| ChatTool {
                kind: "function",
                function,
            })
            .collect()
    });

    ChatRequest {
        model: request.model.unwrap_or_else(|| default_model.to_string()),
        messages,
        temperature: request.temperature,
        max_tokens: request.max_tokens,
        tool_choice: request.tool_choice.as_ref().map(tool_choice_value),
        tools,
        stream: false,
    }
}

fn parse_chat_response(response: ChatResponse, default_model: &str) -> Result<CompletionResponse> {
    let usage = response.usage.unwrap_or_default();
    let message = response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message)
        .ok_or_else(|| LLMError::InvalidResponse {
            message: "response contained no choices".to_string(),
        })?;

    let mut tool_calls = Vec::with_capacity(message.tool_calls.len());
    for call in message.tool_calls {
        let arguments = if call.function.arguments.trim().is_empty() {
            serde_json::json!({})
        } else {
            serde_json::from_str(&call.function.arguments).map_err(|e| LLMError::InvalidResponse {
                message: format!("tool call arguments for {}: {}", call.function.name, e),
            })?
        };
        tool_calls.push(ToolCall {
            id: call.id,
            name: call.function.name,
            arguments,
        });
    }

    Ok(CompletionResponse {
        content: message.content.unwrap_or_default(),
        tool_calls,
        usage: TokenUsage {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        },
        model: response.model.or_else(|| Some(default_model.to_string())),
    })
}

async fn send_chat_request(
    client: &reqwest::Client,
    url: &str,
    api_key: Option<&str>,
    body: &ChatRequest,
    default_model: &str,
) -> Result<CompletionResponse> {
    let mut req = client.post(url).json(body);
    if let Some(key) = api_key {
        req = req.bearer_auth(key);
    }

    let response = req.send().await.map_err(|e| LLMError::NetworkError {
        message: e.to_string(),
    })?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(LLMError::RequestFailed {
            message: format!("HTTP {}: {}", status, body),
        });
    }

    let chat_response: ChatResponse =
        response.json().await.map_err(|e| LLMError::InvalidResponse {
            message: e.to_string(),
        })?;

    parse_chat_response(chat_response, default_model)
}

// ============================================================================
// OpenAI Provider
// ============================================================================

/// Configuration for OpenAI provider
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key; requests fail with a configuration error when absent
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4".to_string(),
        }
    }
}

impl OpenAIConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            model: std::env::var("AGENTMART_OPENAI_MODEL").unwrap_or_else(|_| "gpt-4".to_string()),
            ..Default::default()
        }
    }
}

/// OpenAI API provider
pub struct OpenAIProvider {
    config: OpenAIConfig,
    client: reqwest::Client,
}

impl OpenAIProvider {
    pub fn new(config: OpenAIConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(OpenAIConfig::from_env())
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    fn name(&self) -> &'static str {
        "OpenAI"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAI
    }

    async fn is_available(&self) -> bool {
        // Just check if we have an API key
        self.config.api_key.is_some()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| LLMError::ConfigurationError {
                message: "LLM API key not configured".to_string(),
            })?;

        let body = build_chat_request(request, &self.config.model);
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        send_chat_request(&self.client, &url, Some(api_key), &body, &self.config.model).await
    }
}

// ============================================================================
// OpenAI-Compatible Provider
// ============================================================================

/// Configuration for OpenAI-compatible provider
#[derive(Debug, Clone)]
pub struct OpenAICompatConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for OpenAICompatConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var("AGENTMART_OPENAI_COMPAT_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000/v1".to_string()),
            api_key: std::env::var("AGENTMART_OPENAI_COMPAT_API_KEY").ok(),
            model: std::env::var("AGENTMART_OPENAI_COMPAT_MODEL")
                .unwrap_or_else(|_| "default".to_string()),
        }
    }
}

/// OpenAI-compatible API provider (vLLM, llama.cpp, etc.)
pub struct OpenAICompatProvider {
    config: OpenAICompatConfig,
    client: reqwest::Client,
}

impl OpenAICompatProvider {
    pub fn new(config: OpenAICompatConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(OpenAICompatConfig::default())
    }
}

#[async_trait]
impl LLMProvider for OpenAICompatProvider {
    fn name(&self) -> &'static str {
        "OpenAI-Compatible"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAICompat
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/models", self.config.base_url.trim_end_matches('/'));
        let mut req = self.client.get(&url);
        if let Some(ref key) = self.config.api_key {
            req = req.bearer_auth(key);
        }
        req.send().await.is_ok()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let body = build_chat_request(request, &self.config.model);
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        send_chat_request(
            &self.client,
            &url,
            self.config.api_key.as_deref(),
            &body,
            &self.config.model,
        )
        .await
    }
}

// ============================================================================
// Deterministic Provider (Fallback)
// ============================================================================

/// Text returned by the deterministic provider
pub const DETERMINISTIC_REPLY: &str =
    "No language model is configured, so I can't route this request to an agent right now.";

/// Deterministic fallback when no LLM is available
pub struct DeterministicProvider;

impl DeterministicProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DeterministicProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMProvider for DeterministicProvider {
    fn name(&self) -> &'static str {
        "Deterministic"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Deterministic
    }

    async fn is_available(&self) -> bool {
        true // Always available
    }

    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse> {
        Ok(CompletionResponse {
            content: DETERMINISTIC_REPLY.to_string(),
            tool_calls: vec![],
            usage: TokenUsage::default(),
            model: Some("deterministic".to_string()),
        })
    }
}
