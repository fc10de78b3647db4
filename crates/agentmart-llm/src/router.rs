//! LLM Router - Selects and manages LLM providers

use std::sync::Arc;

use crate::providers::*;
use crate::types::*;

/// The LLM Router selects and manages providers based on configuration
#[derive(Clone)]
pub struct LLMRouter {
    provider: Arc<dyn LLMProvider>,
    kind: ProviderKind,
}

impl std::fmt::Debug for LLMRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LLMRouter")
            .field("provider", &self.provider.name())
            .field("kind", &self.kind)
            .finish()
    }
}

impl LLMRouter {
    /// Create a router with a specific provider
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        let kind = provider.kind();
        Self { provider, kind }
    }

    /// Create a router from environment variables
    ///
    /// Reads `AGENTMART_LLM_PROVIDER` to select the provider:
    /// - `openai` (default): OpenAI API, key from `OPENAI_API_KEY`
    /// - `openai_compat`: OpenAI-compatible server
    /// - `deterministic`: No LLM, fixed plain-text reply
    pub fn from_env() -> Self {
        // Try to load .env file (ignore errors)
        let _ = dotenvy::dotenv();

        let provider_name =
            std::env::var("AGENTMART_LLM_PROVIDER").unwrap_or_else(|_| "openai".to_string());

        let kind = ProviderKind::from_str(&provider_name).unwrap_or_else(|| {
            tracing::warn!(provider = %provider_name, "Unknown LLM provider, using openai");
            ProviderKind::OpenAI
        });

        Self::from_kind(kind)
    }

    /// Create a router for a specific provider kind
    ///
    /// The OpenAI provider is kept even without a key so that requests fail
    /// with a configuration error instead of silently degrading.
    pub fn from_kind(kind: ProviderKind) -> Self {
        let provider: Arc<dyn LLMProvider> = match kind {
            ProviderKind::OpenAI => {
                let provider = OpenAIProvider::from_env();
                if OpenAIConfig::from_env().api_key.is_none() {
                    tracing::warn!("OPENAI_API_KEY not set, chat requests will be rejected");
                }
                Arc::new(provider)
            }
            ProviderKind::OpenAICompat => Arc::new(OpenAICompatProvider::from_env()),
            ProviderKind::Deterministic => Arc::new(DeterministicProvider::new()),
        };

        Self { provider, kind }
    }

    /// Get the current provider
    pub fn provider(&self) -> &Arc<dyn LLMProvider> {
        &self.provider
    }

    /// Get the provider kind
    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    /// Check if the provider is available
    pub async fn is_available(&self) -> bool {
        self.provider.is_available().await
    }

    /// Complete a request using the current provider
    pub async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let tools = request.tools.as_ref().map(|t| t.len()).unwrap_or(0);
        tracing::debug!(
            provider = self.provider.name(),
            messages = request.messages.len(),
            tools,
            "LLM completion request"
        );

        let response = self.provider.complete(request).await;
        if let Err(ref e) = response {
            tracing::warn!(provider = self.provider.name(), error = %e, "LLM completion failed");
        }
        response
    }
}

impl Default for LLMRouter {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Builder for LLM router with explicit configuration
pub struct LLMRouterBuilder {
    kind: Option<ProviderKind>,
    openai_config: Option<OpenAIConfig>,
    openai_compat_config: Option<OpenAICompatConfig>,
}

impl LLMRouterBuilder {
    pub fn new() -> Self {
        Self {
            kind: None,
            openai_config: None,
            openai_compat_config: None,
        }
    }

    pub fn with_kind(mut self, kind: ProviderKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_openai(mut self, config: OpenAIConfig) -> Self {
        self.openai_config = Some(config);
        self.kind = Some(ProviderKind::OpenAI);
        self
    }

    pub fn with_openai_compat(mut self, config: OpenAICompatConfig) -> Self {
        self.openai_compat_config = Some(config);
        self.kind = Some(ProviderKind::OpenAICompat);
        self
    }

    pub fn build(self) -> LLMRouter {
        let kind = self.kind.unwrap_or(ProviderKind::Deterministic);

        let provider: Arc<dyn LLMProvider> = match kind {
            ProviderKind::OpenAI => {
                let config = self.openai_config.unwrap_or_default();
                Arc::new(OpenAIProvider::new(config))
            }
            ProviderKind::OpenAICompat => {
                let config = self.openai_compat_config.unwrap_or_default();
                Arc::new(OpenAICompatProvider::new(config))
            }
            ProviderKind::Deterministic => Arc::new(DeterministicProvider::new()),
        };

        LLMRouter::new(provider)
    }
}

impl Default for LLMRouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deterministic_fallback() {
        let router = LLMRouter::from_kind(ProviderKind::Deterministic);
        assert!(router.is_available().await);

        let request = CompletionRequest::new(vec![Message::user("Hello")]);
        let response = router.complete(request).await.unwrap();

        assert_eq!(response.content, DETERMINISTIC_REPLY);
        assert!(response.tool_calls.is_empty());
    }

    #[test]
    fn test_provider_kind_parsing() {
        assert_eq!(ProviderKind::from_str("openai"), Some(ProviderKind::OpenAI));
        assert_eq!(ProviderKind::from_str("OpenAI"), Some(ProviderKind::OpenAI));
        assert_eq!(
            ProviderKind::from_str("openai-compat"),
            Some(ProviderKind::OpenAICompat)
        );
        assert_eq!(
            ProviderKind::from_str("none"),
            Some(ProviderKind::Deterministic)
        );
        assert_eq!(ProviderKind::from_str("ollama"), None);
    }

    #[test]
    fn test_router_builder() {
        let router = LLMRouterBuilder::new()
            .with_kind(ProviderKind::Deterministic)
            .build();

        assert_eq!(router.kind(), ProviderKind::Deterministic);
    }

    #[tokio::test]
    async fn test_builder_openai_without_key_rejects() {
        let router = LLMRouterBuilder::new()
            .with_openai(OpenAIConfig::default())
            .build();

        assert_eq!(router.kind(), ProviderKind::OpenAI);
        let err = router
            .complete(CompletionRequest::new(vec![Message::user("hi")]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("LLM API key not configured"));
    }
}
