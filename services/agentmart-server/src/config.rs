//! Server Configuration
//!
//! Layered configuration for the AgentMart server: built-in defaults, then
//! optional config files, then `AGENTMART__SECTION__KEY` environment
//! variables, then CLI flags applied by `main`.

use agentmart_db::DatabaseConfig;
use agentmart_escrow::EscrowConfig;
use agentmart_llm::{LLMRouter, LLMRouterBuilder, OpenAICompatConfig, OpenAIConfig, ProviderKind};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Configuration problems detected before the server starts
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid bind address {0}")]
    BindAddress(String),

    #[error("Unknown LLM provider: {0}")]
    UnknownProvider(String),

    #[error("Invalid escrow configuration: {0}")]
    Escrow(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server binding configuration
    #[serde(default)]
    pub server: ServerSettings,

    /// History database
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Chat model provider
    #[serde(default)]
    pub llm: LlmSettings,

    /// Escrow contract and RPC endpoint
    #[serde(default)]
    pub escrow: EscrowConfig,

    /// Simulated agent execution
    #[serde(default)]
    pub executor: ExecutorSettings,

    /// Files shared with the deployment script and agent runner
    #[serde(default)]
    pub paths: PathSettings,

    /// API configuration
    #[serde(default)]
    pub api: ApiSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Server binding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Grace period for in-flight requests on shutdown
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|_| ConfigError::BindAddress(raw))
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// Chat model settings
///
/// API keys are never read from config files; `OPENAI_API_KEY` (or
/// `AGENTMART_OPENAI_COMPAT_API_KEY`) is consulted at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// `openai`, `openai_compat` or `deterministic`
    #[serde(default = "default_llm_provider")]
    pub provider: String,

    /// Model name override
    #[serde(default)]
    pub model: Option<String>,

    /// Base URL override
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            model: None,
            base_url: None,
        }
    }
}

impl LlmSettings {
    pub fn kind(&self) -> Result<ProviderKind, ConfigError> {
        ProviderKind::from_str(&self.provider)
            .ok_or_else(|| ConfigError::UnknownProvider(self.provider.clone()))
    }

    /// Build the router for the configured provider
    pub fn router(&self) -> Result<LLMRouter, ConfigError> {
        let builder = match self.kind()? {
            ProviderKind::OpenAI => {
                let mut config = OpenAIConfig::from_env();
                if let Some(model) = &self.model {
                    config.model = model.clone();
                }
                if let Some(base_url) = &self.base_url {
                    config.base_url = base_url.clone();
                }
                if config.api_key.is_none() {
                    tracing::warn!("OPENAI_API_KEY not set, chat requests will be rejected");
                }
                LLMRouterBuilder::new().with_openai(config)
            }
            ProviderKind::OpenAICompat => {
                let mut config = OpenAICompatConfig::default();
                if let Some(model) = &self.model {
                    config.model = model.clone();
                }
                if let Some(base_url) = &self.base_url {
                    config.base_url = base_url.clone();
                }
                LLMRouterBuilder::new().with_openai_compat(config)
            }
            ProviderKind::Deterministic => LLMRouterBuilder::new().with_kind(ProviderKind::Deterministic),
        };
        Ok(builder.build())
    }
}

/// Simulated execution delay, `base + rand(0..jitter)`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorSettings {
    #[serde(default = "default_executor_delay")]
    pub base_delay_ms: u64,

    #[serde(default = "default_executor_delay")]
    pub jitter_ms: u64,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            base_delay_ms: default_executor_delay(),
            jitter_ms: default_executor_delay(),
        }
    }
}

impl ExecutorSettings {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn jitter(&self) -> Duration {
        Duration::from_millis(self.jitter_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Deployment output read by `GET /api/agents`
    #[serde(default = "default_deployment_file")]
    pub deployment_file: PathBuf,

    /// Directory of `job-<id>.json` files
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            deployment_file: default_deployment_file(),
            results_dir: default_results_dir(),
        }
    }
}

/// API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_true")]
    pub enable_compression: bool,

    #[serde(default = "default_true")]
    pub enable_tracing: bool,

    /// Maximum request body size in bytes
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            enable_cors: true,
            cors_origins: default_cors_origins(),
            enable_compression: true,
            enable_tracing: true,
            max_body_size: default_max_body_size(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Port of the Prometheus listener, separate from the API port
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_metrics_port(),
        }
    }
}

// =============================================================================
// Default Functions
// =============================================================================

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_shutdown_timeout() -> u64 {
    10
}

fn default_llm_provider() -> String {
    "openai".to_string()
}

fn default_executor_delay() -> u64 {
    2000
}

fn default_deployment_file() -> PathBuf {
    PathBuf::from("../deployments.json")
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("../agent-results")
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_max_body_size() -> usize {
    2 * 1024 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_metrics_port() -> u16 {
    9090
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Configuration Loading
// =============================================================================

impl ServerConfig {
    /// Load configuration from an optional file and the environment
    pub fn load(config_path: Option<&str>) -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();

        let mut builder = config::Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        builder = builder
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("AGENTMART")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("api.cors_origins"),
            );

        let server_config: ServerConfig = builder.build()?.try_deserialize()?;
        Ok(server_config)
    }

    /// Local development: debug logs, in-memory history, no simulated latency
    pub fn development() -> Self {
        Self {
            database: DatabaseConfig::in_memory(),
            llm: LlmSettings {
                provider: "deterministic".to_string(),
                ..Default::default()
            },
            executor: ExecutorSettings {
                base_delay_ms: 0,
                jitter_ms: 0,
            },
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: "pretty".to_string(),
            },
            metrics: MetricsConfig {
                enabled: false,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn production() -> Self {
        Self {
            server: ServerSettings {
                port: 8080,
                shutdown_timeout_secs: 30,
                ..Default::default()
            },
            database: DatabaseConfig {
                max_connections: 10,
                ..Default::default()
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
            },
            ..Default::default()
        }
    }

    /// Reject configurations the server cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.socket_addr()?;
        self.llm.kind()?;

        agentmart_escrow::parse_address(&self.escrow.escrow_address)
            .map_err(|e| ConfigError::Escrow(e.to_string()))?;
        if self.escrow.poll_interval_ms == 0 {
            return Err(ConfigError::Zero("escrow.poll_interval_ms"));
        }
        if self.escrow.idle_timeout_secs == 0 {
            return Err(ConfigError::Zero("escrow.idle_timeout_secs"));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Zero("database.max_connections"));
        }
        if self.api.max_body_size == 0 {
            return Err(ConfigError::Zero("api.max_body_size"));
        }

        if !self.paths.deployment_file.exists() {
            tracing::warn!(
                path = %self.paths.deployment_file.display(),
                "Deployment file not found, /api/agents will return 404 until it exists"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = ServerConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.escrow.poll_interval_ms, 2000);
        assert_eq!(config.escrow.idle_timeout_secs, 600);
        assert_eq!(config.escrow.retention_secs, 300);
        assert_eq!(config.paths.results_dir, PathBuf::from("../agent-results"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        let dev = ServerConfig::development();
        assert!(dev.database.is_in_memory());
        assert_eq!(dev.llm.kind().unwrap(), ProviderKind::Deterministic);
        assert_eq!(dev.executor.base_delay(), Duration::ZERO);

        let prod = ServerConfig::production();
        assert_eq!(prod.logging.format, "json");
        assert_eq!(prod.llm.kind().unwrap(), ProviderKind::OpenAI);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ServerConfig::default();
        config.llm.provider = "claude-via-carrier-pigeon".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::UnknownProvider(_))));

        let mut config = ServerConfig::default();
        config.escrow.escrow_address = "not-an-address".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Escrow(_))));

        let mut config = ServerConfig::default();
        config.server.host = "no host here".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::BindAddress(_))));

        let mut config = ServerConfig::default();
        config.escrow.poll_interval_ms = 0;
        assert_eq!(
            config.validate().unwrap_err().to_string(),
            "escrow.poll_interval_ms must be greater than zero"
        );

        let mut config = ServerConfig::default();
        config.escrow.idle_timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Zero("escrow.idle_timeout_secs"))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 4100

[llm]
provider = "deterministic"

[escrow]
rpc_url = "http://chain:8545"

[paths]
deployment_file = "/srv/deployments.json"
"#
        )
        .unwrap();

        let config = ServerConfig::load(Some(file.path().to_str().unwrap())).unwrap();
        assert_eq!(config.server.port, 4100);
        assert_eq!(config.llm.provider, "deterministic");
        assert_eq!(config.escrow.rpc_url, "http://chain:8545");
        // Unset keys keep their defaults
        assert_eq!(config.escrow.fallback_delay_ms, 500);
        assert_eq!(config.paths.deployment_file, PathBuf::from("/srv/deployments.json"));
        assert_eq!(config.metrics.port, 9090);
    }

    #[test]
    fn test_deterministic_router() {
        let settings = LlmSettings {
            provider: "deterministic".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.router().unwrap().kind(), ProviderKind::Deterministic);
    }
}
