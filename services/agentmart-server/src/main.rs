//! AgentMart Server
//!
//! Backend for the AgentMart storefront: agent catalog, LLM chat
//! orchestration, per-wallet call history, agent results and escrow job
//! tracking, served over a JSON HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Start with default settings
//! agentmart-server
//!
//! # Start with a config file
//! agentmart-server --config config/agentmart.toml
//!
//! # Override individual keys from the environment
//! AGENTMART__SERVER__PORT=8080 AGENTMART__LLM__PROVIDER=deterministic agentmart-server
//! ```

mod config;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use agentmart_api::{create_router, ApiConfig, AppState, DataPaths};
use agentmart_db::Database;
use agentmart_escrow::{RpcEscrowClient, WatcherConfig};
use agentmart_orchestrator::SimulatedExecutor;

use crate::config::ServerConfig;

// =============================================================================
// CLI Arguments
// =============================================================================

/// AgentMart Server - agent marketplace backend
#[derive(Parser, Debug)]
#[command(name = "agentmart-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML, JSON, or YAML)
    #[arg(short, long, env = "AGENTMART_CONFIG")]
    config: Option<String>,

    /// Host to bind to
    #[arg(long, env = "AGENTMART_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "AGENTMART_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "AGENTMART_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format (json, pretty)
    #[arg(long, env = "AGENTMART_LOG_FORMAT")]
    log_format: Option<String>,

    /// SQLite connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Ethereum JSON-RPC endpoint
    #[arg(long, env = "AGENTMART_RPC_URL")]
    rpc_url: Option<String>,

    /// Path to the contract deployment file
    #[arg(long, env = "AGENTMART_DEPLOYMENT_FILE")]
    deployment_file: Option<String>,

    /// Start from the development preset instead of the defaults
    #[arg(long, env = "AGENTMART_DEV_MODE")]
    dev_mode: bool,
}

impl Args {
    /// Apply CLI flags on top of the loaded configuration
    fn apply(self, config: &mut ServerConfig) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
        if let Some(url) = self.database_url {
            config.database.url = url;
        }
        if let Some(url) = self.rpc_url {
            config.escrow.rpc_url = url;
        }
        if let Some(path) = self.deployment_file {
            config.paths.deployment_file = path.into();
        }
    }
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut server_config = if args.dev_mode && args.config.is_none() {
        ServerConfig::development()
    } else {
        ServerConfig::load(args.config.as_deref())?
    };
    args.apply(&mut server_config);

    init_logging(&server_config.logging);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting AgentMart server");

    server_config.validate()?;

    let db = init_database(&server_config).await?;

    let llm = server_config.llm.router()?;
    tracing::info!(provider = %llm.kind(), "LLM router ready");

    let escrow = RpcEscrowClient::from_config(&server_config.escrow)?;
    tracing::info!(
        rpc_url = %server_config.escrow.rpc_url,
        escrow = %server_config.escrow.escrow_address,
        "Escrow client ready"
    );

    let executor = SimulatedExecutor::new(
        server_config.executor.base_delay(),
        server_config.executor.jitter(),
    );

    let state = Arc::new(AppState::new(
        db,
        llm,
        Arc::new(executor),
        Arc::new(escrow),
        WatcherConfig::from(&server_config.escrow),
        DataPaths {
            deployment_file: server_config.paths.deployment_file.clone(),
            results_dir: server_config.paths.results_dir.clone(),
        },
    ));

    let api_config = ApiConfig {
        enable_cors: server_config.api.enable_cors,
        cors_origins: server_config.api.cors_origins.clone(),
        enable_compression: server_config.api.enable_compression,
        enable_tracing: server_config.api.enable_tracing,
        max_body_size: server_config.api.max_body_size,
    };

    let app = create_router(state, api_config);

    if server_config.metrics.enabled {
        start_metrics_exporter(&server_config.metrics)?;
    }

    let addr = server_config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(server_config.server.shutdown_timeout()))
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

// =============================================================================
// Initialization Functions
// =============================================================================

fn init_logging(config: &config::LoggingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => subscriber.with(fmt::layer().json().with_target(true)).init(),
        _ => subscriber.with(fmt::layer().pretty().with_target(true)).init(),
    }
}

async fn init_database(config: &ServerConfig) -> anyhow::Result<Database> {
    let db = Database::connect(&config.database).await?;

    let health = db.health_check().await?;
    if !health.healthy {
        anyhow::bail!("Database health check failed");
    }

    let existing = db.user_repo().count().await?;
    tracing::info!(wallets = existing, "History database ready");

    Ok(db)
}

/// Install the Prometheus recorder with its own HTTP listener
fn start_metrics_exporter(config: &config::MetricsConfig) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    metrics::describe_counter!("agentmart_chat_requests_total", "Chat completions proxied to the model");
    metrics::describe_counter!("agentmart_orchestrator_turns_total", "Orchestrated turns by outcome");
    metrics::describe_counter!("agentmart_agent_calls_total", "Agent executions by capability and status");

    tracing::info!(port = config.port, "Metrics exporter listening");
    Ok(())
}

// =============================================================================
// Graceful Shutdown
// =============================================================================

/// Wait for Ctrl+C or SIGTERM, then give in-flight requests time to finish
async fn shutdown_signal(grace: Duration) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }

    tracing::info!(grace_secs = grace.as_secs(), "Draining in-flight requests");
    tokio::time::sleep(grace).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from(["agentmart-server", "--port", "8080", "--rpc-url", "http://node:8545"]);
        assert_eq!(args.port, Some(8080));

        let mut config = ServerConfig::default();
        args.apply(&mut config);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.escrow.rpc_url, "http://node:8545");
        // Untouched flags leave the config alone
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_deployment_file_override() {
        let args = Args::parse_from(["agentmart-server", "--deployment-file", "/tmp/d.json"]);
        let mut config = ServerConfig::development();
        args.apply(&mut config);
        assert_eq!(config.paths.deployment_file, std::path::PathBuf::from("/tmp/d.json"));
        assert_eq!(config.logging.level, "debug");
    }
}
