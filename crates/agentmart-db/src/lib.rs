//! AgentMart Database Layer
//!
//! SQLite persistence for per-wallet agent call history.
//!
//! # Schema
//!
//! - **users**: one row per wallet address, created lazily
//! - **agent_history**: one row per agent call, JSON input/output stored as text
//!
//! # Repository Pattern
//!
//! Each table has its own repository. Create and update of a history record
//! each run in an explicit transaction. Callers outside this crate should
//! depend on [`HistoryStore`] rather than on the pool.

pub mod config;
pub mod error;
pub mod models;
pub mod repos;
pub mod store;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

pub use config::DatabaseConfig;
pub use error::{DbError, DbResult};
pub use models::*;
pub use repos::*;
pub use store::HistoryStore;

/// Database connection pool
#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    /// Open (creating if missing) the configured SQLite database
    pub async fn connect(config: &DatabaseConfig) -> DbResult<Self> {
        info!("Connecting to SQLite: {}", config.url);

        if let Some(path) = config.file_path() {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir).map_err(|e| {
                    DbError::Connection(format!("create {}: {}", dir.display(), e))
                })?;
            }
        }

        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| DbError::Connection(format!("SQLite URL: {}", e)))?
            .create_if_missing(true)
            .foreign_keys(true);

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs));

        // An in-memory database lives only as long as its connection
        if config.is_in_memory() {
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| DbError::Connection(format!("SQLite: {}", e)))?;

        info!("Connected to SQLite");

        let db = Self { pool };
        if config.run_migrations {
            db.migrate().await?;
        }
        Ok(db)
    }

    /// Fresh migrated in-memory database
    pub async fn connect_in_memory() -> DbResult<Self> {
        Self::connect(&DatabaseConfig::in_memory()).await
    }

    /// Run database migrations
    pub async fn migrate(&self) -> DbResult<()> {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DbError::Migration(e.to_string()))?;
        info!("Migrations complete");
        Ok(())
    }

    pub async fn health_check(&self) -> DbResult<HealthStatus> {
        let sqlite = sqlx::query("SELECT 1").fetch_one(&self.pool).await.is_ok();

        Ok(HealthStatus {
            sqlite,
            healthy: sqlite,
        })
    }

    pub fn user_repo(&self) -> UserRepo {
        UserRepo::new(self.pool.clone())
    }

    pub fn history_repo(&self) -> HistoryRepo {
        HistoryRepo::new(self.pool.clone())
    }
}

/// Health status of the database connection
#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthStatus {
    pub sqlite: bool,
    pub healthy: bool,
}
