//! History store abstraction
//!
//! The orchestrator and HTTP layer depend on this trait rather than on a
//! concrete pool, so tests can run against an in-memory database and the
//! server can inject whichever store it was configured with.

use agentmart_types::AgentCall;
use async_trait::async_trait;

use crate::{DbResult, HistoryRepo, HistoryStats, HistoryUpdate, NewHistoryRecord};

/// Per-wallet agent call history
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Insert a new record (creates the wallet's user row if needed)
    async fn create(&self, record: &NewHistoryRecord) -> DbResult<()>;

    /// Update a record by id; unknown ids are a no-op returning `false`
    async fn update(&self, id: &str, update: &HistoryUpdate) -> DbResult<bool>;

    /// Calls for a wallet, newest first
    async fn list(&self, wallet_address: &str, limit: i64, offset: i64) -> DbResult<Vec<AgentCall>>;

    async fn count(&self, wallet_address: &str) -> DbResult<i64>;

    async fn stats(&self, wallet_address: &str) -> DbResult<HistoryStats>;
}

#[async_trait]
impl HistoryStore for HistoryRepo {
    async fn create(&self, record: &NewHistoryRecord) -> DbResult<()> {
        HistoryRepo::create(self, record).await
    }

    async fn update(&self, id: &str, update: &HistoryUpdate) -> DbResult<bool> {
        HistoryRepo::update(self, id, update).await
    }

    async fn list(&self, wallet_address: &str, limit: i64, offset: i64) -> DbResult<Vec<AgentCall>> {
        HistoryRepo::list(self, wallet_address, limit, offset)
            .await?
            .into_iter()
            .map(|row| row.into_call())
            .collect()
    }

    async fn count(&self, wallet_address: &str) -> DbResult<i64> {
        HistoryRepo::count(self, wallet_address).await
    }

    async fn stats(&self, wallet_address: &str) -> DbResult<HistoryStats> {
        HistoryRepo::stats(self, wallet_address).await
    }
}
