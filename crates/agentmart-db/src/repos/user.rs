//! User repository
//!
//! Users are identified by wallet address only and are created lazily the
//! first time a wallet records an agent call.

use sqlx::{Sqlite, SqlitePool};

use crate::{DbResult, DbUser};

/// User repository keyed by wallet address
#[derive(Clone)]
pub struct UserRepo {
    pool: SqlitePool,
}

impl UserRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert the wallet if it is not known yet
    pub async fn ensure(&self, wallet_address: &str) -> DbResult<()> {
        ensure_user(&self.pool, wallet_address).await
    }

    /// Find user by wallet address
    pub async fn find(&self, wallet_address: &str) -> DbResult<Option<DbUser>> {
        let user = sqlx::query_as::<_, DbUser>(
            "SELECT wallet_address, created_at FROM users WHERE wallet_address = ?",
        )
        .bind(wallet_address)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Number of wallets that have recorded at least one call
    pub async fn count(&self) -> DbResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Delete a user and, by cascade, their history
    pub async fn delete(&self, wallet_address: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE wallet_address = ?")
            .bind(wallet_address)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

pub(crate) async fn ensure_user<'e, E>(executor: E, wallet_address: &str) -> DbResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query("INSERT OR IGNORE INTO users (wallet_address) VALUES (?)")
        .bind(wallet_address)
        .execute(executor)
        .await?;

    Ok(())
}
