//! Agent call history repository

use rust_decimal::Decimal;
use sqlx::SqlitePool;

use super::user::ensure_user;
use crate::{DbAgentHistory, DbError, DbResult, HistoryStats, HistoryUpdate, NewHistoryRecord};

/// SQLite integers are signed; reject durations that do not fit
fn execution_time_column(ms: Option<u64>) -> DbResult<Option<i64>> {
    ms.map(|ms| {
        i64::try_from(ms)
            .map_err(|_| DbError::InvalidInput(format!("executionTime {} is out of range", ms)))
    })
    .transpose()
}

const HISTORY_COLUMNS: &str = "id, wallet_address, agent_name, capability, status, cost, \
    input_data, output_data, summary, execution_time, created_at, updated_at";

/// Agent history repository
#[derive(Clone)]
pub struct HistoryRepo {
    pool: SqlitePool,
}

impl HistoryRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a record, creating the wallet's user row in the same transaction
    pub async fn create(&self, record: &NewHistoryRecord) -> DbResult<()> {
        let input_data = serde_json::to_string(&record.input)?;
        let output_data = record
            .output
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let execution_time = execution_time_column(record.execution_time_ms)?;

        let mut tx = self.pool.begin().await?;

        ensure_user(&mut *tx, &record.wallet_address).await?;

        sqlx::query(
            r#"
            INSERT INTO agent_history (
                id, wallet_address, agent_name, capability, status, cost,
                input_data, output_data, summary, execution_time
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.wallet_address)
        .bind(&record.agent_name)
        .bind(&record.capability)
        .bind(record.status.as_str())
        .bind(record.cost.to_string())
        .bind(input_data)
        .bind(output_data)
        .bind(record.summary.as_deref())
        .bind(execution_time)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_unique_violation() {
                    return DbError::Duplicate(format!("History record {} already exists", record.id));
                }
            }
            DbError::Query(e)
        })?;

        tx.commit().await?;

        tracing::debug!(
            id = %record.id,
            wallet = %record.wallet_address,
            status = %record.status,
            "History record created"
        );
        Ok(())
    }

    /// Apply a partial update; returns `false` when no record has this id
    pub async fn update(&self, id: &str, update: &HistoryUpdate) -> DbResult<bool> {
        let output_data = update
            .output
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let execution_time = execution_time_column(update.execution_time_ms)?;

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE agent_history
            SET status = COALESCE(?, status),
                output_data = COALESCE(?, output_data),
                summary = COALESCE(?, summary),
                execution_time = COALESCE(?, execution_time),
                updated_at = strftime('%s', 'now')
            WHERE id = ?
            "#,
        )
        .bind(update.status.map(|s| s.as_str()))
        .bind(output_data)
        .bind(update.summary.as_deref())
        .bind(execution_time)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let updated = result.rows_affected() > 0;
        if !updated {
            tracing::debug!(id = %id, "History update for unknown id ignored");
        }
        Ok(updated)
    }

    /// Records for a wallet, newest first
    pub async fn list(
        &self,
        wallet_address: &str,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<DbAgentHistory>> {
        let query = format!(
            "SELECT {HISTORY_COLUMNS} FROM agent_history \
             WHERE wallet_address = ? \
             ORDER BY created_at DESC, rowid DESC \
             LIMIT ? OFFSET ?"
        );

        let rows = sqlx::query_as::<_, DbAgentHistory>(&query)
            .bind(wallet_address)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// Find one record owned by a wallet
    pub async fn find(&self, id: &str, wallet_address: &str) -> DbResult<Option<DbAgentHistory>> {
        let query = format!(
            "SELECT {HISTORY_COLUMNS} FROM agent_history WHERE id = ? AND wallet_address = ?"
        );

        let row = sqlx::query_as::<_, DbAgentHistory>(&query)
            .bind(id)
            .bind(wallet_address)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    pub async fn count(&self, wallet_address: &str) -> DbResult<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM agent_history WHERE wallet_address = ?")
                .bind(wallet_address)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Call counts and total spend for a wallet
    pub async fn stats(&self, wallet_address: &str) -> DbResult<HistoryStats> {
        let (total_calls, completed_calls, failed_calls): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'failed' THEN 1 ELSE 0 END), 0)
            FROM agent_history
            WHERE wallet_address = ?
            "#,
        )
        .bind(wallet_address)
        .fetch_one(&self.pool)
        .await?;

        // Costs are summed as decimals, not SQLite REALs
        let costs: Vec<(String,)> = sqlx::query_as(
            "SELECT cost FROM agent_history WHERE wallet_address = ? AND status = 'completed'",
        )
        .bind(wallet_address)
        .fetch_all(&self.pool)
        .await?;

        let mut total_spent = Decimal::ZERO;
        for (cost,) in costs {
            match cost.parse::<Decimal>() {
                Ok(value) => total_spent += value,
                Err(e) => tracing::warn!(cost = %cost, error = %e, "Skipping unparsable cost"),
            }
        }

        Ok(HistoryStats {
            total_calls,
            completed_calls,
            failed_calls,
            total_spent: total_spent.normalize(),
        })
    }

    /// Delete a wallet's records created before `before` (unix seconds)
    pub async fn delete_older_than(&self, wallet_address: &str, before: i64) -> DbResult<u64> {
        let result =
            sqlx::query("DELETE FROM agent_history WHERE wallet_address = ? AND created_at < ?")
                .bind(wallet_address)
                .bind(before)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }
}
