//! Database models - mapped from SQLite tables

use agentmart_types::{AgentCall, CallStatus};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{DbError, DbResult};

// ============================================================================
// User Models
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbUser {
    pub wallet_address: String,
    pub created_at: i64,
}

// ============================================================================
// Agent History Models
// ============================================================================

/// Row of `agent_history`; JSON columns are kept as text
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbAgentHistory {
    pub id: String,
    pub wallet_address: String,
    pub agent_name: String,
    pub capability: String,
    pub status: String,
    pub cost: String,
    pub input_data: String,
    pub output_data: Option<String>,
    pub summary: Option<String>,
    pub execution_time: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl DbAgentHistory {
    /// Decode the row into a domain call record
    pub fn into_call(self) -> DbResult<AgentCall> {
        let status: CallStatus = self.status.parse()?;
        let cost: Decimal = self
            .cost
            .parse()
            .map_err(|e| DbError::Serialization(format!("cost {:?}: {}", self.cost, e)))?;
        let input = serde_json::from_str(&self.input_data)?;
        let output = self
            .output_data
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;
        let timestamp = DateTime::<Utc>::from_timestamp(self.created_at, 0).ok_or_else(|| {
            DbError::Serialization(format!("created_at out of range: {}", self.created_at))
        })?;

        Ok(AgentCall {
            id: self.id,
            agent_name: self.agent_name,
            capability: self.capability,
            status,
            cost,
            input,
            output,
            summary: self.summary,
            execution_time_ms: self.execution_time.map(|ms| ms.max(0) as u64),
            timestamp,
        })
    }
}

/// A history record to insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewHistoryRecord {
    pub id: String,
    pub wallet_address: String,
    pub agent_name: String,
    pub capability: String,
    pub status: CallStatus,
    pub cost: Decimal,
    pub input: serde_json::Value,
    pub output: Option<serde_json::Value>,
    pub summary: Option<String>,
    pub execution_time_ms: Option<u64>,
}

impl NewHistoryRecord {
    /// Build a record from a call made on behalf of `wallet_address`
    pub fn from_call(wallet_address: impl Into<String>, call: &AgentCall) -> Self {
        Self {
            id: call.id.clone(),
            wallet_address: wallet_address.into(),
            agent_name: call.agent_name.clone(),
            capability: call.capability.clone(),
            status: call.status,
            cost: call.cost,
            input: call.input.clone(),
            output: call.output.clone(),
            summary: call.summary.clone(),
            execution_time_ms: call.execution_time_ms,
        }
    }
}

/// Partial update of a history record; `None` keeps the stored value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryUpdate {
    pub status: Option<CallStatus>,
    pub output: Option<serde_json::Value>,
    pub summary: Option<String>,
    pub execution_time_ms: Option<u64>,
}

impl HistoryUpdate {
    /// Update carrying the finished state of a call
    pub fn from_call(call: &AgentCall) -> Self {
        Self {
            status: Some(call.status),
            output: call.output.clone(),
            summary: call.summary.clone(),
            execution_time_ms: call.execution_time_ms,
        }
    }

    pub fn summary(summary: impl Into<String>) -> Self {
        Self {
            summary: Some(summary.into()),
            ..Default::default()
        }
    }
}

/// Aggregate statistics for one wallet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub total_calls: i64,
    pub completed_calls: i64,
    pub failed_calls: i64,
    /// Sum of cost over completed calls, in MNEE; a JSON number on the wire
    #[serde(with = "rust_decimal::serde::float")]
    pub total_spent: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row() -> DbAgentHistory {
        DbAgentHistory {
            id: "1700000000000".to_string(),
            wallet_address: "0xabc".to_string(),
            agent_name: "price oracle".to_string(),
            capability: "price-feed".to_string(),
            status: "completed".to_string(),
            cost: "0.01".to_string(),
            input_data: r#"{"tokens":["BTC"]}"#.to_string(),
            output_data: Some(r#"{"prices":[]}"#.to_string()),
            summary: None,
            execution_time: Some(2400),
            created_at: 1_700_000_000,
            updated_at: 1_700_000_003,
        }
    }

    #[test]
    fn test_row_into_call() {
        let call = row().into_call().unwrap();
        assert_eq!(call.status, CallStatus::Completed);
        assert_eq!(call.cost, dec!(0.01));
        assert_eq!(call.input["tokens"][0], "BTC");
        assert_eq!(call.execution_time_ms, Some(2400));
        assert_eq!(call.timestamp.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_bad_status_is_rejected() {
        let mut bad = row();
        bad.status = "running".to_string();
        assert!(matches!(bad.into_call(), Err(DbError::Serialization(_))));
    }

    #[test]
    fn test_stats_total_spent_is_a_number() {
        let stats = HistoryStats {
            total_calls: 3,
            completed_calls: 3,
            failed_calls: 0,
            total_spent: dec!(0.03),
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert!(json["total_spent"].is_number());
        assert_eq!(json["total_spent"].as_f64(), Some(0.03));

        let back: HistoryStats = serde_json::from_value(json).unwrap();
        assert_eq!(back.total_spent, dec!(0.03));
    }
}
