//! History DTOs

use std::str::FromStr;

use agentmart_catalog::slugify;
use agentmart_db::{HistoryStats, HistoryUpdate, NewHistoryRecord};
use agentmart_types::{parse_price, AgentCall, CallStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

pub const DEFAULT_HISTORY_LIMIT: i64 = 50;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    pub wallet: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<AgentCall>,
    pub count: i64,
    pub stats: HistoryStats,
}

/// `POST /api/history` body
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryAction {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub data: Value,
}

/// Record fields as sent by the storefront; which are required depends on the action
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecordData {
    pub id: Option<String>,
    pub wallet_address: Option<String>,
    pub agent_name: Option<String>,
    pub capability: Option<String>,
    pub status: Option<String>,
    pub cost: Option<Value>,
    pub input: Option<Value>,
    pub output: Option<Value>,
    pub summary: Option<String>,
    pub execution_time: Option<u64>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn parse_status(raw: &str) -> Result<CallStatus, ApiError> {
    CallStatus::from_str(raw).map_err(|_| ApiError::bad_request(format!("Invalid status: {}", raw)))
}

fn parse_cost(raw: &Value) -> Result<Decimal, ApiError> {
    let text = match raw {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    };
    parse_price(&text).map_err(|_| ApiError::bad_request(format!("Invalid cost: {}", text)))
}

impl HistoryRecordData {
    pub fn from_value(data: Value) -> Result<Self, ApiError> {
        if data.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(data).map_err(|e| ApiError::bad_request(format!("Invalid history data: {}", e)))
    }

    /// Validate a `create` action
    pub fn into_new_record(self) -> Result<NewHistoryRecord, ApiError> {
        let cost = self
            .cost
            .as_ref()
            .filter(|c| !matches!(c, Value::String(s) if s.is_empty()));

        let (Some(id), Some(wallet), Some(agent_name), Some(status), Some(cost), Some(input)) = (
            present(&self.id),
            present(&self.wallet_address),
            present(&self.agent_name),
            present(&self.status),
            cost,
            self.input.as_ref(),
        ) else {
            return Err(ApiError::bad_request("Missing required fields"));
        };

        let capability = match present(&self.capability) {
            Some(capability) => capability.to_string(),
            None => slugify(agent_name),
        };

        Ok(NewHistoryRecord {
            id: id.to_string(),
            wallet_address: wallet.to_string(),
            agent_name: agent_name.to_string(),
            capability,
            status: parse_status(status)?,
            cost: parse_cost(cost)?,
            input: input.clone(),
            output: self.output.clone(),
            summary: self.summary.clone(),
            execution_time_ms: self.execution_time,
        })
    }

    /// Validate an `update` action; absent fields keep their stored values
    pub fn into_update(self) -> Result<(String, HistoryUpdate), ApiError> {
        let id = present(&self.id)
            .ok_or_else(|| ApiError::bad_request("ID required for update"))?
            .to_string();

        let status = present(&self.status).map(parse_status).transpose()?;

        Ok((
            id,
            HistoryUpdate {
                status,
                output: self.output,
                summary: self.summary,
                execution_time_ms: self.execution_time,
            },
        ))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveResponse {
    pub success: bool,
    pub id: String,
}
