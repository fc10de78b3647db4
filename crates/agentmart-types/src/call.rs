//! Agent call records
//!
//! An [`AgentCall`] is created when a function call begins, mutated on
//! completion or failure, and persisted per wallet. It is never deleted by
//! the orchestrator.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypeError;

/// Lifecycle status of an agent call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    Pending,
    Executing,
    Completed,
    Failed,
}

impl CallStatus {
    /// All statuses accepted by the history store
    pub const ALL: [CallStatus; 4] = [
        CallStatus::Pending,
        CallStatus::Executing,
        CallStatus::Completed,
        CallStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Executing => "executing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Whether the call has finished, successfully or not
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CallStatus {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "executing" => Ok(Self::Executing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(TypeError::UnknownCallStatus(other.to_string())),
        }
    }
}

/// A single invocation of a marketplace agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCall {
    pub id: String,
    pub agent_name: String,
    pub capability: String,
    pub status: CallStatus,
    /// Cost in MNEE, serialized as a decimal string
    pub cost: Decimal,
    pub input: serde_json::Value,
    #[serde(default)]
    pub output: Option<serde_json::Value>,
    #[serde(default)]
    pub summary: Option<String>,
    /// Wall-clock execution time in milliseconds
    #[serde(default, rename = "executionTime")]
    pub execution_time_ms: Option<u64>,
    pub timestamp: DateTime<Utc>,
}

impl AgentCall {
    /// Start a new call in the `executing` state
    pub fn executing(
        id: impl Into<String>,
        agent_name: impl Into<String>,
        capability: impl Into<String>,
        cost: Decimal,
        input: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            agent_name: agent_name.into(),
            capability: capability.into(),
            status: CallStatus::Executing,
            cost,
            input,
            output: None,
            summary: None,
            execution_time_ms: None,
            timestamp: Utc::now(),
        }
    }

    /// Mark the call as completed with its output
    pub fn complete(&mut self, output: serde_json::Value, execution_time_ms: u64) {
        self.status = CallStatus::Completed;
        self.output = Some(output);
        self.execution_time_ms = Some(execution_time_ms);
    }

    /// Mark the call as failed, recording the reason as output
    pub fn fail(&mut self, reason: impl Into<String>, execution_time_ms: u64) {
        self.status = CallStatus::Failed;
        self.output = Some(serde_json::json!({ "error": reason.into() }));
        self.execution_time_ms = Some(execution_time_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_parsing() {
        for status in CallStatus::ALL {
            assert_eq!(status.as_str().parse::<CallStatus>().unwrap(), status);
        }
        assert!("running".parse::<CallStatus>().is_err());
    }

    #[test]
    fn test_call_lifecycle() {
        let mut call = AgentCall::executing(
            "1",
            "weather agent",
            "weather-data",
            dec!(0.02),
            serde_json::json!({"location": "Tokyo, Japan"}),
        );
        assert_eq!(call.status, CallStatus::Executing);
        assert!(!call.status.is_finished());

        call.complete(serde_json::json!({"temperature": 72}), 2500);
        assert_eq!(call.status, CallStatus::Completed);
        assert_eq!(call.execution_time_ms, Some(2500));
        assert!(call.status.is_finished());
    }

    #[test]
    fn test_call_serializes_camel_case_with_string_cost() {
        let call = AgentCall::executing("7", "swap agent", "token-swap", dec!(0.1), serde_json::json!({}));
        let json = serde_json::to_value(&call).unwrap();
        assert_eq!(json["agentName"], "swap agent");
        assert_eq!(json["cost"], "0.1");
        assert_eq!(json["status"], "executing");
        assert!(json.get("executionTime").is_some());
    }
}
