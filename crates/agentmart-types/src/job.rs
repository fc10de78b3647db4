//! Escrow job records
//!
//! Jobs live in the external escrow contract. This service only observes
//! them; status transitions are driven by transactions signed elsewhere.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypeError;

/// Identifier assigned by the escrow contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub u64);

impl JobId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for JobId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(Self)
    }
}

/// Status code stored on-chain for each job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum JobStatus {
    /// Created and funded, waiting for the agent
    Pending = 0,
    /// Accepted by the agent, work in progress
    Accepted = 1,
    /// Agent delivered a result, awaiting client approval
    Completed = 2,
    /// Client approved, funds released
    Approved = 3,
    /// Client rejected the result
    Rejected = 4,
    /// Job cancelled before completion
    Cancelled = 5,
}

impl JobStatus {
    pub fn from_code(code: u8) -> Result<Self, TypeError> {
        match code {
            0 => Ok(Self::Pending),
            1 => Ok(Self::Accepted),
            2 => Ok(Self::Completed),
            3 => Ok(Self::Approved),
            4 => Ok(Self::Rejected),
            5 => Ok(Self::Cancelled),
            other => Err(TypeError::UnknownJobStatus(other)),
        }
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Accepted => "Accepted",
            Self::Completed => "Completed",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Cancelled => "Cancelled",
        }
    }

    /// The agent has delivered (Completed or Approved)
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Completed | Self::Approved)
    }

    /// No further transition is possible
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected | Self::Cancelled)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<JobStatus> for u8 {
    fn from(status: JobStatus) -> Self {
        status.code()
    }
}

impl TryFrom<u8> for JobStatus {
    type Error = TypeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

/// A job record as read from the escrow contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    pub client: String,
    pub agent: String,
    /// Raw amount in token base units
    pub amount_base_units: String,
    /// Amount in MNEE
    pub amount: Decimal,
    pub task_type: String,
    pub input_hash: String,
    pub result_hash: String,
    pub status: JobStatus,
}

impl Job {
    pub fn status_label(&self) -> &'static str {
        self.status.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        for code in 0..=5u8 {
            assert_eq!(JobStatus::from_code(code).unwrap().code(), code);
        }
        assert_eq!(JobStatus::from_code(6), Err(TypeError::UnknownJobStatus(6)));
    }

    #[test]
    fn test_delivered_and_final() {
        assert!(!JobStatus::Pending.is_delivered());
        assert!(!JobStatus::Accepted.is_delivered());
        assert!(JobStatus::Completed.is_delivered());
        assert!(JobStatus::Approved.is_delivered());

        assert!(!JobStatus::Completed.is_final());
        assert!(JobStatus::Approved.is_final());
        assert!(JobStatus::Rejected.is_final());
        assert!(JobStatus::Cancelled.is_final());
    }

    #[test]
    fn test_status_serializes_as_code() {
        assert_eq!(serde_json::to_value(JobStatus::Approved).unwrap(), 3);
        let parsed: JobStatus = serde_json::from_value(serde_json::json!(1)).unwrap();
        assert_eq!(parsed, JobStatus::Accepted);
        assert!(serde_json::from_value::<JobStatus>(serde_json::json!(9)).is_err());
    }

    #[test]
    fn test_job_id_parse() {
        assert_eq!("42".parse::<JobId>().unwrap(), JobId(42));
        assert!("0x2a".parse::<JobId>().is_err());
    }
}
