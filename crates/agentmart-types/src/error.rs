//! Error types for AgentMart domain values

use thiserror::Error;

/// Result type for AgentMart type conversions
pub type Result<T> = std::result::Result<T, TypeError>;

/// Errors raised while parsing or converting domain values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// Unknown agent call status string
    #[error("Unknown call status: {0}")]
    UnknownCallStatus(String),

    /// Status code not defined by the escrow contract
    #[error("Unknown job status code: {0}")]
    UnknownJobStatus(u8),

    /// Amount does not fit the decimal representation
    #[error("Amount overflow: {0}")]
    AmountOverflow(String),

    /// Amount could not be parsed
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}
