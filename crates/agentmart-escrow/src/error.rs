//! Escrow client errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EscrowError {
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid transaction hash: {0}")]
    InvalidTxHash(String),
}

impl From<reqwest::Error> for EscrowError {
    fn from(e: reqwest::Error) -> Self {
        EscrowError::Transport(e.to_string())
    }
}

impl From<alloy_sol_types::Error> for EscrowError {
    fn from(e: alloy_sol_types::Error) -> Self {
        EscrowError::Decode(e.to_string())
    }
}

impl From<agentmart_types::TypeError> for EscrowError {
    fn from(e: agentmart_types::TypeError) -> Self {
        EscrowError::Decode(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EscrowError>;
