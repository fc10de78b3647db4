//! Orchestrator errors

use agentmart_db::DbError;
use agentmart_llm::LLMError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error(transparent)]
    Llm(#[from] LLMError),

    /// The model proposed a function outside the catalog
    #[error("Model proposed unknown function: {0}")]
    UnknownFunction(String),

    #[error("History store error: {0}")]
    Store(#[from] DbError),
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;

/// Failure of a single agent execution; recorded on the call, not returned
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("Missing or invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("Agent execution failed: {0}")]
    Failed(String),
}
