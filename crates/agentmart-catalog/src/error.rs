//! Catalog errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Deployment file not found at {path}. Please run deployment first.")]
    DeploymentNotFound { path: String },

    #[error("Failed to read deployment file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed deployment file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unknown agent function: {0}")]
    UnknownFunction(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
