//! API error handling
//!
//! Every failure is returned as `{"error": "<message>"}` with a fixed status.

use agentmart_catalog::CatalogError;
use agentmart_db::DbError;
use agentmart_escrow::EscrowError;
use agentmart_llm::LLMError;
use agentmart_orchestrator::OrchestratorError;
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),

    /// An upstream service (model or chain) returned something unusable
    #[error("{0}")]
    BadGateway(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }
}

/// Error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(msg) => Self::NotFound(msg),
            DbError::Duplicate(msg) => Self::Conflict(msg),
            DbError::InvalidInput(msg) => Self::BadRequest(msg),
            other => {
                tracing::error!(error = ?other, "Database error");
                Self::Internal("Database error".to_string())
            }
        }
    }
}

impl From<LLMError> for ApiError {
    fn from(err: LLMError) -> Self {
        match err {
            LLMError::ConfigurationError { message } => {
                tracing::error!(%message, "LLM is not configured");
                Self::Internal(message)
            }
            other => {
                tracing::error!(error = %other, "LLM request failed");
                Self::Internal(other.to_string())
            }
        }
    }
}

impl From<OrchestratorError> for ApiError {
    fn from(err: OrchestratorError) -> Self {
        match err {
            OrchestratorError::Llm(e) => e.into(),
            OrchestratorError::UnknownFunction(name) => {
                Self::BadGateway(format!("Model proposed unknown function: {}", name))
            }
            OrchestratorError::Store(e) => e.into(),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::DeploymentNotFound { .. } => Self::NotFound(err.to_string()),
            CatalogError::UnknownFunction(name) => {
                Self::BadRequest(format!("Unknown agent function: {}", name))
            }
            other => {
                tracing::error!(error = %other, "Error loading agents");
                Self::Internal("Failed to load agent data".to_string())
            }
        }
    }
}

impl From<EscrowError> for ApiError {
    fn from(err: EscrowError) -> Self {
        match err {
            EscrowError::InvalidAddress(_) | EscrowError::InvalidTxHash(_) => {
                Self::BadRequest(err.to_string())
            }
            other => {
                tracing::warn!(error = %other, "Escrow query failed");
                Self::BadGateway(other.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}
