//! Health Check Handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: i64,
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub database: bool,
    pub llm: bool,
    pub llm_provider: String,
    pub tracked_jobs: usize,
}

/// Liveness; does not touch dependencies
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp_millis(),
    })
}

/// Readiness: the history database must answer
///
/// An unavailable model is reported but does not fail readiness, since the
/// catalog and history endpoints still work without it.
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<ReadinessResponse>) {
    let database = match state.db.health_check().await {
        Ok(health) => health.healthy,
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            false
        }
    };
    let llm = state.orchestrator.llm();

    let response = ReadinessResponse {
        status: if database { "ready" } else { "not_ready" },
        database,
        llm: llm.is_available().await,
        llm_provider: llm.kind().to_string(),
        tracked_jobs: state.watches.len(),
    };

    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}
