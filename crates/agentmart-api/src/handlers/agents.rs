//! Agent catalog handler

use agentmart_catalog::{load_catalog, Catalog};
use axum::{extract::State, Json};
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// `GET /api/agents`: deployed agents keyed by capability slug
pub async fn list_agents(State(state): State<Arc<AppState>>) -> ApiResult<Json<Catalog>> {
    let path = state.paths.deployment_file.clone();
    let catalog = tokio::task::spawn_blocking(move || load_catalog(path))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Catalog loader panicked");
            ApiError::Internal("Failed to load agent data".to_string())
        })??;

    Ok(Json(catalog))
}
