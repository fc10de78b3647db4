//! Escrow job handlers
//!
//! Jobs are read from the escrow contract; nothing here signs or sends a
//! transaction.

use agentmart_escrow::{parse_address, validate_tx_hash, JobSnapshot};
use agentmart_types::JobId;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde_json::Value;
use std::io::ErrorKind;
use std::sync::Arc;

use crate::dto::{JobView, JobsQuery, JobsResponse, TrackRequest};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

fn parse_job_id(raw: &str) -> ApiResult<JobId> {
    raw.parse::<JobId>()
        .map_err(|_| ApiError::bad_request(format!("Invalid job id: {}", raw)))
}

/// `GET /api/job-result/:jobId`: result file written by the agent runner
pub async fn job_result(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let job_id = parse_job_id(&job_id)?;
    let path = state.paths.job_result_file(job_id.value());

    let contents = match tokio::fs::read_to_string(&path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ApiError::NotFound("Result not found".to_string()));
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Error reading job result");
            return Err(ApiError::Internal("Failed to read result".to_string()));
        }
    };

    let result = serde_json::from_str(&contents).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Malformed job result");
        ApiError::Internal("Failed to read result".to_string())
    })?;
    Ok(Json(result))
}

/// `GET /api/jobs?client=0x...`: the client's jobs, newest first
pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
    query: Result<Query<JobsQuery>, QueryRejection>,
) -> ApiResult<Json<JobsResponse>> {
    let Query(query) = query?;
    let client = query
        .client
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::bad_request("Client address required"))?;
    parse_address(&client)?;

    let jobs: Vec<JobView> = state
        .escrow
        .client_jobs(&client)
        .await?
        .into_iter()
        .map(JobView::from)
        .collect();

    Ok(Json(JobsResponse {
        count: jobs.len(),
        jobs,
    }))
}

/// `GET /api/jobs/:jobId`
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<JobView>> {
    let job_id = parse_job_id(&job_id)?;
    let job = state.escrow.get_job(job_id).await?;
    Ok(Json(job.into()))
}

/// `POST /api/jobs/track`: follow a job-creation transaction
pub async fn track_job(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TrackRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<JobSnapshot>)> {
    let Json(request) = payload?;
    parse_address(&request.client)?;
    validate_tx_hash(&request.tx_hash)?;

    let snapshot = state.watches.track(&request.client, &request.tx_hash);
    tracing::info!(tx_hash = %request.tx_hash, client = %request.client, "Tracking job creation");

    Ok((StatusCode::ACCEPTED, Json(snapshot)))
}

/// `GET /api/jobs/track/:txHash`: latest derived step for a tracked transaction
pub async fn tracked_job(
    State(state): State<Arc<AppState>>,
    Path(tx_hash): Path<String>,
) -> ApiResult<Json<JobSnapshot>> {
    state
        .watches
        .snapshot(&tx_hash)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No tracked job for transaction {}", tx_hash)))
}

/// `DELETE /api/jobs/track/:txHash`: stop watching a transaction
pub async fn untrack_job(
    State(state): State<Arc<AppState>>,
    Path(tx_hash): Path<String>,
) -> ApiResult<StatusCode> {
    if !state.watches.untrack(&tx_hash) {
        return Err(ApiError::NotFound(format!("No tracked job for transaction {}", tx_hash)));
    }
    tracing::info!(tx_hash = %tx_hash, "Stopped tracking job creation");
    Ok(StatusCode::NO_CONTENT)
}
