//! Chat and summary handlers

use agentmart_orchestrator::ChatReply;
use axum::{extract::State, Json};
use std::sync::Arc;

use crate::dto::{ChatRequest, SummarizeRequest, SummarizeResponse};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// `POST /api/chat`: one model turn, returning at most one proposed function call
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, axum::extract::rejection::JsonRejection>,
) -> ApiResult<Json<ChatReply>> {
    let Json(request) = payload?;
    let reply = state.orchestrator.chat(request.messages).await?;

    if let Some(call) = &reply.function_call {
        tracing::debug!(function = %call.name, "Model proposed a function call");
    }
    Ok(Json(reply))
}

/// `POST /api/summarize`
pub async fn summarize(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SummarizeRequest>, axum::extract::rejection::JsonRejection>,
) -> ApiResult<Json<SummarizeResponse>> {
    let Json(request) = payload?;
    let summary = state
        .orchestrator
        .summarize(&request.agent_name, &request.input, &request.output)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(SummarizeResponse { summary }))
}
