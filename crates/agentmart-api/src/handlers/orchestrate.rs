//! Orchestrated chat handlers

use agentmart_catalog::Capability;
use agentmart_orchestrator::{result_message, TurnOutcome};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;

use crate::dto::{ExecuteRequest, ExecuteResponse, OrchestrateRequest};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

fn require_wallet(wallet: Option<String>) -> ApiResult<String> {
    wallet
        .filter(|w| !w.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Wallet address required"))
}

/// `POST /api/orchestrate`: chat turn with the price gate applied server-side
pub async fn orchestrate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<OrchestrateRequest>, JsonRejection>,
) -> ApiResult<Json<TurnOutcome>> {
    let Json(request) = payload?;
    let wallet = require_wallet(request.wallet_address)?;

    let outcome = state.orchestrator.handle_turn(&wallet, request.messages).await?;
    Ok(Json(outcome))
}

/// `POST /api/orchestrate/execute`: run a call the user approved
pub async fn execute(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ExecuteRequest>, JsonRejection>,
) -> ApiResult<Json<ExecuteResponse>> {
    let Json(request) = payload?;
    let wallet = require_wallet(request.wallet_address)?;

    if Capability::from_function_name(&request.name).is_none() {
        return Err(ApiError::bad_request(format!("Unknown agent function: {}", request.name)));
    }

    let call = state
        .orchestrator
        .execute_call(&wallet, &request.name, request.arguments)
        .await?;

    Ok(Json(ExecuteResponse {
        message: result_message(&call),
        call,
    }))
}
