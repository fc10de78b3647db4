//! Call history handlers

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use std::sync::Arc;

use crate::dto::{
    HistoryAction, HistoryQuery, HistoryRecordData, HistoryResponse, SaveResponse,
    DEFAULT_HISTORY_LIMIT,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// `GET /api/history?wallet=&limit=&offset=`
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    query: Result<Query<HistoryQuery>, axum::extract::rejection::QueryRejection>,
) -> ApiResult<Json<HistoryResponse>> {
    let Query(query) = query?;
    let wallet = query
        .wallet
        .filter(|w| !w.is_empty())
        .ok_or_else(|| ApiError::bad_request("Wallet address required"))?;

    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let offset = query.offset.unwrap_or(0);

    let history = state.history.list(&wallet, limit, offset).await?;
    let count = state.history.count(&wallet).await?;
    let stats = state.history.stats(&wallet).await?;

    Ok(Json(HistoryResponse { history, count, stats }))
}

/// `POST /api/history` with `{action: "create" | "update", data}`
pub async fn post_history(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<HistoryAction>, JsonRejection>,
) -> ApiResult<Json<SaveResponse>> {
    let Json(body) = payload?;

    match body.action.as_deref() {
        Some("create") => {
            let record = HistoryRecordData::from_value(body.data)?.into_new_record()?;
            state.history.create(&record).await?;
            tracing::info!(id = %record.id, wallet = %record.wallet_address, "History record created");
            Ok(Json(SaveResponse { success: true, id: record.id }))
        }
        Some("update") => {
            let (id, update) = HistoryRecordData::from_value(body.data)?.into_update()?;
            if !state.history.update(&id, &update).await? {
                tracing::debug!(%id, "History update for unknown id ignored");
            }
            Ok(Json(SaveResponse { success: true, id }))
        }
        _ => Err(ApiError::bad_request(r#"Invalid action. Must be "create" or "update""#)),
    }
}
