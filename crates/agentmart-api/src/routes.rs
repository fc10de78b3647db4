//! API Routes

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers;
use crate::state::AppState;

/// Storefront routes, nested under `/api`
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/agents", get(handlers::agents::list_agents))
        .route("/chat", post(handlers::chat::chat))
        .route("/summarize", post(handlers::chat::summarize))
        .route(
            "/history",
            get(handlers::history::get_history).post(handlers::history::post_history),
        )
        .route("/job-result/:job_id", get(handlers::jobs::job_result))
        .merge(job_routes())
        .merge(orchestrate_routes())
}

/// Escrow job routes
fn job_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/jobs", get(handlers::jobs::list_jobs))
        .route("/jobs/track", post(handlers::jobs::track_job))
        .route(
            "/jobs/track/:tx_hash",
            get(handlers::jobs::tracked_job).delete(handlers::jobs::untrack_job),
        )
        .route("/jobs/:job_id", get(handlers::jobs::get_job))
}

/// Server-side orchestration with the price gate
fn orchestrate_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orchestrate", post(handlers::orchestrate::orchestrate))
        .route("/orchestrate/execute", post(handlers::orchestrate::execute))
}
