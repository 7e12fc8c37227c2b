//! Persistence/audit introspection handler.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::StatusResponse;
use crate::app_state::AppState;

/// `GET /status` — Current blob pointers, audit state, and counts.
#[utoipa::path(
    get,
    path = "/api/v1/status",
    tag = "System",
    summary = "Persistence status",
    description = "Returns the latest blob pointer per dataset, the audit log pointer and queue depth, and the registered campaign count.",
    responses(
        (status = 200, description = "Current persistence status", body = StatusResponse),
    )
)]
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let (campaigns, counters, websites) = state.persistence.dataset_pointers().await;
    Json(StatusResponse {
        campaigns_blob_id: campaigns.map(|p| p.to_string()),
        counters_blob_id: counters.map(|p| p.to_string()),
        websites_blob_id: websites.map(|p| p.to_string()),
        audit_log: state.audit.pointer().await,
        audit_queue_depth: state.audit.queue_len().await,
        campaigns_count: state.store.campaign_count().await,
        ephemeral_signing_key: state.signer.is_ephemeral(),
    })
}

/// Status routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/status", get(status))
}
