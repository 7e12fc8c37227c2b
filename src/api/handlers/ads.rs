//! Ad serving and event tracking handlers.

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{ServeQuery, ServeResponse, TrackRequest, TrackResponse};
use crate::app_state::AppState;
use crate::domain::TrackingId;
use crate::error::{AdsError, ErrorResponse};

/// `GET /serve` — Select a campaign and open a tracking window.
///
/// A failed serve is deliberately indistinguishable from "no ads
/// available": both answer 204 so the response never leaks whether an
/// internal selection or delivery step failed.
///
/// # Errors
///
/// Returns [`AdsError::InvalidRequest`] on a malformed publisher address.
#[utoipa::path(
    get,
    path = "/api/v1/serve",
    tag = "Ads",
    summary = "Serve an ad",
    description = "Picks an eligible campaign for the requesting publisher and returns the creative plus a tracking token. Answers 204 when no campaign is eligible.",
    params(ServeQuery),
    responses(
        (status = 200, description = "Ad selected", body = ServeResponse),
        (status = 204, description = "No eligible campaign"),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    )
)]
pub async fn serve_ad(
    State(state): State<AppState>,
    Query(query): Query<ServeQuery>,
) -> Result<Response, AdsError> {
    if query.publisher_address.len() < 3 {
        return Err(AdsError::InvalidRequest(
            "publisher_address is required".to_string(),
        ));
    }

    let candidates = state.store.get_active_campaigns().await;
    let Some(selected) = state.selection.pick(&candidates).cloned() else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let Some(delivery) = state
        .store
        .create_delivery(&selected.id, &query.publisher_address)
        .await
    else {
        // The campaign drained between selection and delivery creation.
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    Ok(Json(ServeResponse {
        ad_id: selected.id,
        image_url: selected.image_url,
        click_url: selected.target_url,
        tracking_id: delivery.tracking_id.to_string(),
        remaining_budget: selected.remaining_budget(),
    })
    .into_response())
}

/// `POST /track` — Record a view or click for a tracking token.
///
/// # Errors
///
/// Returns [`AdsError::DeliveryNotFound`] when the token is unknown or
/// the event type was already recorded — both expected, frequent outcomes.
#[utoipa::path(
    post,
    path = "/api/v1/track",
    tag = "Ads",
    summary = "Track an ad event",
    description = "Records a view or click against a tracking token. Each event type is accepted at most once per token.",
    request_body = TrackRequest,
    responses(
        (status = 200, description = "Event recorded", body = TrackResponse),
        (status = 404, description = "Unknown or already-recorded tracking id", body = ErrorResponse),
    )
)]
pub async fn track_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<TrackRequest>,
) -> Result<Json<TrackResponse>, AdsError> {
    let tracking_id = TrackingId::parse(&req.tracking_id).ok_or(AdsError::DeliveryNotFound)?;
    let client_ip = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(',').next().unwrap_or(v).trim().to_string());

    let impression = state
        .store
        .record_impression(tracking_id, req.event_type, client_ip)
        .await
        .ok_or(AdsError::DeliveryNotFound)?;

    Ok(Json(TrackResponse {
        status: "ok".to_string(),
        cost: impression.cost,
        campaign_id: impression.campaign_id,
        publisher_wallet: impression.publisher_wallet,
    }))
}

/// Ad routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/serve", get(serve_ad))
        .route("/track", post(track_event))
}
