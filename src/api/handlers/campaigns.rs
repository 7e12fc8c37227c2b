//! Campaign registration and reporting handlers.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{CampaignListResponse, CreateCampaignRequest, PublisherQuery};
use crate::app_state::AppState;
use crate::domain::Campaign;
use crate::domain::store::{PublisherSummary, RegisterCampaign};
use crate::error::{AdsError, ErrorResponse};

/// `GET /campaigns` — List all campaigns with aggregate statistics.
#[utoipa::path(
    get,
    path = "/api/v1/campaigns",
    tag = "Campaigns",
    summary = "List campaigns",
    description = "Returns every registered campaign plus aggregate deposit/spend/impression statistics.",
    responses(
        (status = 200, description = "Campaign list", body = CampaignListResponse),
    )
)]
pub async fn list_campaigns(State(state): State<AppState>) -> Json<CampaignListResponse> {
    let campaigns = state.store.list_campaigns().await;
    let stats = state.store.campaign_stats().await;
    Json(CampaignListResponse { campaigns, stats })
}

/// `POST /campaigns` — Register a campaign after its on-chain funding.
///
/// # Errors
///
/// Returns [`AdsError::InvalidRequest`] on malformed identifiers.
#[utoipa::path(
    post,
    path = "/api/v1/campaigns",
    tag = "Campaigns",
    summary = "Register a campaign",
    description = "Registers (or re-registers) a funded campaign. Re-registration preserves accrued spend.",
    request_body = CreateCampaignRequest,
    responses(
        (status = 201, description = "Campaign registered", body = Campaign),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    )
)]
pub async fn create_campaign(
    State(state): State<AppState>,
    Json(req): Json<CreateCampaignRequest>,
) -> Result<impl IntoResponse, AdsError> {
    if req.id.len() < 3 {
        return Err(AdsError::InvalidRequest("id is too short".to_string()));
    }
    if req.advertiser_wallet.len() < 3 {
        return Err(AdsError::InvalidRequest(
            "advertiser_wallet is required".to_string(),
        ));
    }

    let campaign = state
        .store
        .register_campaign(RegisterCampaign {
            id: req.id,
            chain_object_id: req.chain_object_id,
            advertiser_wallet: req.advertiser_wallet,
            total_deposited: req.total_deposited,
            cpc_bid: req.cpc_bid,
            image_url: req.image_url,
            target_url: req.target_url,
            status: req.status,
        })
        .await;

    Ok((StatusCode::CREATED, Json(campaign)))
}

/// `GET /publisher/summary` — Earnings summary for one publisher.
///
/// # Errors
///
/// Returns [`AdsError::InvalidRequest`] on a malformed publisher address.
#[utoipa::path(
    get,
    path = "/api/v1/publisher/summary",
    tag = "Campaigns",
    summary = "Publisher earnings summary",
    description = "Returns claimable balance, claim nonce, and lifetime view/click counts for a publisher wallet.",
    params(PublisherQuery),
    responses(
        (status = 200, description = "Publisher summary", body = PublisherSummary),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    )
)]
pub async fn publisher_summary(
    State(state): State<AppState>,
    Query(query): Query<PublisherQuery>,
) -> Result<Json<PublisherSummary>, AdsError> {
    if query.publisher_address.len() < 3 {
        return Err(AdsError::InvalidRequest(
            "publisher_address is required".to_string(),
        ));
    }
    Ok(Json(state.store.publisher_summary(&query.publisher_address).await))
}

/// Campaign routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/campaigns", get(list_campaigns).post(create_campaign))
        .route("/publisher/summary", get(publisher_summary))
}
