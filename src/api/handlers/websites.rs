//! Publisher website submission handlers.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{CreateWebsiteRequest, WebsiteListResponse, WebsiteQuery};
use crate::app_state::AppState;
use crate::domain::Website;
use crate::domain::store::NewWebsite;
use crate::error::{AdsError, ErrorResponse};

/// `GET /websites` — List submitted websites.
#[utoipa::path(
    get,
    path = "/api/v1/websites",
    tag = "Websites",
    summary = "List websites",
    description = "Returns submitted websites, optionally filtered to one publisher wallet.",
    params(WebsiteQuery),
    responses(
        (status = 200, description = "Website list", body = WebsiteListResponse),
    )
)]
pub async fn list_websites(
    State(state): State<AppState>,
    Query(query): Query<WebsiteQuery>,
) -> Json<WebsiteListResponse> {
    let websites = state
        .store
        .list_websites(query.publisher_wallet.as_deref())
        .await;
    Json(WebsiteListResponse { websites })
}

/// `POST /websites` — Submit a website for moderation.
///
/// # Errors
///
/// Returns [`AdsError::InvalidRequest`] on missing fields or a URL that
/// is not http(s).
#[utoipa::path(
    post,
    path = "/api/v1/websites",
    tag = "Websites",
    summary = "Submit a website",
    description = "Records a publisher website submission with pending moderation status.",
    request_body = CreateWebsiteRequest,
    responses(
        (status = 201, description = "Website submitted", body = Website),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    )
)]
pub async fn create_website(
    State(state): State<AppState>,
    Json(req): Json<CreateWebsiteRequest>,
) -> Result<impl IntoResponse, AdsError> {
    if req.publisher_wallet.len() < 3 {
        return Err(AdsError::InvalidRequest(
            "publisher_wallet is required".to_string(),
        ));
    }
    if req.name.is_empty() || req.category.is_empty() {
        return Err(AdsError::InvalidRequest(
            "name and category are required".to_string(),
        ));
    }
    if !req.url.starts_with("http://") && !req.url.starts_with("https://") {
        return Err(AdsError::InvalidRequest("url must be http(s)".to_string()));
    }

    let website = state
        .store
        .add_website(NewWebsite {
            publisher_wallet: req.publisher_wallet,
            name: req.name,
            url: req.url,
            category: req.category,
            monthly_visitors: req.monthly_visitors,
        })
        .await;

    Ok((StatusCode::CREATED, Json(website)))
}

/// Website routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/websites", get(list_websites).post(create_website))
}
