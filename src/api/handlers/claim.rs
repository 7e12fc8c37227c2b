//! Withdrawal authorization handler.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{ClaimRequest, ClaimResponse};
use crate::app_state::AppState;
use crate::error::{AdsError, ErrorResponse};
use crate::signing::build_claim_message;

/// `POST /claim` — Issue a signed withdrawal authorization.
///
/// Eligibility is decided here, not in the signer: a zero claimable
/// balance answers 200 with `amount: 0`, and `mark_claimed` only runs
/// after the signature was produced so the signed nonce is always the
/// pre-increment value.
///
/// # Errors
///
/// Returns [`AdsError::InvalidAddress`] when the publisher address does
/// not decode to 32 bytes, or [`AdsError::InvalidRequest`] on missing
/// fields.
#[utoipa::path(
    post,
    path = "/api/v1/claim",
    tag = "Claims",
    summary = "Authorize a withdrawal",
    description = "Signs the publisher's full claimable balance under the current nonce. The returned signature and admin public key are submitted to the on-chain escrow module.",
    request_body = ClaimRequest,
    responses(
        (status = 200, description = "Authorization issued (or amount 0 when nothing is claimable)", body = ClaimResponse),
        (status = 400, description = "Invalid request or address", body = ErrorResponse),
    )
)]
pub async fn claim(
    State(state): State<AppState>,
    Json(req): Json<ClaimRequest>,
) -> Result<Json<ClaimResponse>, AdsError> {
    if req.publisher_address.len() < 3 || req.campaign_id.len() < 3 {
        return Err(AdsError::InvalidRequest(
            "publisher_address and campaign_id are required".to_string(),
        ));
    }

    let claimable = state.store.claimable(&req.publisher_address).await;
    if claimable.amount == 0 {
        return Ok(Json(ClaimResponse::nothing_pending(claimable.nonce)));
    }

    let message = build_claim_message(
        &req.publisher_address,
        claimable.amount,
        claimable.nonce,
        &req.campaign_id,
    )?;
    let signed = state.signer.sign(&message);

    // Only after the signature exists does the ledger advance.
    state
        .store
        .mark_claimed(&req.publisher_address, claimable.amount)
        .await;

    Ok(Json(ClaimResponse {
        amount: claimable.amount,
        nonce: claimable.nonce,
        signature: Some(signed.signature),
        admin_public_key: Some(signed.admin_public_key),
        campaign_id: Some(req.campaign_id),
        message: None,
    }))
}

/// Claim routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/claim", post(claim))
}
