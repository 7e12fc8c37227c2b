//! Claim authorization DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for `POST /claim`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ClaimRequest {
    /// Publisher wallet claiming accrued earnings.
    pub publisher_address: String,
    /// Campaign id bound into the signed message.
    pub campaign_id: String,
}

/// Claim result.
///
/// When nothing is claimable only `amount` (zero), `nonce`, and `message`
/// are present; a successful authorization carries the signature material
/// the wallet submits on-chain.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClaimResponse {
    /// Authorized amount in mist (zero when nothing is claimable).
    pub amount: u64,
    /// Nonce the authorization was signed under.
    pub nonce: u64,
    /// Base64 detached signature over the claim message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// Base64 admin public key the signature verifies under.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_public_key: Option<String>,
    /// Campaign id echoed from the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<String>,
    /// Explanation for empty results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ClaimResponse {
    /// Response for a publisher with no pending earnings.
    #[must_use]
    pub fn nothing_pending(nonce: u64) -> Self {
        Self {
            amount: 0,
            nonce,
            signature: None,
            admin_public_key: None,
            campaign_id: None,
            message: Some("No pending earnings".to_string()),
        }
    }
}
