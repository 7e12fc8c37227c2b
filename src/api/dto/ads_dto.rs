//! Serve and tracking DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::EventType;

/// Query parameters for `GET /serve`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ServeQuery {
    /// Wallet of the publisher embedding the widget.
    pub publisher_address: String,
    /// Requested slot size hint (currently informational).
    #[serde(default)]
    pub slot_size: Option<String>,
}

/// Serve decision returned to the widget.
#[derive(Debug, Serialize, ToSchema)]
pub struct ServeResponse {
    /// Selected campaign id.
    pub ad_id: String,
    /// Creative image URL to render.
    pub image_url: String,
    /// Click-through destination.
    pub click_url: String,
    /// Tracking token for the follow-up view/click calls.
    pub tracking_id: String,
    /// Campaign budget still available, in mist.
    pub remaining_budget: u64,
}

/// Request body for `POST /track`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TrackRequest {
    /// Tracking token from the serve response.
    pub tracking_id: String,
    /// Which event happened.
    #[serde(rename = "type")]
    pub event_type: EventType,
}

/// Track result for an accepted event.
#[derive(Debug, Serialize, ToSchema)]
pub struct TrackResponse {
    /// Always `"ok"` for accepted events.
    pub status: String,
    /// Attributed cost in mist.
    pub cost: u64,
    /// Campaign charged.
    pub campaign_id: String,
    /// Publisher credited.
    pub publisher_wallet: String,
}
