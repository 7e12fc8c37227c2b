//! Campaign registration and reporting DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::campaign::{Campaign, CampaignStatus};
use crate::domain::store::CampaignStats;

/// Request body for `POST /campaigns`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCampaignRequest {
    /// Stable campaign identifier (usually the on-chain object id).
    pub id: String,
    /// On-chain escrow object reference when distinct from `id`.
    #[serde(default)]
    pub chain_object_id: Option<String>,
    /// Funding advertiser wallet.
    pub advertiser_wallet: String,
    /// Escrowed deposit in mist.
    pub total_deposited: u64,
    /// Cost per click in mist.
    pub cpc_bid: u64,
    /// Creative image URL.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Click-through target URL.
    #[serde(default)]
    pub target_url: Option<String>,
    /// Initial status; defaults to `active`.
    #[serde(default)]
    pub status: Option<CampaignStatus>,
}

/// Response body for `GET /campaigns`.
#[derive(Debug, Serialize, ToSchema)]
pub struct CampaignListResponse {
    /// All registered campaigns.
    pub campaigns: Vec<Campaign>,
    /// Aggregate spend statistics.
    pub stats: CampaignStats,
}

/// Query parameters for `GET /publisher/summary`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct PublisherQuery {
    /// Publisher wallet to summarize.
    pub publisher_address: String,
}
