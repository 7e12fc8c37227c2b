//! Campaign and website records.
//!
//! A [`Campaign`] is an advertiser's funded, biddable unit of ad delivery.
//! All monetary fields are integers in the smallest currency unit ("mist").
//! Serialized field names are camelCase to match the persisted snapshot
//! layout shared with the dashboard.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle status of a campaign.
///
/// `Empty` is terminal with respect to this engine: once a campaign's spend
/// reaches its deposit nothing here transitions it back to `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    /// Registered but not yet serving.
    Pending,
    /// Eligible for selection (subject to the budget filter).
    Active,
    /// Temporarily withheld from selection by the advertiser.
    Paused,
    /// Budget exhausted; never serves again.
    Empty,
}

/// An advertiser's funded campaign.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    /// Stable logical identifier (dictionary key in the store).
    pub id: String,

    /// On-chain escrow object reference; may equal `id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_object_id: Option<String>,

    /// Wallet address of the funding advertiser.
    pub advertiser_wallet: String,

    /// Total escrowed deposit in mist.
    pub total_deposited: u64,

    /// Cumulative attributed spend in mist. Monotonically non-decreasing;
    /// never exceeds `total_deposited`.
    pub spent_amount: u64,

    /// Cost charged per click in mist. Views cost one tenth of this.
    pub cpc_bid: u64,

    /// Creative image URL served to widgets.
    pub image_url: String,

    /// Advertiser landing page for clicks.
    pub target_url: String,

    /// Current lifecycle status.
    pub status: CampaignStatus,
}

impl Campaign {
    /// Returns the budget still available to spend, clamped to zero for
    /// pathological snapshots where spend exceeds the deposit.
    #[must_use]
    pub fn remaining_budget(&self) -> u64 {
        self.total_deposited.saturating_sub(self.spent_amount)
    }

    /// Returns `true` if this campaign can afford at least one more click.
    #[must_use]
    pub fn affords_click(&self) -> bool {
        self.status == CampaignStatus::Active && self.remaining_budget() > self.cpc_bid
    }

    /// Demo campaign seeded at first boot so `/serve` works out of the box.
    #[must_use]
    pub fn demo() -> Self {
        Self {
            id: "demo-campaign".to_string(),
            chain_object_id: None,
            advertiser_wallet: "0xadvertiser_demo".to_string(),
            total_deposited: 10_000_000,
            spent_amount: 0,
            cpc_bid: 150_000,
            image_url: "https://dummyimage.com/728x90/134e4a/ffffff&text=Coral+Ads+Demo".to_string(),
            target_url: "https://coralads.xyz".to_string(),
            status: CampaignStatus::Active,
        }
    }
}

/// Moderation status of a publisher-submitted website.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum WebsiteStatus {
    /// Awaiting moderation.
    Pending,
    /// Approved for serving.
    Approved,
    /// Rejected by moderation.
    Rejected,
}

/// A website submitted by a publisher for ad placement.
///
/// Moderation happens outside this engine: records enter as `Pending` and
/// nothing here mutates their status.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Website {
    /// Unique website identifier.
    pub id: String,

    /// Wallet of the submitting publisher.
    pub publisher_wallet: String,

    /// Display name.
    pub name: String,

    /// Site URL.
    pub url: String,

    /// Content category used for moderation and reporting.
    pub category: String,

    /// Publisher-declared monthly visitor count.
    pub monthly_visitors: u64,

    /// Moderation status.
    pub status: WebsiteStatus,

    /// Rolling daily impression counter.
    pub daily_impressions: u64,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn campaign(total: u64, spent: u64, bid: u64, status: CampaignStatus) -> Campaign {
        Campaign {
            id: "c1".to_string(),
            chain_object_id: None,
            advertiser_wallet: "0xadv".to_string(),
            total_deposited: total,
            spent_amount: spent,
            cpc_bid: bid,
            image_url: "img".to_string(),
            target_url: "url".to_string(),
            status,
        }
    }

    #[test]
    fn remaining_budget_clamps_at_zero() {
        let c = campaign(100, 250, 10, CampaignStatus::Active);
        assert_eq!(c.remaining_budget(), 0);
    }

    #[test]
    fn affords_click_requires_strictly_more_than_one_bid() {
        let exact = campaign(1_000, 900, 100, CampaignStatus::Active);
        assert!(!exact.affords_click());

        let above = campaign(1_000, 899, 100, CampaignStatus::Active);
        assert!(above.affords_click());
    }

    #[test]
    fn paused_campaign_never_affords() {
        let c = campaign(1_000, 0, 100, CampaignStatus::Paused);
        assert!(!c.affords_click());
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&CampaignStatus::Empty).ok();
        assert_eq!(json.as_deref(), Some("\"empty\""));
    }

    #[test]
    fn campaign_round_trips_camel_case() {
        let c = campaign(1_000, 10, 100, CampaignStatus::Active);
        let Ok(json) = serde_json::to_string(&c) else {
            panic!("serialization failed");
        };
        assert!(json.contains("\"totalDeposited\""));
        assert!(json.contains("\"cpcBid\""));
        let Ok(back) = serde_json::from_str::<Campaign>(&json) else {
            panic!("deserialization failed");
        };
        assert_eq!(back.spent_amount, 10);
    }
}
