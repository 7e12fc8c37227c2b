//! Persisted snapshot document shapes.
//!
//! Field names are camelCase to match the JSON documents shared with the
//! dashboard and stored in Walrus. `BTreeMap` keys keep the serialized
//! documents deterministic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::campaign::CampaignStatus;

/// Ledger fields persisted for one publisher wallet.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PublisherCounters {
    /// Lifetime earnings in mist.
    pub earnings: u64,
    /// Lifetime authorized withdrawals in mist.
    pub claimed: u64,
    /// Claim nonce.
    pub nonce: u64,
}

/// Mutable counters persisted for one campaign.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignCounters {
    /// Attributed spend in mist.
    pub spent_amount: u64,
    /// Lifecycle status at snapshot time.
    pub status: CampaignStatus,
}

/// Point-in-time serialization of all ledger counters.
///
/// The totals are derived values recomputed from live state on load; they
/// are persisted for dashboard consumption only. The `publishers` and
/// `campaigns` maps are the authoritative merge inputs at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CountersSnapshot {
    /// Sum of all campaign deposits in mist.
    pub total_deposited: u64,
    /// Sum of all attributed spend in mist.
    pub total_spent: u64,
    /// Total accepted impressions.
    pub total_impressions: u64,
    /// Total accepted clicks.
    pub total_clicks: u64,
    /// Per-publisher ledger fields keyed by wallet.
    pub publishers: BTreeMap<String, PublisherCounters>,
    /// Per-campaign counters keyed by campaign id.
    pub campaigns: BTreeMap<String, CampaignCounters>,
}
