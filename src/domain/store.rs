//! The campaign and ledger store: sole authority over all mutable economic
//! state.
//!
//! [`LedgerStore`] owns campaigns, pending deliveries, the impression log,
//! publisher ledgers, and submitted websites behind a single
//! [`tokio::sync::RwLock`]. Impression recording touches four of those maps
//! and must be atomic across them, so the store serializes money mutations
//! through one write lock rather than per-entry locks. Every mutation
//! publishes a [`StateEvent`] on the [`StateBus`]; durability and audit
//! logging happen in background subscribers, never on the request path.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::RwLock;
use utoipa::ToSchema;

use super::campaign::{Campaign, CampaignStatus, Website, WebsiteStatus};
use super::delivery::{PendingDelivery, TrackingId};
use super::impression::{EventType, Impression};
use super::ledger::{Claimable, PublisherLedger};
use super::state_bus::{StateBus, StateEvent};
use crate::persistence::models::{CampaignCounters, CountersSnapshot, PublisherCounters};

/// Fallback creative shown when a registration omits an image.
const DEFAULT_CREATIVE_URL: &str =
    "https://dummyimage.com/728x90/0f172a/ffffff&text=Coral+Ads+Leaderboard";

/// Fallback click-through target when a registration omits one.
const DEFAULT_TARGET_URL: &str = "https://coralads.xyz";

/// Input for [`LedgerStore::register_campaign`].
#[derive(Debug, Clone)]
pub struct RegisterCampaign {
    /// Stable campaign identifier.
    pub id: String,
    /// On-chain escrow object reference.
    pub chain_object_id: Option<String>,
    /// Funding advertiser wallet.
    pub advertiser_wallet: String,
    /// Escrowed deposit in mist.
    pub total_deposited: u64,
    /// Cost per click in mist.
    pub cpc_bid: u64,
    /// Creative image URL; defaulted when absent.
    pub image_url: Option<String>,
    /// Click-through target URL; defaulted when absent.
    pub target_url: Option<String>,
    /// Initial status; defaults to `Active`.
    pub status: Option<CampaignStatus>,
}

/// Input for [`LedgerStore::add_website`].
#[derive(Debug, Clone)]
pub struct NewWebsite {
    /// Submitting publisher wallet.
    pub publisher_wallet: String,
    /// Display name.
    pub name: String,
    /// Site URL.
    pub url: String,
    /// Content category.
    pub category: String,
    /// Publisher-declared monthly visitors.
    pub monthly_visitors: u64,
}

/// Aggregate spend statistics across all campaigns.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampaignStats {
    /// Sum of all campaign deposits in mist.
    pub total_deposited: u64,
    /// Sum of all attributed spend in mist.
    pub total_spent: u64,
    /// Total accepted impressions (views and clicks).
    pub total_impressions: u64,
    /// Total accepted clicks.
    pub total_clicks: u64,
}

/// Aggregate earnings view for one publisher.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublisherSummary {
    /// Earnings accrued but not yet authorized for withdrawal.
    pub available_to_claim: u64,
    /// Current claim nonce.
    pub nonce: u64,
    /// Lifetime earnings in mist.
    pub total_earnings: u64,
    /// Lifetime accepted views.
    pub total_ad_views: u64,
    /// Lifetime accepted clicks.
    pub total_clicks: u64,
}

/// All mutable economic state, guarded as one unit.
#[derive(Debug, Default)]
struct LedgerState {
    campaigns: HashMap<String, Campaign>,
    deliveries: HashMap<TrackingId, PendingDelivery>,
    impressions: Vec<Impression>,
    publishers: HashMap<String, PublisherLedger>,
    websites: Vec<Website>,
}

/// Single-instance store owning every map the engine mutates.
///
/// # Concurrency
///
/// Request handling is concurrent, but every money-mutating operation
/// acquires the single write lock, so two concurrent `record_impression`
/// calls for the same tracking id and event type can never both succeed.
#[derive(Debug)]
pub struct LedgerStore {
    state: RwLock<LedgerState>,
    bus: StateBus,
}

impl LedgerStore {
    /// Creates an empty store publishing on the given bus.
    #[must_use]
    pub fn new(bus: StateBus) -> Self {
        Self {
            state: RwLock::new(LedgerState::default()),
            bus,
        }
    }

    /// Returns the bus this store publishes mutation events on.
    #[must_use]
    pub fn bus(&self) -> &StateBus {
        &self.bus
    }

    /// Registers (or re-registers) a campaign keyed by id.
    ///
    /// Re-registration is upsert-with-memory: creative, bid, deposit, and
    /// wallet fields take the new values, but an existing `spent_amount`
    /// is preserved so spend history cannot be erased by resubmitting an
    /// id. The status degrades to `Empty` whenever the preserved spend
    /// already covers the new deposit.
    pub async fn register_campaign(&self, draft: RegisterCampaign) -> Campaign {
        let mut campaign = Campaign {
            id: draft.id,
            chain_object_id: draft.chain_object_id,
            advertiser_wallet: draft.advertiser_wallet,
            total_deposited: draft.total_deposited,
            spent_amount: 0,
            cpc_bid: draft.cpc_bid,
            image_url: draft.image_url.unwrap_or_else(|| DEFAULT_CREATIVE_URL.to_string()),
            target_url: draft.target_url.unwrap_or_else(|| DEFAULT_TARGET_URL.to_string()),
            status: draft.status.unwrap_or(CampaignStatus::Active),
        };

        {
            let mut state = self.state.write().await;
            if let Some(existing) = state.campaigns.get(&campaign.id) {
                campaign.spent_amount = existing.spent_amount;
            }
            if campaign.spent_amount >= campaign.total_deposited {
                campaign.status = CampaignStatus::Empty;
            }
            state.campaigns.insert(campaign.id.clone(), campaign.clone());
        }

        tracing::info!(campaign_id = %campaign.id, deposit = campaign.total_deposited, "campaign registered");
        self.bus.publish(StateEvent::CampaignRegistered {
            campaign_id: campaign.id.clone(),
            timestamp: Utc::now(),
        });
        campaign
    }

    /// Inserts a prebuilt campaign, used by the first-boot demo seed.
    pub async fn seed_campaign(&self, campaign: Campaign) -> Campaign {
        {
            let mut state = self.state.write().await;
            state.campaigns.insert(campaign.id.clone(), campaign.clone());
        }
        tracing::info!(campaign_id = %campaign.id, "campaign seeded");
        self.bus.publish(StateEvent::CampaignRegistered {
            campaign_id: campaign.id.clone(),
            timestamp: Utc::now(),
        });
        campaign
    }

    /// Returns `true` if any campaign is registered.
    pub async fn has_campaigns(&self) -> bool {
        !self.state.read().await.campaigns.is_empty()
    }

    /// Number of registered campaigns.
    pub async fn campaign_count(&self) -> usize {
        self.state.read().await.campaigns.len()
    }

    /// Looks up a campaign by id.
    pub async fn get_campaign(&self, id: &str) -> Option<Campaign> {
        self.state.read().await.campaigns.get(id).cloned()
    }

    /// Returns all campaigns, unfiltered.
    pub async fn list_campaigns(&self) -> Vec<Campaign> {
        self.state.read().await.campaigns.values().cloned().collect()
    }

    /// Returns campaigns eligible for selection: active, and with enough
    /// budget left to afford at least one more click. A campaign that is
    /// nominally active but cannot pay another click is excluded.
    pub async fn get_active_campaigns(&self) -> Vec<Campaign> {
        self.state
            .read()
            .await
            .campaigns
            .values()
            .filter(|c| c.affords_click())
            .cloned()
            .collect()
    }

    /// Creates a pending delivery for the given campaign, snapshotting the
    /// bid at this instant. Returns `None` if the campaign is absent or
    /// not active; the caller treats that the same as "no ads available".
    pub async fn create_delivery(
        &self,
        campaign_id: &str,
        publisher_wallet: &str,
    ) -> Option<PendingDelivery> {
        let mut state = self.state.write().await;
        let campaign = state.campaigns.get(campaign_id)?;
        if campaign.status != CampaignStatus::Active {
            return None;
        }

        let delivery = PendingDelivery::new(
            campaign_id.to_string(),
            publisher_wallet.to_string(),
            campaign.cpc_bid,
        );
        state.deliveries.insert(delivery.tracking_id, delivery.clone());
        Some(delivery)
    }

    /// Records a view or click against a pending delivery.
    ///
    /// Returns `None` when the tracking id is unknown, when the event type
    /// was already recorded for this delivery, or when the delivery's
    /// campaign no longer exists — all benign, frequent outcomes.
    ///
    /// On success this is the single mutation point for money: it appends
    /// the impression, bumps the campaign spend (transitioning to `Empty`
    /// at exhaustion), credits the publisher, and publishes the event the
    /// audit batcher and persistence worker react to.
    pub async fn record_impression(
        &self,
        tracking_id: TrackingId,
        event_type: EventType,
        client_ip: Option<String>,
    ) -> Option<Impression> {
        let impression = {
            let mut state = self.state.write().await;

            let delivery = state.deliveries.get(&tracking_id)?;
            if delivery.already_recorded(event_type) {
                return None;
            }
            let campaign_id = delivery.campaign_id.clone();
            let publisher_wallet = delivery.publisher_wallet.clone();
            let cpc_bid = delivery.cpc_bid;

            if !state.campaigns.contains_key(&campaign_id) {
                return None;
            }

            // Point of no return: commit flag, spend, earnings, and the
            // fact record together under the one write lock.
            match event_type {
                EventType::Click => {
                    // Click is the terminal event for a delivery.
                    state.deliveries.remove(&tracking_id);
                }
                EventType::View => {
                    if let Some(delivery) = state.deliveries.get_mut(&tracking_id) {
                        delivery.view_recorded = true;
                    }
                }
            }

            let cost = event_type.cost(cpc_bid);

            if let Some(campaign) = state.campaigns.get_mut(&campaign_id) {
                campaign.spent_amount = campaign
                    .spent_amount
                    .saturating_add(cost)
                    .min(campaign.total_deposited);
                if campaign.spent_amount >= campaign.total_deposited {
                    if campaign.status != CampaignStatus::Empty {
                        tracing::info!(campaign_id = %campaign_id, "campaign budget exhausted");
                    }
                    campaign.status = CampaignStatus::Empty;
                }
            }

            let ledger = state.publishers.entry(publisher_wallet.clone()).or_default();
            ledger.earnings = ledger.earnings.saturating_add(cost);

            let impression =
                Impression::new(campaign_id, publisher_wallet, event_type, cost, client_ip);
            state.impressions.push(impression.clone());
            impression
        };

        self.bus.publish(StateEvent::ImpressionRecorded {
            impression: impression.clone(),
        });
        Some(impression)
    }

    /// Returns what the publisher may claim right now and the nonce a
    /// signature must be issued under.
    pub async fn claimable(&self, publisher_wallet: &str) -> Claimable {
        let state = self.state.read().await;
        let ledger = state.publishers.get(publisher_wallet).copied().unwrap_or_default();
        Claimable {
            amount: ledger.claimable(),
            nonce: ledger.nonce,
        }
    }

    /// Marks `amount` as authorized for withdrawal and advances the nonce.
    ///
    /// Callers must invoke this only after a signature over the same
    /// amount/nonce pair was produced; the nonce inside the signed message
    /// is the pre-increment value.
    pub async fn mark_claimed(&self, publisher_wallet: &str, amount: u64) {
        let nonce = {
            let mut state = self.state.write().await;
            let ledger = state.publishers.entry(publisher_wallet.to_string()).or_default();
            ledger.claimed = ledger.claimed.saturating_add(amount);
            ledger.nonce = ledger.nonce.saturating_add(1);
            ledger.nonce
        };

        tracing::info!(publisher = %publisher_wallet, amount, nonce, "claim authorized");
        self.bus.publish(StateEvent::ClaimAuthorized {
            publisher_wallet: publisher_wallet.to_string(),
            amount,
            nonce: nonce.saturating_sub(1),
            timestamp: Utc::now(),
        });
    }

    /// Aggregate spend statistics, recomputed on demand.
    pub async fn campaign_stats(&self) -> CampaignStats {
        let state = self.state.read().await;
        CampaignStats {
            total_deposited: state.campaigns.values().map(|c| c.total_deposited).sum(),
            total_spent: state.campaigns.values().map(|c| c.spent_amount).sum(),
            total_impressions: state.impressions.len() as u64,
            total_clicks: state
                .impressions
                .iter()
                .filter(|i| i.event_type == EventType::Click)
                .count() as u64,
        }
    }

    /// Aggregate earnings view for one publisher, recomputed on demand.
    pub async fn publisher_summary(&self, publisher_wallet: &str) -> PublisherSummary {
        let state = self.state.read().await;
        let ledger = state.publishers.get(publisher_wallet).copied().unwrap_or_default();
        let mut views = 0u64;
        let mut clicks = 0u64;
        for impression in state
            .impressions
            .iter()
            .filter(|i| i.publisher_wallet == publisher_wallet)
        {
            match impression.event_type {
                EventType::View => views += 1,
                EventType::Click => clicks += 1,
            }
        }
        PublisherSummary {
            available_to_claim: ledger.claimable(),
            nonce: ledger.nonce,
            total_earnings: ledger.earnings,
            total_ad_views: views,
            total_clicks: clicks,
        }
    }

    /// Appends a publisher-submitted website as `Pending`.
    pub async fn add_website(&self, draft: NewWebsite) -> Website {
        let website = Website {
            id: uuid::Uuid::new_v4().to_string(),
            publisher_wallet: draft.publisher_wallet,
            name: draft.name,
            url: draft.url,
            category: draft.category,
            monthly_visitors: draft.monthly_visitors,
            status: WebsiteStatus::Pending,
            daily_impressions: 0,
        };
        {
            let mut state = self.state.write().await;
            state.websites.push(website.clone());
        }
        tracing::info!(website_id = %website.id, url = %website.url, "website submitted");
        self.bus.publish(StateEvent::WebsiteAdded {
            website_id: website.id.clone(),
            timestamp: Utc::now(),
        });
        website
    }

    /// Lists websites, optionally filtered to one publisher.
    pub async fn list_websites(&self, publisher_wallet: Option<&str>) -> Vec<Website> {
        let state = self.state.read().await;
        state
            .websites
            .iter()
            .filter(|w| publisher_wallet.is_none_or(|p| w.publisher_wallet == p))
            .cloned()
            .collect()
    }

    /// Evicts deliveries that were served longer than `ttl` ago without a
    /// click, bounding memory for ads that are viewed but never clicked.
    /// Returns the number of evicted records.
    pub async fn evict_stale_deliveries(&self, ttl: Duration) -> usize {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let before = state.deliveries.len();
        state
            .deliveries
            .retain(|_, d| (now - d.created_at).to_std().map_or(true, |age| age <= ttl));
        let evicted = before - state.deliveries.len();
        if evicted > 0 {
            tracing::info!(evicted, "evicted stale deliveries");
        }
        evicted
    }

    /// Number of deliveries currently awaiting tracking events.
    pub async fn pending_delivery_count(&self) -> usize {
        self.state.read().await.deliveries.len()
    }

    /// Replaces the campaign map wholesale from a loaded snapshot.
    /// Startup only.
    pub async fn load_campaigns(&self, campaigns: Vec<Campaign>) {
        let mut state = self.state.write().await;
        state.campaigns = campaigns.into_iter().map(|c| (c.id.clone(), c)).collect();
    }

    /// Merges a loaded counters snapshot into live state, field by field.
    ///
    /// Campaign spend and status are only merged into campaigns that
    /// already exist (campaigns load first at startup); unknown ids are
    /// skipped. Publisher ledgers are keyed by wallet and overwrite any
    /// existing entry. Snapshot totals are derived values and ignored.
    pub async fn load_counters(&self, counters: CountersSnapshot) {
        let mut state = self.state.write().await;
        for (id, merged) in counters.campaigns {
            if let Some(campaign) = state.campaigns.get_mut(&id) {
                campaign.spent_amount = merged.spent_amount;
                campaign.status = merged.status;
            }
        }
        for (wallet, counters) in counters.publishers {
            state.publishers.insert(
                wallet,
                PublisherLedger {
                    earnings: counters.earnings,
                    claimed: counters.claimed,
                    nonce: counters.nonce,
                },
            );
        }
    }

    /// Replaces the website list wholesale from a loaded snapshot.
    /// Startup only.
    pub async fn load_websites(&self, websites: Vec<Website>) {
        let mut state = self.state.write().await;
        state.websites = websites;
    }

    /// Point-in-time copy of all campaigns for persistence.
    pub async fn snapshot_campaigns(&self) -> Vec<Campaign> {
        self.list_campaigns().await
    }

    /// Point-in-time counters snapshot (campaign spend/status plus
    /// publisher ledgers) for persistence.
    pub async fn snapshot_counters(&self) -> CountersSnapshot {
        let state = self.state.read().await;
        CountersSnapshot {
            total_deposited: state.campaigns.values().map(|c| c.total_deposited).sum(),
            total_spent: state.campaigns.values().map(|c| c.spent_amount).sum(),
            total_impressions: state.impressions.len() as u64,
            total_clicks: state
                .impressions
                .iter()
                .filter(|i| i.event_type == EventType::Click)
                .count() as u64,
            publishers: state
                .publishers
                .iter()
                .map(|(wallet, ledger)| {
                    (
                        wallet.clone(),
                        PublisherCounters {
                            earnings: ledger.earnings,
                            claimed: ledger.claimed,
                            nonce: ledger.nonce,
                        },
                    )
                })
                .collect(),
            campaigns: state
                .campaigns
                .iter()
                .map(|(id, c)| {
                    (
                        id.clone(),
                        CampaignCounters {
                            spent_amount: c.spent_amount,
                            status: c.status,
                        },
                    )
                })
                .collect(),
        }
    }

    /// Point-in-time copy of all websites for persistence.
    pub async fn snapshot_websites(&self) -> Vec<Website> {
        self.state.read().await.websites.clone()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn make_store() -> LedgerStore {
        LedgerStore::new(StateBus::new(64))
    }

    fn draft(id: &str, total: u64, bid: u64) -> RegisterCampaign {
        RegisterCampaign {
            id: id.to_string(),
            chain_object_id: None,
            advertiser_wallet: "0xadv".to_string(),
            total_deposited: total,
            cpc_bid: bid,
            image_url: None,
            target_url: None,
            status: Some(CampaignStatus::Active),
        }
    }

    async fn serve(store: &LedgerStore, campaign_id: &str) -> PendingDelivery {
        let Some(delivery) = store.create_delivery(campaign_id, "0xpub").await else {
            panic!("expected a delivery");
        };
        delivery
    }

    #[tokio::test]
    async fn serve_view_click_end_to_end() {
        let store = make_store();
        store.register_campaign(draft("c1", 10_000_000, 150_000)).await;

        let delivery = serve(&store, "c1").await;
        assert_eq!(delivery.cpc_bid, 150_000);

        let Some(view) = store
            .record_impression(delivery.tracking_id, EventType::View, None)
            .await
        else {
            panic!("view should be accepted");
        };
        assert_eq!(view.cost, 15_000);

        let Some(campaign) = store.get_campaign("c1").await else {
            panic!("campaign missing");
        };
        assert_eq!(campaign.spent_amount, 15_000);
        assert_eq!(campaign.status, CampaignStatus::Active);
        assert_eq!(store.claimable("0xpub").await.amount, 15_000);

        // A click on the same tracking id still matches after the view.
        let Some(click) = store
            .record_impression(delivery.tracking_id, EventType::Click, None)
            .await
        else {
            panic!("click should be accepted");
        };
        assert_eq!(click.cost, 150_000);

        let Some(campaign) = store.get_campaign("c1").await else {
            panic!("campaign missing");
        };
        assert_eq!(campaign.spent_amount, 165_000);
        assert_eq!(store.claimable("0xpub").await.amount, 165_000);

        // Click is terminal: re-recording is rejected with no state change.
        let replay = store
            .record_impression(delivery.tracking_id, EventType::Click, None)
            .await;
        assert!(replay.is_none());
        let Some(campaign) = store.get_campaign("c1").await else {
            panic!("campaign missing");
        };
        assert_eq!(campaign.spent_amount, 165_000);
    }

    #[tokio::test]
    async fn duplicate_view_is_rejected_once_recorded() {
        let store = make_store();
        store.register_campaign(draft("c1", 1_000_000, 10_000)).await;
        let delivery = serve(&store, "c1").await;

        assert!(store
            .record_impression(delivery.tracking_id, EventType::View, None)
            .await
            .is_some());
        assert!(store
            .record_impression(delivery.tracking_id, EventType::View, None)
            .await
            .is_none());

        let Some(campaign) = store.get_campaign("c1").await else {
            panic!("campaign missing");
        };
        assert_eq!(campaign.spent_amount, 1_000);
    }

    #[tokio::test]
    async fn unknown_tracking_id_is_benign() {
        let store = make_store();
        let result = store
            .record_impression(TrackingId::new(), EventType::Click, None)
            .await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn budget_exhaustion_transitions_to_empty_one_way() {
        let store = make_store();
        // Two clicks drain the budget exactly.
        store.register_campaign(draft("c1", 200_000, 100_000)).await;

        let d1 = serve(&store, "c1").await;
        assert!(store
            .record_impression(d1.tracking_id, EventType::Click, None)
            .await
            .is_some());

        let d2 = serve(&store, "c1").await;
        assert!(store
            .record_impression(d2.tracking_id, EventType::Click, None)
            .await
            .is_some());

        let Some(campaign) = store.get_campaign("c1").await else {
            panic!("campaign missing");
        };
        assert_eq!(campaign.status, CampaignStatus::Empty);
        assert_eq!(campaign.spent_amount, campaign.total_deposited);

        // Empty campaigns neither serve nor revive.
        assert!(store.create_delivery("c1", "0xpub").await.is_none());
        assert!(store.get_active_campaigns().await.is_empty());
    }

    #[tokio::test]
    async fn spend_never_exceeds_deposit() {
        let store = make_store();
        // One click would overshoot a partially drained budget.
        store.register_campaign(draft("c1", 150_000, 100_000)).await;

        let d1 = serve(&store, "c1").await;
        assert!(store
            .record_impression(d1.tracking_id, EventType::Click, None)
            .await
            .is_some());
        let d2 = serve(&store, "c1").await;
        assert!(store
            .record_impression(d2.tracking_id, EventType::Click, None)
            .await
            .is_some());

        let Some(campaign) = store.get_campaign("c1").await else {
            panic!("campaign missing");
        };
        assert!(campaign.spent_amount <= campaign.total_deposited);
        assert_eq!(campaign.status, CampaignStatus::Empty);
    }

    #[tokio::test]
    async fn active_filter_excludes_unaffordable_campaigns() {
        let store = make_store();
        store.register_campaign(draft("cheap", 1_000_000, 10_000)).await;
        // Remaining budget equals the bid exactly: excluded.
        store.register_campaign(draft("edge", 10_000, 10_000)).await;

        let active = store.get_active_campaigns().await;
        assert_eq!(active.len(), 1);
        assert!(active.iter().all(|c| c.id == "cheap"));
    }

    #[tokio::test]
    async fn claim_flow_advances_nonce_and_zeroes_claimable() {
        let store = make_store();
        store.register_campaign(draft("c1", 10_000_000, 150_000)).await;
        let delivery = serve(&store, "c1").await;
        let _ = store
            .record_impression(delivery.tracking_id, EventType::View, None)
            .await;
        let _ = store
            .record_impression(delivery.tracking_id, EventType::Click, None)
            .await;

        let claimable = store.claimable("0xpub").await;
        assert_eq!(claimable.amount, 165_000);
        assert_eq!(claimable.nonce, 0);

        store.mark_claimed("0xpub", 165_000).await;

        let after = store.claimable("0xpub").await;
        assert_eq!(after.amount, 0);
        assert_eq!(after.nonce, 1);
    }

    #[tokio::test]
    async fn bid_snapshot_survives_reregistration() {
        let store = make_store();
        store.register_campaign(draft("c1", 10_000_000, 100_000)).await;
        let delivery = serve(&store, "c1").await;

        // Advertiser re-registers with a different bid mid-flight.
        store.register_campaign(draft("c1", 10_000_000, 999_999)).await;

        let Some(click) = store
            .record_impression(delivery.tracking_id, EventType::Click, None)
            .await
        else {
            panic!("click should be accepted");
        };
        assert_eq!(click.cost, 100_000);
    }

    #[tokio::test]
    async fn reregistration_preserves_spend_history() {
        let store = make_store();
        store.register_campaign(draft("c1", 1_000_000, 100_000)).await;
        let delivery = serve(&store, "c1").await;
        let _ = store
            .record_impression(delivery.tracking_id, EventType::Click, None)
            .await;

        let reregistered = store.register_campaign(draft("c1", 1_000_000, 100_000)).await;
        assert_eq!(reregistered.spent_amount, 100_000);

        // A deposit smaller than the preserved spend lands as Empty.
        let drained = store.register_campaign(draft("c1", 50_000, 10_000)).await;
        assert_eq!(drained.status, CampaignStatus::Empty);
    }

    #[tokio::test]
    async fn publisher_summary_counts_events() {
        let store = make_store();
        store.register_campaign(draft("c1", 10_000_000, 100_000)).await;

        let d1 = serve(&store, "c1").await;
        let _ = store
            .record_impression(d1.tracking_id, EventType::View, None)
            .await;
        let d2 = serve(&store, "c1").await;
        let _ = store
            .record_impression(d2.tracking_id, EventType::Click, None)
            .await;

        let summary = store.publisher_summary("0xpub").await;
        assert_eq!(summary.total_ad_views, 1);
        assert_eq!(summary.total_clicks, 1);
        assert_eq!(summary.total_earnings, 110_000);
        assert_eq!(summary.available_to_claim, 110_000);
    }

    #[tokio::test]
    async fn stale_deliveries_are_evicted_but_fresh_ones_kept() {
        let store = make_store();
        store.register_campaign(draft("c1", 10_000_000, 100_000)).await;
        let _viewed = serve(&store, "c1").await;
        assert_eq!(store.pending_delivery_count().await, 1);

        // Nothing is old enough yet.
        assert_eq!(store.evict_stale_deliveries(Duration::from_secs(3600)).await, 0);
        assert_eq!(store.pending_delivery_count().await, 1);

        // With a zero TTL everything pending is stale.
        assert_eq!(store.evict_stale_deliveries(Duration::ZERO).await, 1);
        assert_eq!(store.pending_delivery_count().await, 0);
    }

    #[tokio::test]
    async fn counters_snapshot_round_trips_through_load() {
        let store = make_store();
        store.register_campaign(draft("c1", 10_000_000, 150_000)).await;
        let delivery = serve(&store, "c1").await;
        let _ = store
            .record_impression(delivery.tracking_id, EventType::Click, None)
            .await;
        store.mark_claimed("0xpub", 50_000).await;

        let snapshot = store.snapshot_counters().await;
        assert_eq!(snapshot.total_spent, 150_000);
        assert_eq!(snapshot.total_clicks, 1);

        // A fresh store with the campaigns loaded first merges the
        // counters into them by id and wallet.
        let restored = make_store();
        restored.load_campaigns(store.snapshot_campaigns().await).await;
        restored.load_counters(snapshot).await;

        let Some(campaign) = restored.get_campaign("c1").await else {
            panic!("campaign missing after load");
        };
        assert_eq!(campaign.spent_amount, 150_000);
        let claimable = restored.claimable("0xpub").await;
        assert_eq!(claimable.amount, 100_000);
        assert_eq!(claimable.nonce, 1);
    }

    #[tokio::test]
    async fn counters_for_unknown_campaigns_are_skipped() {
        let store = make_store();
        let mut snapshot = CountersSnapshot::default();
        snapshot.campaigns.insert(
            "ghost".to_string(),
            CampaignCounters {
                spent_amount: 42,
                status: CampaignStatus::Active,
            },
        );
        store.load_counters(snapshot).await;
        assert!(store.get_campaign("ghost").await.is_none());
    }

    #[tokio::test]
    async fn websites_enter_pending_and_filter_by_publisher() {
        let store = make_store();
        let site = store
            .add_website(NewWebsite {
                publisher_wallet: "0xpub".to_string(),
                name: "Example".to_string(),
                url: "https://example.com".to_string(),
                category: "tech".to_string(),
                monthly_visitors: 10_000,
            })
            .await;
        assert_eq!(site.status, WebsiteStatus::Pending);
        assert_eq!(site.daily_impressions, 0);

        let _ = store
            .add_website(NewWebsite {
                publisher_wallet: "0xother".to_string(),
                name: "Other".to_string(),
                url: "https://other.com".to_string(),
                category: "news".to_string(),
                monthly_visitors: 5,
            })
            .await;

        assert_eq!(store.list_websites(None).await.len(), 2);
        assert_eq!(store.list_websites(Some("0xpub")).await.len(), 1);
    }

    #[tokio::test]
    async fn mutations_publish_events() {
        let store = make_store();
        let mut rx = store.bus().subscribe();

        store.register_campaign(draft("c1", 10_000_000, 100_000)).await;
        let Ok(event) = rx.recv().await else {
            panic!("expected event");
        };
        assert_eq!(event.kind(), "campaign_registered");

        let delivery = serve(&store, "c1").await;
        let _ = store
            .record_impression(delivery.tracking_id, EventType::View, None)
            .await;
        let Ok(event) = rx.recv().await else {
            panic!("expected event");
        };
        assert_eq!(event.kind(), "impression_recorded");
    }
}
