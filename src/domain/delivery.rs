//! Delivery tracking identity and pending delivery records.
//!
//! [`TrackingId`] is a newtype wrapper around [`uuid::Uuid`] (v4) providing
//! type safety so that tracking tokens cannot be confused with other UUIDs.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::impression::EventType;

/// Opaque tracking token handed to the widget on every serve.
///
/// Wraps a UUID v4. Generated once at serve time and immutable thereafter.
/// Used as the dictionary key for pending deliveries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackingId(uuid::Uuid);

impl TrackingId {
    /// Creates a new random `TrackingId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Parses a tracking id from its string form.
    ///
    /// Returns `None` for anything that is not a valid UUID — such tokens
    /// cannot belong to any pending delivery.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        uuid::Uuid::parse_str(value).ok().map(Self)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for TrackingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TrackingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One serve-to-tracking window awaiting view/click events.
///
/// The `cpc_bid` is a snapshot taken at serve time; later bid changes never
/// retroactively affect in-flight deliveries. Each completion flag
/// transitions false→true at most once. The record is retained after a view
/// so a later click on the same tracking id still matches, and is deleted
/// once a click (the terminal event) is recorded.
#[derive(Debug, Clone)]
pub struct PendingDelivery {
    /// Tracking token for this delivery.
    pub tracking_id: TrackingId,

    /// Campaign the creative belongs to.
    pub campaign_id: String,

    /// Publisher credited for events on this delivery.
    pub publisher_wallet: String,

    /// Bid snapshot in mist at serve time.
    pub cpc_bid: u64,

    /// Whether a view event has been recorded.
    pub view_recorded: bool,

    /// Whether a click event has been recorded.
    pub click_recorded: bool,

    /// Serve timestamp, used by the stale-delivery sweep.
    pub created_at: DateTime<Utc>,
}

impl PendingDelivery {
    /// Creates a fresh delivery with both completion flags clear.
    #[must_use]
    pub fn new(campaign_id: String, publisher_wallet: String, cpc_bid: u64) -> Self {
        Self {
            tracking_id: TrackingId::new(),
            campaign_id,
            publisher_wallet,
            cpc_bid,
            view_recorded: false,
            click_recorded: false,
            created_at: Utc::now(),
        }
    }

    /// Returns `true` if the given event type was already recorded.
    #[must_use]
    pub fn already_recorded(&self, event_type: EventType) -> bool {
        match event_type {
            EventType::View => self.view_recorded,
            EventType::Click => self.click_recorded,
        }
    }
}
