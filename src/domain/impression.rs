//! Immutable impression fact records and the cost attribution rule.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Kind of tracked ad event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// The creative was rendered in a widget.
    View,
    /// The creative was clicked through.
    Click,
}

impl EventType {
    /// Cost attributed for this event given the delivery's bid snapshot:
    /// a click costs the full bid, a view costs a tenth of it.
    #[must_use]
    pub const fn cost(self, cpc_bid: u64) -> u64 {
        match self {
            Self::Click => cpc_bid,
            Self::View => cpc_bid / 10,
        }
    }
}

/// Immutable record of one accepted view or click and its attributed cost.
///
/// Created exactly once per accepted tracking call, appended to the
/// in-memory log and to the external audit batch, and never mutated or
/// deleted afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Impression {
    /// Unique record identifier.
    pub id: uuid::Uuid,

    /// Campaign the cost was attributed to.
    pub campaign_id: String,

    /// Publisher credited with the earnings.
    pub publisher_wallet: String,

    /// View or click.
    pub event_type: EventType,

    /// Attributed cost in mist.
    pub cost: u64,

    /// Server-side event timestamp.
    pub timestamp: DateTime<Utc>,

    /// Client IP as reported by the HTTP layer, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<String>,
}

impl Impression {
    /// Creates a new impression record stamped with the current time.
    #[must_use]
    pub fn new(
        campaign_id: String,
        publisher_wallet: String,
        event_type: EventType,
        cost: u64,
        client_ip: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            campaign_id,
            publisher_wallet,
            event_type,
            cost,
            timestamp: Utc::now(),
            client_ip,
        }
    }
}
