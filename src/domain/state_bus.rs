//! Broadcast channel for state mutation events.
//!
//! [`StateBus`] wraps a [`tokio::sync::broadcast`] channel. Every economic
//! mutation on the ledger store publishes a [`StateEvent`], and background
//! subscribers (the persistence worker and the audit batcher) react without
//! blocking the request path. This is the explicit durability hook: tests
//! drive the same components directly for deterministic flushes.

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use super::impression::Impression;

/// Event emitted after every economic state mutation.
#[derive(Debug, Clone)]
pub enum StateEvent {
    /// A campaign was registered or re-registered.
    CampaignRegistered {
        /// Campaign identifier.
        campaign_id: String,
        /// Registration timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A view or click was accepted and attributed.
    ImpressionRecorded {
        /// The appended fact record.
        impression: Impression,
    },

    /// A withdrawal authorization was issued for a publisher.
    ClaimAuthorized {
        /// Publisher wallet.
        publisher_wallet: String,
        /// Authorized amount in mist.
        amount: u64,
        /// Nonce the authorization was signed under.
        nonce: u64,
        /// Authorization timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A website was submitted by a publisher.
    WebsiteAdded {
        /// Website identifier.
        website_id: String,
        /// Submission timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl StateEvent {
    /// Short discriminator string for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::CampaignRegistered { .. } => "campaign_registered",
            Self::ImpressionRecorded { .. } => "impression_recorded",
            Self::ClaimAuthorized { .. } => "claim_authorized",
            Self::WebsiteAdded { .. } => "website_added",
        }
    }
}

/// Broadcast bus for [`StateEvent`]s.
///
/// Backed by a `tokio::broadcast` channel with a configurable capacity.
/// When the ring buffer is full, the oldest events are dropped for lagging
/// receivers; the persistence worker recovers from lag with a full resync.
#[derive(Debug, Clone)]
pub struct StateBus {
    sender: broadcast::Sender<StateEvent>,
}

impl StateBus {
    /// Creates a new `StateBus` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of receivers that received the event. If there
    /// are no active receivers, the event is silently dropped.
    pub fn publish(&self, event: StateEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Creates a new receiver that will receive all future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.sender.subscribe()
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
