//! Domain layer: core types, the campaign/ledger store, and the event system.
//!
//! This module contains the server-side domain model: campaigns and
//! websites, pending deliveries with tracking identity, immutable
//! impression records, publisher earnings ledgers, the state bus for
//! broadcasting mutations, the ledger store that owns all mutable economic
//! state, and the pluggable campaign selection strategy.

pub mod campaign;
pub mod delivery;
pub mod impression;
pub mod ledger;
pub mod selection;
pub mod state_bus;
pub mod store;

pub use campaign::{Campaign, CampaignStatus, Website, WebsiteStatus};
pub use delivery::{PendingDelivery, TrackingId};
pub use impression::{EventType, Impression};
pub use ledger::{Claimable, PublisherLedger};
pub use selection::{HighestBid, SelectionStrategy, WeightedRandom};
pub use state_bus::{StateBus, StateEvent};
pub use store::LedgerStore;
