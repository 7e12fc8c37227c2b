//! # coral-ads
//!
//! Ad-serving and settlement engine for a Walrus-backed Web3 advertising
//! network.
//!
//! Advertisers fund campaigns on a blockchain escrow; this service selects
//! and serves ad creatives to embedded website widgets, records deduplicated
//! view/click events, attributes cost to campaigns, accrues publisher
//! earnings, and issues ed25519-signed withdrawal authorizations that the
//! on-chain escrow module verifies byte-for-byte. Durable state survives
//! restarts by falling back across the Walrus content-addressable store and
//! local disk snapshots.
//!
//! ## Architecture
//!
//! ```text
//! Clients (widget loader, dashboards)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── LedgerStore + SelectionStrategy (domain/)
//!     ├── ClaimSigner (signing)
//!     │
//!     ├── StateBus (domain/)
//!     │     ├── StatePersistence worker (persistence/)
//!     │     └── AuditLog batcher (audit)
//!     │
//!     └── Walrus blob store (walrus/) + local disk fallback
//! ```

pub mod api;
pub mod app_state;
pub mod audit;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod signing;
pub mod walrus;
