//! Persistence layer: local JSON snapshots, blob pointers, and the
//! per-dataset load/save orchestrator.
//!
//! Each logical dataset (campaigns, counters, websites) is persisted as one
//! JSON document. A save always lands on local disk first, then tries the
//! Walrus store as the durable cross-instance replica; a load tries local
//! first and falls back to the last known blob pointer. Remote failures
//! never propagate: the engine degrades to local-only durability.

pub mod dataset;
pub mod local;
pub mod models;
pub mod pointers;

pub use dataset::{Dataset, DatasetPersistence, StatePersistence};
pub use local::{LocalStateStore, Pointer};
pub use models::CountersSnapshot;
pub use pointers::BlobPointerStore;
