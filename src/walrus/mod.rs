//! Walrus blob store layer: the [`BlobStore`] seam and its HTTP client.
//!
//! [`BlobStore`] is the trait every durable-upload consumer (persistence
//! orchestrator, audit batcher) is written against; [`WalrusClient`] is the
//! production implementation over the Walrus publisher/aggregator HTTP API.
//! Tests substitute in-memory or always-failing stores to exercise the
//! fallback chain without a network.

pub mod client;
pub mod store;

pub use client::WalrusClient;
pub use store::{BlobStore, BlobStoreError, PutOptions, StoredBlob};
