//! The blob store contract consumed by persistence and audit logging.

use std::future::Future;

/// Upload options for a single blob.
#[derive(Debug, Clone)]
pub struct PutOptions {
    /// MIME type sent with the upload.
    pub content_type: String,
    /// Optional filename hint forwarded to the store.
    pub file_name: Option<String>,
}

impl PutOptions {
    /// Options for a JSON document upload.
    #[must_use]
    pub fn json(file_name: &str) -> Self {
        Self {
            content_type: "application/json".to_string(),
            file_name: Some(file_name.to_string()),
        }
    }
}

impl Default for PutOptions {
    fn default() -> Self {
        Self {
            content_type: "application/octet-stream".to_string(),
            file_name: None,
        }
    }
}

/// Result of a successful blob upload.
#[derive(Debug, Clone)]
pub struct StoredBlob {
    /// Content-addressed blob identifier.
    pub blob_id: String,
    /// On-chain object reference for the blob, when reported.
    pub blob_object_id: Option<String>,
    /// Stored size in bytes, when reported.
    pub size: Option<u64>,
    /// Retrieval URL composed from the aggregator endpoint.
    pub url: String,
}

/// Failures from the remote blob store.
#[derive(Debug, thiserror::Error)]
pub enum BlobStoreError {
    /// Payload rejected locally before any network call.
    #[error("payload of {size} bytes exceeds upload limit of {limit} bytes")]
    PayloadTooLarge {
        /// Actual payload size in bytes.
        size: usize,
        /// Configured maximum in bytes.
        limit: usize,
    },

    /// Network-level failure (connect, timeout, body read).
    #[error("blob store transport error: {0}")]
    Transport(String),

    /// The store answered with a non-success status.
    #[error("blob store request failed ({0})")]
    Status(u16),

    /// The store answered 2xx but the body was not the expected shape.
    #[error("unexpected blob store response: {0}")]
    InvalidResponse(String),
}

/// Remote content-addressable byte store.
///
/// Writes are retried a bounded number of times by the implementation;
/// reads are single-shot because callers fall back to local snapshots
/// rather than waiting on a slow remote.
pub trait BlobStore: Send + Sync + 'static {
    /// Uploads `payload` and returns its content-addressed identity.
    ///
    /// # Errors
    ///
    /// Returns [`BlobStoreError::PayloadTooLarge`] before any network call
    /// for oversized payloads, otherwise a transport, status, or response
    /// error after retries are exhausted.
    fn put(
        &self,
        payload: Vec<u8>,
        opts: PutOptions,
    ) -> impl Future<Output = Result<StoredBlob, BlobStoreError>> + Send;

    /// Fetches a blob's raw bytes by identifier.
    ///
    /// # Errors
    ///
    /// Returns a transport or status error on failure; callers fall back
    /// to their local snapshot instead of retrying.
    fn get(&self, blob_id: &str) -> impl Future<Output = Result<Vec<u8>, BlobStoreError>> + Send;
}
