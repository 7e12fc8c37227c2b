//! HTTP client for the Walrus publisher/aggregator API.
//!
//! Writes go to `PUT {publisher}/v1/blobs?epochs=N&deletable=B` and are
//! retried with a fresh timeout window per attempt; reads come from
//! `GET {aggregator}/v1/blobs/{id}` in a single bounded attempt. Payloads
//! over the configured size limit are rejected before any network call.

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::Deserialize;

use super::store::{BlobStore, BlobStoreError, PutOptions, StoredBlob};
use crate::config::WalrusConfig;

const USER_AGENT_VALUE: &str = concat!("coral-ads/", env!("CARGO_PKG_VERSION"));

/// Filename hint header understood by Walrus publishers.
const FILE_NAME_HEADER: &str = "x-file-name";

/// Walrus blob store client.
#[derive(Debug, Clone)]
pub struct WalrusClient {
    http: reqwest::Client,
    config: WalrusConfig,
}

/// Store response body: exactly one of the two branches is present.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreResponse {
    newly_created: Option<NewlyCreated>,
    already_certified: Option<AlreadyCertified>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewlyCreated {
    blob_object: Option<BlobObject>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlobObject {
    id: Option<String>,
    blob_id: Option<String>,
    size: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlreadyCertified {
    blob_id: Option<String>,
    blob_object: Option<CertifiedObject>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CertifiedObject {
    id: Option<String>,
}

impl WalrusClient {
    /// Creates a client with the given connection settings.
    #[must_use]
    pub fn new(config: WalrusConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Builds the aggregator retrieval URL for a blob id.
    #[must_use]
    pub fn blob_url(&self, blob_id: &str) -> String {
        build_blob_url(&self.config.aggregator_url, blob_id)
    }

    async fn put_once(
        &self,
        payload: &[u8],
        opts: &PutOptions,
    ) -> Result<StoredBlob, BlobStoreError> {
        let publisher = self.config.publisher_url.trim_end_matches('/');
        let url = format!(
            "{publisher}/v1/blobs?epochs={}&deletable={}",
            self.config.epochs, self.config.deletable
        );

        let mut request = self
            .http
            .put(url)
            .timeout(self.config.request_timeout)
            .header(USER_AGENT, USER_AGENT_VALUE)
            .header(CONTENT_TYPE, &opts.content_type)
            .body(payload.to_vec());
        if let Some(file_name) = &opts.file_name {
            request = request.header(FILE_NAME_HEADER, file_name);
        }

        let response = request
            .send()
            .await
            .map_err(|e| BlobStoreError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(BlobStoreError::Status(response.status().as_u16()));
        }

        let body: StoreResponse = response
            .json()
            .await
            .map_err(|e| BlobStoreError::InvalidResponse(e.to_string()))?;
        parse_store_response(body, &self.config.aggregator_url)
    }
}

impl BlobStore for WalrusClient {
    async fn put(
        &self,
        payload: Vec<u8>,
        opts: PutOptions,
    ) -> Result<StoredBlob, BlobStoreError> {
        if payload.len() > self.config.max_upload_bytes {
            return Err(BlobStoreError::PayloadTooLarge {
                size: payload.len(),
                limit: self.config.max_upload_bytes,
            });
        }

        let mut last_error = BlobStoreError::Transport("no attempt made".to_string());
        for attempt in 0..=self.config.retry_count {
            match self.put_once(&payload, &opts).await {
                Ok(stored) => return Ok(stored),
                Err(err) => {
                    tracing::warn!(attempt, error = %err, "walrus upload attempt failed");
                    last_error = err;
                }
            }
        }
        Err(last_error)
    }

    async fn get(&self, blob_id: &str) -> Result<Vec<u8>, BlobStoreError> {
        let url = self.blob_url(blob_id);
        let response = self
            .http
            .get(url)
            .timeout(self.config.request_timeout)
            .header(USER_AGENT, USER_AGENT_VALUE)
            .send()
            .await
            .map_err(|e| BlobStoreError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(BlobStoreError::Status(response.status().as_u16()));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| BlobStoreError::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

fn build_blob_url(aggregator_url: &str, blob_id: &str) -> String {
    format!("{}/v1/blobs/{blob_id}", aggregator_url.trim_end_matches('/'))
}

fn parse_store_response(
    body: StoreResponse,
    aggregator_url: &str,
) -> Result<StoredBlob, BlobStoreError> {
    if let Some(created) = body.newly_created.and_then(|c| c.blob_object) {
        if let Some(blob_id) = created.blob_id {
            return Ok(StoredBlob {
                url: build_blob_url(aggregator_url, &blob_id),
                blob_id,
                blob_object_id: created.id,
                size: created.size,
            });
        }
    }
    if let Some(existing) = body.already_certified {
        if let Some(blob_id) = existing.blob_id {
            return Ok(StoredBlob {
                url: build_blob_url(aggregator_url, &blob_id),
                blob_id,
                blob_object_id: existing.blob_object.and_then(|o| o.id),
                size: None,
            });
        }
    }
    Err(BlobStoreError::InvalidResponse("missing blobId".to_string()))
}
