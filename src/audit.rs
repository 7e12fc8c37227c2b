//! Impression audit logging: batched, append-only, non-authoritative.
//!
//! Accepted impressions are queued in memory and flushed to the blob store
//! as newline-delimited JSON batches, either when the queue reaches the
//! configured batch size or on the periodic flush tick. A failed upload
//! re-prepends the batch so nothing is lost, and arms a bounded
//! exponential backoff so a down store is not hammered. The audit trail is
//! secondary: losing queued records on a crash never corrupts accounting,
//! which is persisted separately per impression.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock, broadcast};
use utoipa::ToSchema;

use crate::config::AdsConfig;
use crate::domain::impression::Impression;
use crate::domain::state_bus::StateEvent;
use crate::walrus::{BlobStore, PutOptions};

/// First retry delay after a failed flush.
const BACKOFF_BASE: Duration = Duration::from_secs(2);

/// Upper bound on the retry delay.
const BACKOFF_MAX: Duration = Duration::from_secs(120);

/// Reference to the most recently flushed audit batch.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditPointer {
    /// Blob id of the latest batch.
    pub patch_id: String,
    /// On-chain object reference for the batch blob, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blob_object_id: Option<String>,
    /// When the batch was flushed.
    pub updated_at: DateTime<Utc>,
    /// Cumulative records flushed since startup.
    pub total_records: u64,
}

#[derive(Debug, Default)]
struct AuditQueue {
    queue: Vec<Impression>,
    consecutive_failures: u32,
    backoff_until: Option<Instant>,
}

/// Batched audit logger for accepted impressions.
#[derive(Debug)]
pub struct AuditLog<S: BlobStore> {
    remote: Arc<S>,
    batch_size: usize,
    inner: Mutex<AuditQueue>,
    flushing: AtomicBool,
    total_records: AtomicU64,
    pointer: RwLock<Option<AuditPointer>>,
}

impl<S: BlobStore> AuditLog<S> {
    /// Creates a batcher flushing to `remote`.
    #[must_use]
    pub fn new(remote: Arc<S>, config: &AdsConfig) -> Self {
        Self {
            remote,
            batch_size: config.audit_batch_size.max(1),
            inner: Mutex::new(AuditQueue::default()),
            flushing: AtomicBool::new(false),
            total_records: AtomicU64::new(0),
            pointer: RwLock::new(None),
        }
    }

    /// Queues an impression, flushing immediately once the batch is full.
    pub async fn enqueue(&self, impression: Impression) {
        let len = {
            let mut inner = self.inner.lock().await;
            inner.queue.push(impression);
            inner.queue.len()
        };
        if len >= self.batch_size {
            self.flush().await;
        }
    }

    /// Flushes the current queue as one batch blob.
    ///
    /// A no-op when the queue is empty, another flush is in progress, or a
    /// previous failure armed a backoff window that has not elapsed.
    pub async fn flush(&self) {
        if self.flushing.swap(true, Ordering::SeqCst) {
            return;
        }
        self.flush_locked().await;
        self.flushing.store(false, Ordering::SeqCst);
    }

    async fn flush_locked(&self) {
        let batch = {
            let mut inner = self.inner.lock().await;
            if inner.queue.is_empty() {
                return;
            }
            if let Some(until) = inner.backoff_until {
                if Instant::now() < until {
                    return;
                }
            }
            std::mem::take(&mut inner.queue)
        };

        let payload = encode_batch(&batch);
        let file_name = format!("impressions-{}.jsonl", Utc::now().timestamp_millis());
        let opts = PutOptions {
            content_type: "application/json".to_string(),
            file_name: Some(file_name),
        };

        match self.remote.put(payload, opts).await {
            Ok(stored) => {
                let total = self
                    .total_records
                    .fetch_add(batch.len() as u64, Ordering::SeqCst)
                    + batch.len() as u64;
                tracing::info!(records = batch.len(), total, blob_id = %stored.blob_id, "flushed audit batch");
                *self.pointer.write().await = Some(AuditPointer {
                    patch_id: stored.blob_id,
                    blob_object_id: stored.blob_object_id,
                    updated_at: Utc::now(),
                    total_records: total,
                });
                let mut inner = self.inner.lock().await;
                inner.consecutive_failures = 0;
                inner.backoff_until = None;
            }
            Err(err) => {
                tracing::error!(records = batch.len(), error = %err, "audit flush failed; batch retained");
                let mut inner = self.inner.lock().await;
                // Failed batch goes back in front so ordering survives;
                // records that arrived mid-flush stay behind it.
                let mut restored = batch;
                restored.append(&mut inner.queue);
                inner.queue = restored;
                inner.consecutive_failures = inner.consecutive_failures.saturating_add(1);
                let exponent = inner.consecutive_failures.saturating_sub(1).min(16);
                let delay = BACKOFF_BASE
                    .saturating_mul(1u32 << exponent)
                    .min(BACKOFF_MAX);
                inner.backoff_until = Some(Instant::now() + delay);
            }
        }
    }

    /// Number of impressions waiting for the next flush.
    pub async fn queue_len(&self) -> usize {
        self.inner.lock().await.queue.len()
    }

    /// Reference to the last successfully flushed batch.
    pub async fn pointer(&self) -> Option<AuditPointer> {
        self.pointer.read().await.clone()
    }

    /// Background worker: queues every accepted impression coming off the
    /// state bus. Lagged (dropped) events are logged and accepted — the
    /// audit trail is not authoritative.
    pub async fn run(self: Arc<Self>, mut rx: broadcast::Receiver<StateEvent>) {
        loop {
            match rx.recv().await {
                Ok(StateEvent::ImpressionRecorded { impression }) => {
                    self.enqueue(impression).await;
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "audit worker lagged; some impressions not audited");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    /// Periodic flush driver so partially filled batches still land within
    /// the configured interval.
    pub async fn run_flush_timer(self: Arc<Self>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(100)));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.flush().await;
        }
    }
}

/// Serializes a batch as newline-delimited JSON, one impression per line.
fn encode_batch(batch: &[Impression]) -> Vec<u8> {
    let mut out = Vec::new();
    for impression in batch {
        match serde_json::to_vec(impression) {
            Ok(line) => {
                out.extend_from_slice(&line);
                out.push(b'\n');
            }
            Err(err) => {
                tracing::warn!(error = %err, "skipping unserializable audit record");
            }
        }
    }
    out
}
