//! Per-dataset load/save orchestration with graceful degradation.
//!
//! Load precedence: local snapshot file, then the last known pointer
//! (in-memory cache, pointer document, statically configured blob id), and
//! only then a remote fetch with self-healing local write-back. Every
//! failure degrades to "no state" — absence is a valid first-run outcome
//! and never an error.
//!
//! Save precedence: local snapshot first (the one step that must not
//! fail), then a best-effort remote upload. When the remote store is
//! unreachable the recorded pointer marks the just-written local file so
//! the next load never attempts a doomed fetch.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::{RwLock, broadcast};

use super::local::{LocalStateStore, Pointer, is_empty_snapshot};
use super::pointers::BlobPointerStore;
use crate::config::AdsConfig;
use crate::domain::state_bus::StateEvent;
use crate::domain::store::LedgerStore;
use crate::error::AdsError;
use crate::walrus::{BlobStore, PutOptions};

/// Logical dataset identity shared by pointer keys and snapshot files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    /// All campaign records.
    Campaigns,
    /// Ledger counters (campaign spend, publisher earnings/claims/nonces).
    Counters,
    /// Publisher-submitted websites.
    Websites,
}

impl Dataset {
    /// Key inside the pointer document.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Campaigns => "campaigns",
            Self::Counters => "counters",
            Self::Websites => "websites",
        }
    }

    /// Snapshot file name inside the local state directory.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Campaigns => "campaigns.json",
            Self::Counters => "counters.json",
            Self::Websites => "websites.json",
        }
    }
}

/// Load/save protocol for one dataset.
#[derive(Debug)]
pub struct DatasetPersistence<S: BlobStore> {
    dataset: Dataset,
    local: LocalStateStore,
    pointers: Arc<BlobPointerStore>,
    remote: Arc<S>,
    static_blob_id: Option<String>,
    latest: RwLock<Option<Pointer>>,
}

impl<S: BlobStore> DatasetPersistence<S> {
    /// Creates the orchestrator for one dataset.
    #[must_use]
    pub fn new(
        dataset: Dataset,
        local: LocalStateStore,
        pointers: Arc<BlobPointerStore>,
        remote: Arc<S>,
        static_blob_id: Option<String>,
    ) -> Self {
        Self {
            dataset,
            local,
            pointers,
            remote,
            static_blob_id,
            latest: RwLock::new(None),
        }
    }

    /// The last pointer this instance knows about, resolving the pointer
    /// document or static configuration on first use.
    pub async fn latest_pointer(&self) -> Option<Pointer> {
        self.resolve_pointer().await
    }

    async fn resolve_pointer(&self) -> Option<Pointer> {
        if let Some(cached) = self.latest.read().await.clone() {
            return Some(cached);
        }
        let resolved = match self.pointers.load(self.dataset).await {
            Some(pointer) => Some(pointer),
            None => self.static_blob_id.clone().map(Pointer::Blob),
        };
        if let Some(pointer) = &resolved {
            *self.latest.write().await = Some(pointer.clone());
        }
        resolved
    }

    /// Loads the dataset following the fixed precedence order. Returns
    /// `None` when no copy exists anywhere or every copy is unreadable.
    pub async fn load<T: DeserializeOwned>(&self) -> Option<T> {
        // Local snapshot first: always available, never slow.
        if let Some(value) = self.local.load_value(self.dataset.file_name()).await {
            if !is_empty_snapshot(&value) {
                match serde_json::from_value(value) {
                    Ok(parsed) => {
                        tracing::debug!(dataset = self.dataset.key(), "loaded from local snapshot");
                        return Some(parsed);
                    }
                    Err(err) => {
                        tracing::warn!(
                            dataset = self.dataset.key(),
                            error = %err,
                            "local snapshot has unexpected shape"
                        );
                    }
                }
            }
        }

        let pointer = self.resolve_pointer().await?;
        match pointer {
            Pointer::LocalFile(path) => {
                let value = self.local.load_value_path(&path).await?;
                serde_json::from_value(value).ok()
            }
            Pointer::Blob(blob_id) => match self.remote.get(&blob_id).await {
                Ok(bytes) => {
                    let value: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
                    let parsed: T = serde_json::from_value(value.clone()).ok()?;
                    // Self-healing cache: mirror the remote copy locally so
                    // the next load never needs the network.
                    if let Err(err) = self.local.save(self.dataset.file_name(), &value).await {
                        tracing::warn!(
                            dataset = self.dataset.key(),
                            error = %err,
                            "failed to mirror remote snapshot locally"
                        );
                    }
                    tracing::info!(dataset = self.dataset.key(), blob_id = %blob_id, "restored from remote store");
                    Some(parsed)
                }
                Err(err) => {
                    tracing::warn!(dataset = self.dataset.key(), error = %err, "remote read failed");
                    None
                }
            },
        }
    }

    /// Saves the dataset: local snapshot first, then best-effort remote
    /// upload. Remote failures are recorded as a local-file pointer and
    /// never propagated.
    ///
    /// # Errors
    ///
    /// Returns [`AdsError::Persistence`] only when the local snapshot
    /// write fails — without it the save provides no durability at all.
    pub async fn save<T: Serialize + Sync + ?Sized>(&self, value: &T) -> Result<(), AdsError> {
        let path = self
            .local
            .save(self.dataset.file_name(), value)
            .await
            .map_err(|e| AdsError::Persistence(format!("{}: {e}", self.dataset.key())))?;

        let pointer = match serde_json::to_vec(value) {
            Ok(payload) => {
                match self
                    .remote
                    .put(payload, PutOptions::json(self.dataset.file_name()))
                    .await
                {
                    Ok(stored) => {
                        tracing::debug!(
                            dataset = self.dataset.key(),
                            blob_id = %stored.blob_id,
                            "uploaded snapshot to remote store"
                        );
                        Pointer::Blob(stored.blob_id)
                    }
                    Err(err) => {
                        tracing::warn!(
                            dataset = self.dataset.key(),
                            error = %err,
                            "remote store failed, fell back to local file"
                        );
                        Pointer::LocalFile(path)
                    }
                }
            }
            Err(err) => {
                tracing::warn!(dataset = self.dataset.key(), error = %err, "snapshot serialization failed");
                Pointer::LocalFile(path)
            }
        };

        *self.latest.write().await = Some(pointer.clone());
        self.pointers.save(self.dataset, &pointer).await;
        Ok(())
    }
}

/// Bundles the three dataset orchestrators and drives them from the
/// [`StateBus`](crate::domain::StateBus) as a background worker.
#[derive(Debug)]
pub struct StatePersistence<S: BlobStore> {
    campaigns: DatasetPersistence<S>,
    counters: DatasetPersistence<S>,
    websites: DatasetPersistence<S>,
}

impl<S: BlobStore> StatePersistence<S> {
    /// Wires the three datasets against shared local, pointer, and remote
    /// stores.
    #[must_use]
    pub fn new(
        local: LocalStateStore,
        pointers: Arc<BlobPointerStore>,
        remote: Arc<S>,
        config: &AdsConfig,
    ) -> Self {
        Self {
            campaigns: DatasetPersistence::new(
                Dataset::Campaigns,
                local.clone(),
                Arc::clone(&pointers),
                Arc::clone(&remote),
                config.campaigns_blob_id.clone(),
            ),
            counters: DatasetPersistence::new(
                Dataset::Counters,
                local.clone(),
                Arc::clone(&pointers),
                Arc::clone(&remote),
                config.counters_blob_id.clone(),
            ),
            websites: DatasetPersistence::new(
                Dataset::Websites,
                local,
                pointers,
                remote,
                config.websites_blob_id.clone(),
            ),
        }
    }

    /// Loads the campaigns dataset.
    pub async fn load_campaigns(&self) -> Option<Vec<crate::domain::Campaign>> {
        self.campaigns.load().await
    }

    /// Loads the counters dataset.
    pub async fn load_counters(&self) -> Option<super::models::CountersSnapshot> {
        self.counters.load().await
    }

    /// Loads the websites dataset.
    pub async fn load_websites(&self) -> Option<Vec<crate::domain::Website>> {
        self.websites.load().await
    }

    /// Latest pointer per dataset, for the status endpoint.
    pub async fn dataset_pointers(&self) -> (Option<Pointer>, Option<Pointer>, Option<Pointer>) {
        (
            self.campaigns.latest_pointer().await,
            self.counters.latest_pointer().await,
            self.websites.latest_pointer().await,
        )
    }

    /// Persists every dataset from current store state, logging failures.
    pub async fn persist_all(&self, store: &LedgerStore) {
        self.save_campaigns(store).await;
        self.save_counters(store).await;
        self.save_websites(store).await;
    }

    async fn save_campaigns(&self, store: &LedgerStore) {
        let snapshot = store.snapshot_campaigns().await;
        if let Err(err) = self.campaigns.save(snapshot.as_slice()).await {
            tracing::error!(error = %err, "failed to persist campaigns");
        }
    }

    async fn save_counters(&self, store: &LedgerStore) {
        let snapshot = store.snapshot_counters().await;
        if let Err(err) = self.counters.save(&snapshot).await {
            tracing::error!(error = %err, "failed to persist counters");
        }
    }

    async fn save_websites(&self, store: &LedgerStore) {
        let snapshot = store.snapshot_websites().await;
        if let Err(err) = self.websites.save(snapshot.as_slice()).await {
            tracing::error!(error = %err, "failed to persist websites");
        }
    }

    /// Background worker: applies every state event to the matching
    /// dataset saves. On lag the worker resynchronizes everything rather
    /// than guessing which events were dropped.
    pub async fn run(
        self: Arc<Self>,
        store: Arc<LedgerStore>,
        mut rx: broadcast::Receiver<StateEvent>,
    ) {
        loop {
            match rx.recv().await {
                Ok(event) => self.handle(&store, &event).await,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "persistence worker lagged; resyncing all datasets");
                    self.persist_all(&store).await;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    async fn handle(&self, store: &LedgerStore, event: &StateEvent) {
        match event {
            StateEvent::CampaignRegistered { .. } | StateEvent::ImpressionRecorded { .. } => {
                self.save_campaigns(store).await;
                self.save_counters(store).await;
            }
            StateEvent::ClaimAuthorized { .. } => self.save_counters(store).await,
            StateEvent::WebsiteAdded { .. } => self.save_websites(store).await,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::sync::Mutex;

    use crate::walrus::{BlobStoreError, StoredBlob};

    /// In-memory blob store standing in for a healthy Walrus.
    #[derive(Debug, Default)]
    struct MemoryStore {
        blobs: Mutex<HashMap<String, Vec<u8>>>,
        counter: AtomicU32,
    }

    impl MemoryStore {
        async fn preload(&self, blob_id: &str, payload: Vec<u8>) {
            self.blobs.lock().await.insert(blob_id.to_string(), payload);
        }
    }

    impl BlobStore for MemoryStore {
        async fn put(
            &self,
            payload: Vec<u8>,
            _opts: PutOptions,
        ) -> Result<StoredBlob, BlobStoreError> {
            let n = self.counter.fetch_add(1, Ordering::SeqCst);
            let blob_id = format!("MEM_{n}");
            let size = payload.len() as u64;
            self.blobs.lock().await.insert(blob_id.clone(), payload);
            Ok(StoredBlob {
                url: format!("memory://{blob_id}"),
                blob_id,
                blob_object_id: None,
                size: Some(size),
            })
        }

        async fn get(&self, blob_id: &str) -> Result<Vec<u8>, BlobStoreError> {
            self.blobs
                .lock()
                .await
                .get(blob_id)
                .cloned()
                .ok_or(BlobStoreError::Status(404))
        }
    }

    /// Blob store standing in for an unreachable Walrus.
    #[derive(Debug, Default)]
    struct FailingStore;

    impl BlobStore for FailingStore {
        async fn put(
            &self,
            _payload: Vec<u8>,
            _opts: PutOptions,
        ) -> Result<StoredBlob, BlobStoreError> {
            Err(BlobStoreError::Transport("network down".to_string()))
        }

        async fn get(&self, _blob_id: &str) -> Result<Vec<u8>, BlobStoreError> {
            Err(BlobStoreError::Transport("network down".to_string()))
        }
    }

    fn make_dataset<S: BlobStore>(
        dir: &tempfile::TempDir,
        remote: Arc<S>,
        static_blob_id: Option<String>,
    ) -> DatasetPersistence<S> {
        DatasetPersistence::new(
            Dataset::Campaigns,
            LocalStateStore::new(dir.path().join("state")),
            Arc::new(BlobPointerStore::new(dir.path().join("pointers.json"))),
            remote,
            static_blob_id,
        )
    }

    #[tokio::test]
    async fn round_trips_through_local_fallback_when_remote_is_down() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let dataset = make_dataset(&dir, Arc::new(FailingStore), None);

        let data = vec!["offline".to_string()];
        let Ok(()) = dataset.save(data.as_slice()).await else {
            panic!("save must succeed on local durability alone");
        };

        // The recorded pointer marks the local file, not a blob.
        let Some(Pointer::LocalFile(path)) = dataset.latest_pointer().await else {
            panic!("expected a local-file pointer");
        };
        assert!(path.ends_with("campaigns.json"));

        let loaded: Option<Vec<String>> = dataset.load().await;
        assert_eq!(loaded, Some(data));
    }

    #[tokio::test]
    async fn successful_save_records_blob_pointer() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let dataset = make_dataset(&dir, Arc::new(MemoryStore::default()), None);

        let Ok(()) = dataset.save(&vec!["online".to_string()]).await else {
            panic!("save failed");
        };
        let Some(Pointer::Blob(blob_id)) = dataset.latest_pointer().await else {
            panic!("expected a blob pointer");
        };
        assert!(blob_id.starts_with("MEM_"));
    }

    #[tokio::test]
    async fn load_falls_back_to_remote_and_self_heals_local_cache() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let remote = Arc::new(MemoryStore::default());
        {
            // A previous instance saved remotely and recorded the pointer.
            let dataset = make_dataset(&dir, Arc::clone(&remote), None);
            let Ok(()) = dataset.save(&vec!["replicated".to_string()]).await else {
                panic!("save failed");
            };
        }

        // Simulate a fresh host: the local snapshot is gone, only the
        // pointer document and remote copy survive.
        let local_file = dir.path().join("state").join("campaigns.json");
        let Ok(()) = std::fs::remove_file(&local_file) else {
            panic!("local snapshot should exist");
        };

        let dataset = make_dataset(&dir, remote, None);
        let loaded: Option<Vec<String>> = dataset.load().await;
        assert_eq!(loaded, Some(vec!["replicated".to_string()]));

        // The remote copy was mirrored back to disk.
        assert!(local_file.exists());
    }

    #[tokio::test]
    async fn statically_configured_blob_id_bootstraps_first_load() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let remote = Arc::new(MemoryStore::default());
        remote
            .preload("BOOT_BLOB", serde_json::to_vec(&vec!["seeded"]).unwrap_or_default())
            .await;

        let dataset = make_dataset(&dir, remote, Some("BOOT_BLOB".to_string()));
        let loaded: Option<Vec<String>> = dataset.load().await;
        assert_eq!(loaded, Some(vec!["seeded".to_string()]));
    }

    #[tokio::test]
    async fn local_snapshot_wins_over_remote_replica() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let remote = Arc::new(MemoryStore::default());
        let dataset = make_dataset(&dir, Arc::clone(&remote), None);

        let Ok(()) = dataset.save(&vec!["v1".to_string()]).await else {
            panic!("save failed");
        };
        // Local snapshot advances past the remote copy.
        let local = LocalStateStore::new(dir.path().join("state"));
        let Ok(_) = local.save("campaigns.json", &vec!["v2".to_string()]).await else {
            panic!("local save failed");
        };

        let loaded: Option<Vec<String>> = dataset.load().await;
        assert_eq!(loaded, Some(vec!["v2".to_string()]));
    }

    #[tokio::test]
    async fn absent_everything_loads_as_none() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let dataset = make_dataset(&dir, Arc::new(FailingStore), None);
        let loaded: Option<Vec<String>> = dataset.load().await;
        assert_eq!(loaded, None);
    }

    #[tokio::test]
    async fn empty_local_array_falls_through_to_pointer() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let remote = Arc::new(MemoryStore::default());
        remote
            .preload("REAL_DATA", serde_json::to_vec(&vec!["real"]).unwrap_or_default())
            .await;

        let local = LocalStateStore::new(dir.path().join("state"));
        let Ok(_) = local.save("campaigns.json", &Vec::<String>::new()).await else {
            panic!("local save failed");
        };

        let dataset = make_dataset(&dir, remote, Some("REAL_DATA".to_string()));
        let loaded: Option<Vec<String>> = dataset.load().await;
        assert_eq!(loaded, Some(vec!["real".to_string()]));
    }

    #[tokio::test]
    async fn persist_all_round_trips_store_state() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let local = LocalStateStore::new(dir.path().join("state"));
        let pointers = Arc::new(BlobPointerStore::new(dir.path().join("pointers.json")));
        let remote = Arc::new(FailingStore);
        let config = test_config(dir.path().to_path_buf());
        let persistence = StatePersistence::new(local, pointers, remote, &config);

        let store = LedgerStore::new(crate::domain::StateBus::new(16));
        let _ = store
            .register_campaign(crate::domain::store::RegisterCampaign {
                id: "c1".to_string(),
                chain_object_id: None,
                advertiser_wallet: "0xadv".to_string(),
                total_deposited: 1_000_000,
                cpc_bid: 10_000,
                image_url: None,
                target_url: None,
                status: None,
            })
            .await;
        persistence.persist_all(&store).await;

        let restored = LedgerStore::new(crate::domain::StateBus::new(16));
        let Some(campaigns) = persistence.load_campaigns().await else {
            panic!("campaigns should round-trip");
        };
        restored.load_campaigns(campaigns).await;
        if let Some(counters) = persistence.load_counters().await {
            restored.load_counters(counters).await;
        }
        assert!(restored.get_campaign("c1").await.is_some());
    }

    fn test_config(dir: PathBuf) -> AdsConfig {
        AdsConfig {
            listen_addr: "127.0.0.1:0".parse().unwrap_or_else(|_| {
                panic!("valid socket addr");
            }),
            walrus: crate::config::WalrusConfig {
                publisher_url: "https://publisher.example".to_string(),
                aggregator_url: "https://aggregator.example".to_string(),
                epochs: 1,
                deletable: false,
                max_upload_bytes: 1024,
                request_timeout: std::time::Duration::from_millis(50),
                retry_count: 0,
            },
            campaigns_blob_id: None,
            counters_blob_id: None,
            websites_blob_id: None,
            local_state_dir: dir.join("state"),
            pointers_path: dir.join("pointers.json"),
            admin_private_key_base64: None,
            admin_public_key_base64: None,
            delivery_ttl: std::time::Duration::from_secs(3600),
            audit_batch_size: 50,
            audit_flush_interval: std::time::Duration::from_secs(10),
            event_bus_capacity: 64,
        }
    }
}
