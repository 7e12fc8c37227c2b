//! Latest-blob pointer persistence.
//!
//! One JSON document maps each dataset name to the latest [`Pointer`]
//! string so the engine can find its last known state without querying the
//! remote store speculatively. All datasets share the one file under
//! distinct keys; updates read-modify-write the whole document under a
//! mutex so concurrent dataset saves cannot lose each other's pointers.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tokio::sync::Mutex;

use super::dataset::Dataset;
use super::local::Pointer;

/// Persists the dataset-name → latest-pointer document.
#[derive(Debug)]
pub struct BlobPointerStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl BlobPointerStore {
    /// Creates a store backed by the pointer document at `path`.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        tracing::info!(path = %path.display(), "using blob pointer file");
        Self {
            path,
            guard: Mutex::new(()),
        }
    }

    async fn read_document(&self) -> BTreeMap<String, String> {
        match tokio::fs::read(&self.path).await {
            Ok(raw) => serde_json::from_slice(&raw).unwrap_or_default(),
            Err(_) => BTreeMap::new(),
        }
    }

    /// Loads the latest pointer recorded for a dataset, if any.
    pub async fn load(&self, dataset: Dataset) -> Option<Pointer> {
        let _guard = self.guard.lock().await;
        let document = self.read_document().await;
        let pointer = document.get(dataset.key()).and_then(|v| Pointer::parse(v));
        tracing::debug!(
            dataset = dataset.key(),
            pointer = %document.get(dataset.key()).map_or("(empty)", String::as_str),
            "loaded blob pointer"
        );
        pointer
    }

    /// Records the latest pointer for a dataset. Write failures are logged
    /// and swallowed: losing a pointer only costs a slower next load.
    pub async fn save(&self, dataset: Dataset, pointer: &Pointer) {
        let _guard = self.guard.lock().await;
        let mut document = self.read_document().await;
        let encoded = pointer.to_string();
        if document.get(dataset.key()).map(String::as_str) == Some(encoded.as_str()) {
            return;
        }
        document.insert(dataset.key().to_string(), encoded);

        let result: Result<(), std::io::Error> = async {
            if let Some(parent) = self.path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            let json = serde_json::to_vec_pretty(&document)?;
            tokio::fs::write(&self.path, json).await
        }
        .await;

        if let Err(err) = result {
            tracing::warn!(path = %self.path.display(), error = %err, "failed to write pointer file");
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn make_store(dir: &tempfile::TempDir) -> BlobPointerStore {
        BlobPointerStore::new(dir.path().join("pointers.json"))
    }

    #[tokio::test]
    async fn stores_and_retrieves_blob_ids() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let store = make_store(&dir);

        store
            .save(Dataset::Campaigns, &Pointer::Blob("BLOB_123".to_string()))
            .await;
        let loaded = store.load(Dataset::Campaigns).await;
        assert_eq!(loaded, Some(Pointer::Blob("BLOB_123".to_string())));
    }

    #[tokio::test]
    async fn datasets_use_distinct_keys_in_one_document() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let store = make_store(&dir);

        store
            .save(Dataset::Campaigns, &Pointer::Blob("CAMPAIGNS".to_string()))
            .await;
        store
            .save(Dataset::Counters, &Pointer::Blob("COUNTERS".to_string()))
            .await;
        store
            .save(
                Dataset::Websites,
                &Pointer::LocalFile(PathBuf::from("/tmp/websites.json")),
            )
            .await;

        assert_eq!(
            store.load(Dataset::Campaigns).await,
            Some(Pointer::Blob("CAMPAIGNS".to_string()))
        );
        assert_eq!(
            store.load(Dataset::Counters).await,
            Some(Pointer::Blob("COUNTERS".to_string()))
        );
        assert_eq!(
            store.load(Dataset::Websites).await,
            Some(Pointer::LocalFile(PathBuf::from("/tmp/websites.json")))
        );
    }

    #[tokio::test]
    async fn missing_document_loads_as_none() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let store = make_store(&dir);
        assert_eq!(store.load(Dataset::Counters).await, None);
    }
}
