//! Local disk snapshots: the resilience backstop when Walrus is
//! unreachable.
//!
//! Every dataset is mirrored as one pretty-printed JSON file under the
//! configured state directory. [`Pointer`] captures where the latest copy
//! of a dataset lives: a Walrus blob id, or a `file:`-prefixed local path
//! recorded when a save had to fall back to disk.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Prefix marking a pointer that references a local file instead of a blob.
const FILE_PREFIX: &str = "file:";

/// Location of the latest persisted copy of a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pointer {
    /// Content-addressed blob in the remote store.
    Blob(String),
    /// Local snapshot file written when the remote store was unreachable.
    LocalFile(PathBuf),
}

impl Pointer {
    /// Parses the persisted string form. Empty strings mean "no pointer".
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        if value.is_empty() {
            return None;
        }
        match value.strip_prefix(FILE_PREFIX) {
            Some(path) => Some(Self::LocalFile(PathBuf::from(path))),
            None => Some(Self::Blob(value.to_string())),
        }
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blob(id) => write!(f, "{id}"),
            Self::LocalFile(path) => write!(f, "{FILE_PREFIX}{}", path.display()),
        }
    }
}

/// Reads and writes dataset snapshot files under one directory.
#[derive(Debug, Clone)]
pub struct LocalStateStore {
    dir: PathBuf,
}

impl LocalStateStore {
    /// Creates a store rooted at `dir`. The directory is created lazily on
    /// the first save.
    #[must_use]
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Absolute-ish path of a snapshot file inside the state directory.
    #[must_use]
    pub fn path_of(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Writes `value` as pretty JSON, creating the directory if needed.
    /// Returns the path written, for recording as a file pointer.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O or serialization error; saving locally is
    /// the one persistence step that must not fail silently.
    pub async fn save<T: Serialize + Sync + ?Sized>(
        &self,
        file_name: &str,
        value: &T,
    ) -> Result<PathBuf, std::io::Error> {
        let path = self.path_of(file_name);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(value)?;
        tokio::fs::write(&path, json).await?;
        tracing::debug!(path = %path.display(), "saved local snapshot");
        Ok(path)
    }

    /// Loads a raw JSON document from the state directory. Missing or
    /// unparsable files yield `None`; absence is a valid first-run state.
    pub async fn load_value(&self, file_name: &str) -> Option<serde_json::Value> {
        self.load_value_path(&self.path_of(file_name)).await
    }

    /// Loads a raw JSON document from an explicit path (file pointers).
    pub async fn load_value_path(&self, path: &Path) -> Option<serde_json::Value> {
        let raw = tokio::fs::read(path).await.ok()?;
        match serde_json::from_slice(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "local snapshot is not valid JSON");
                None
            }
        }
    }

    /// Loads and deserializes a snapshot file.
    pub async fn load<T: DeserializeOwned>(&self, file_name: &str) -> Option<T> {
        let value = self.load_value(file_name).await?;
        serde_json::from_value(value).ok()
    }
}

/// Returns `true` for documents that carry no state: JSON `null`, an empty
/// array, or an empty object. Such snapshots are treated as absent so the
/// load protocol falls through to the remote replica.
#[must_use]
pub fn is_empty_snapshot(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::Array(items) => items.is_empty(),
        serde_json::Value::Object(fields) => fields.is_empty(),
        _ => false,
    }
}
