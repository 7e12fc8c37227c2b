//! Engine configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Walrus endpoints default to the public
//! testnet publisher/aggregator pair.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Connection and policy settings for the Walrus blob store.
#[derive(Debug, Clone)]
pub struct WalrusConfig {
    /// Base URL of the Walrus publisher (write endpoint).
    pub publisher_url: String,

    /// Base URL of the Walrus aggregator (read endpoint).
    pub aggregator_url: String,

    /// Number of storage epochs each blob is replicated for.
    pub epochs: u32,

    /// Whether uploaded blobs may later be deleted on-chain.
    pub deletable: bool,

    /// Maximum accepted upload payload size; larger payloads are rejected
    /// before any network call.
    pub max_upload_bytes: usize,

    /// Per-attempt timeout for every blob store request.
    pub request_timeout: Duration,

    /// Number of additional attempts for blob store writes. Reads never
    /// retry; a failed read falls through to the local snapshot.
    pub retry_count: u32,
}

/// Top-level engine configuration.
///
/// Loaded once at startup via [`AdsConfig::from_env`].
#[derive(Debug, Clone)]
pub struct AdsConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:4000`).
    pub listen_addr: SocketAddr,

    /// Walrus blob store settings.
    pub walrus: WalrusConfig,

    /// Statically configured blob id to bootstrap the campaigns dataset
    /// from when no pointer file exists yet.
    pub campaigns_blob_id: Option<String>,

    /// Statically configured blob id for the counters dataset.
    pub counters_blob_id: Option<String>,

    /// Statically configured blob id for the websites dataset.
    pub websites_blob_id: Option<String>,

    /// Directory holding local JSON snapshots of each dataset.
    pub local_state_dir: PathBuf,

    /// Path of the pointer document mapping dataset name to the latest
    /// blob id (or local-file marker).
    pub pointers_path: PathBuf,

    /// Base64-encoded admin signing key (32-byte seed or 64-byte keypair).
    /// When absent or malformed an ephemeral dev keypair is generated.
    pub admin_private_key_base64: Option<String>,

    /// Base64-encoded admin public key to display in claim responses when
    /// it is registered on-chain separately from the signing key.
    pub admin_public_key_base64: Option<String>,

    /// Pending deliveries not clicked within this window are evicted.
    pub delivery_ttl: Duration,

    /// Audit log flush threshold: queue length that forces a flush.
    pub audit_batch_size: usize,

    /// Audit log flush interval for partially filled batches.
    pub audit_flush_interval: Duration,

    /// Capacity of the StateBus broadcast channel.
    pub event_bus_capacity: usize,
}

impl AdsConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:4000".to_string())
            .parse()?;

        let walrus = WalrusConfig {
            publisher_url: std::env::var("WALRUS_PUBLISHER_URL")
                .unwrap_or_else(|_| "https://publisher.walrus-testnet.walrus.space".to_string()),
            aggregator_url: std::env::var("WALRUS_AGGREGATOR_URL")
                .unwrap_or_else(|_| "https://aggregator.walrus-testnet.walrus.space".to_string()),
            epochs: parse_env("WALRUS_EPOCHS", 1),
            deletable: parse_env_bool("WALRUS_DELETABLE", false),
            max_upload_bytes: parse_env("WALRUS_MAX_UPLOAD_BYTES", 10 * 1024 * 1024),
            request_timeout: Duration::from_millis(parse_env("WALRUS_REQUEST_TIMEOUT_MS", 15_000)),
            retry_count: parse_env("WALRUS_RETRY_COUNT", 2),
        };

        let local_state_dir =
            PathBuf::from(std::env::var("LOCAL_STATE_DIR").unwrap_or_else(|_| ".local-state".to_string()));
        let pointers_path = PathBuf::from(
            std::env::var("WALRUS_POINTERS_PATH").unwrap_or_else(|_| ".walrus-pointers.json".to_string()),
        );

        Ok(Self {
            listen_addr,
            walrus,
            campaigns_blob_id: env_non_empty("WALRUS_CAMPAIGNS_BLOB_ID"),
            counters_blob_id: env_non_empty("WALRUS_COUNTERS_BLOB_ID"),
            websites_blob_id: env_non_empty("WALRUS_WEBSITES_BLOB_ID"),
            local_state_dir,
            pointers_path,
            admin_private_key_base64: env_non_empty("ADMIN_PRIVATE_KEY_BASE64"),
            admin_public_key_base64: env_non_empty("ADMIN_PUBLIC_KEY_BASE64"),
            delivery_ttl: Duration::from_secs(parse_env("DELIVERY_TTL_SECS", 21_600)),
            audit_batch_size: parse_env("AUDIT_BATCH_SIZE", 50),
            audit_flush_interval: Duration::from_millis(parse_env("AUDIT_FLUSH_INTERVAL_MS", 10_000)),
            event_bus_capacity: parse_env("EVENT_BUS_CAPACITY", 10_000),
        })
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key).ok().as_deref() {
        Some("true") | Some("TRUE") | Some("1") => true,
        Some("false") | Some("FALSE") | Some("0") => false,
        _ => default,
    }
}

/// Reads an environment variable, mapping unset or empty values to `None`.
fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
