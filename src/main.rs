//! coral-ads server entry point.
//!
//! Starts the Axum HTTP server, restores persisted state, and spawns the
//! background persistence, audit, and delivery-eviction workers.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use coral_ads::api;
use coral_ads::app_state::AppState;
use coral_ads::audit::AuditLog;
use coral_ads::config::AdsConfig;
use coral_ads::domain::{Campaign, LedgerStore, StateBus, WeightedRandom};
use coral_ads::persistence::{BlobPointerStore, LocalStateStore, StatePersistence};
use coral_ads::signing::ClaimSigner;
use coral_ads::walrus::WalrusClient;

/// How often the stale-delivery sweep runs.
const EVICTION_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = AdsConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting coral-ads");

    // Build the storage stack
    let walrus = Arc::new(WalrusClient::new(config.walrus.clone()));
    let local = LocalStateStore::new(config.local_state_dir.clone());
    let pointers = Arc::new(BlobPointerStore::new(config.pointers_path.clone()));
    let persistence = Arc::new(StatePersistence::new(
        local,
        pointers,
        Arc::clone(&walrus),
        &config,
    ));

    // Build the domain layer
    let bus = StateBus::new(config.event_bus_capacity);
    let store = Arc::new(LedgerStore::new(bus.clone()));
    let signer = Arc::new(ClaimSigner::from_config(&config));
    let audit = Arc::new(AuditLog::new(Arc::clone(&walrus), &config));

    // Restore persisted state before any worker can write snapshots:
    // campaigns wholesale, then counters merged into them, then websites
    // wholesale.
    if let Some(campaigns) = persistence.load_campaigns().await {
        store.load_campaigns(campaigns).await;
    }
    let restored = store.campaign_count().await;
    tracing::info!(count = restored, "restored campaigns");
    if let Some(counters) = persistence.load_counters().await {
        store.load_counters(counters).await;
    }
    if let Some(websites) = persistence.load_websites().await {
        store.load_websites(websites).await;
    }
    if !store.has_campaigns().await {
        tracing::info!("no campaigns found, seeding demo campaign");
        store.seed_campaign(Campaign::demo()).await;
    }

    // Background workers
    tokio::spawn(Arc::clone(&persistence).run(Arc::clone(&store), bus.subscribe()));
    tokio::spawn(Arc::clone(&audit).run(bus.subscribe()));
    tokio::spawn(Arc::clone(&audit).run_flush_timer(config.audit_flush_interval));
    {
        let store = Arc::clone(&store);
        let ttl = config.delivery_ttl;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(EVICTION_SWEEP_INTERVAL);
            loop {
                ticker.tick().await;
                store.evict_stale_deliveries(ttl).await;
            }
        });
    }

    // Build application state
    let app_state = AppState {
        store,
        selection: Arc::new(WeightedRandom),
        signer,
        audit: Arc::clone(&audit),
        persistence,
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Best-effort: land whatever audit records are still queued.
    audit.flush().await;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
