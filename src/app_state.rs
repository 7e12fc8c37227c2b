//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::audit::AuditLog;
use crate::domain::LedgerStore;
use crate::domain::selection::SelectionStrategy;
use crate::persistence::StatePersistence;
use crate::signing::ClaimSigner;
use crate::walrus::WalrusClient;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Authoritative campaign/ledger store.
    pub store: Arc<LedgerStore>,

    /// Pluggable campaign selection policy.
    pub selection: Arc<dyn SelectionStrategy>,

    /// Claim message signer.
    pub signer: Arc<ClaimSigner>,

    /// Impression audit batcher (introspected by the status endpoint).
    pub audit: Arc<AuditLog<WalrusClient>>,

    /// Dataset persistence orchestrator (introspected by the status
    /// endpoint; driven by its own background worker).
    pub persistence: Arc<StatePersistence<WalrusClient>>,
}
