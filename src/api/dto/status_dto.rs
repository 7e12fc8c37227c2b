//! Persistence/audit introspection DTO.

use serde::Serialize;
use utoipa::ToSchema;

use crate::audit::AuditPointer;

/// Response body for `GET /status`.
///
/// Field names are camelCase for parity with the persisted documents the
/// dashboard already understands.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// Latest pointer for the campaigns dataset (blob id or file marker).
    pub campaigns_blob_id: Option<String>,
    /// Latest pointer for the counters dataset.
    pub counters_blob_id: Option<String>,
    /// Latest pointer for the websites dataset.
    pub websites_blob_id: Option<String>,
    /// Reference to the last flushed audit batch.
    pub audit_log: Option<AuditPointer>,
    /// Impressions queued for the next audit flush.
    pub audit_queue_depth: usize,
    /// Registered campaign count.
    pub campaigns_count: usize,
    /// `true` when claims are signed with the dev-only ephemeral keypair.
    pub ephemeral_signing_key: bool,
}
