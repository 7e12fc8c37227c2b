//! Per-publisher earnings ledger.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Cumulative earnings state for one publisher wallet.
///
/// `nonce` is the replay-protection counter tied to claim signatures: it
/// never decreases and increments by exactly one per successful claim
/// authorization.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublisherLedger {
    /// Cumulative sum of all impression costs attributed to this publisher.
    pub earnings: u64,

    /// Cumulative sum ever authorized for withdrawal.
    pub claimed: u64,

    /// Strictly increasing claim counter; the value signed into a claim
    /// message is the pre-increment one.
    pub nonce: u64,
}

impl PublisherLedger {
    /// Earnings accrued but not yet authorized for withdrawal. Never
    /// negative: claims are only authorized up to current earnings.
    #[must_use]
    pub fn claimable(&self) -> u64 {
        self.earnings.saturating_sub(self.claimed)
    }
}

/// Snapshot of what a publisher may claim right now.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct Claimable {
    /// Claimable amount in mist.
    pub amount: u64,
    /// Current (pre-increment) nonce to sign under.
    pub nonce: u64,
}
