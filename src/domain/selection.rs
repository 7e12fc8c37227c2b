//! Campaign selection strategies.
//!
//! The store hands the eligibility-filtered candidate list to a
//! [`SelectionStrategy`]; the strategy picks exactly one campaign or none.
//! The default [`WeightedRandom`] favors higher-paying campaigns while
//! giving budget-rich, low-bid campaigns a floor chance; [`HighestBid`] is
//! the deterministic degenerate policy kept for predictable environments.

use rand::Rng;

use super::campaign::Campaign;

/// Chooses one campaign to serve from a candidate list.
pub trait SelectionStrategy: Send + Sync + std::fmt::Debug {
    /// Picks a campaign, or `None` when `candidates` is empty.
    fn pick<'a>(&self, candidates: &'a [Campaign]) -> Option<&'a Campaign>;
}

/// Weighted-random selection.
///
/// `weight(c) = max(1, cpc_bid) + max(1, min(remaining_budget, cpc_bid * 10))`
///
/// The remaining-budget term is capped at ten bids so an extremely large
/// deposit cannot dominate, and floored at one so no candidate ever has
/// zero weight. `remaining_budget` is already clamped to zero by the
/// campaign itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct WeightedRandom;

fn weight(campaign: &Campaign) -> u128 {
    let bid = u128::from(campaign.cpc_bid.max(1));
    let budget_term = u128::from(campaign.remaining_budget())
        .min(u128::from(campaign.cpc_bid).saturating_mul(10))
        .max(1);
    bid + budget_term
}

impl SelectionStrategy for WeightedRandom {
    fn pick<'a>(&self, candidates: &'a [Campaign]) -> Option<&'a Campaign> {
        if candidates.is_empty() {
            return None;
        }

        let total: u128 = candidates.iter().map(weight).sum();
        let mut roll = rand::thread_rng().gen_range(0..total);
        for campaign in candidates {
            let w = weight(campaign);
            if roll < w {
                return Some(campaign);
            }
            roll -= w;
        }
        // Unreachable given the sum above; defer to the last candidate.
        candidates.last()
    }
}

/// Deterministic selection: the highest bid always wins.
#[derive(Debug, Default, Clone, Copy)]
pub struct HighestBid;

impl SelectionStrategy for HighestBid {
    fn pick<'a>(&self, candidates: &'a [Campaign]) -> Option<&'a Campaign> {
        candidates.iter().max_by_key(|c| c.cpc_bid)
    }
}
