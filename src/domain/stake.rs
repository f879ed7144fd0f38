//! A single account's committed amount on one outcome of one market.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ids::{MarketId, Username};
use super::outcome::Outcome;

/// One stake record.
///
/// For a given `(account, market_id, outcome)` triple at most one stake
/// exists: repeated bets on the same side merge into the existing record
/// via [`Stake::merge`] rather than duplicating it.
///
/// `odds_at_placement` is a display/audit snapshot of the implied odds
/// for this side when the stake was first placed. Settlement never reads
/// it; payouts are always recomputed from live pool sums.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stake {
    pub account: Username,
    pub market_id: MarketId,
    pub outcome: Outcome,
    pub amount: Decimal,
    pub placed_at: DateTime<Utc>,
    pub odds_at_placement: Decimal,
    /// Set exactly once by settlement; `None` means not yet evaluated.
    pub payout: Option<Decimal>,
}

impl Stake {
    pub fn new(
        account: Username,
        market_id: MarketId,
        outcome: Outcome,
        amount: Decimal,
        placed_at: DateTime<Utc>,
        odds_at_placement: Decimal,
    ) -> Self {
        Self {
            account,
            market_id,
            outcome,
            amount,
            placed_at,
            odds_at_placement,
            payout: None,
        }
    }

    /// Whether this record is the merge target for a new bet.
    #[must_use]
    pub fn matches(&self, account: &Username, market_id: MarketId, outcome: Outcome) -> bool {
        self.account == *account && self.market_id == market_id && self.outcome == outcome
    }

    /// Fold an additional bet into this stake.
    ///
    /// Adds to the amount and refreshes `placed_at`; the odds snapshot
    /// from first placement is kept.
    pub fn merge(&mut self, amount: Decimal, placed_at: DateTime<Utc>) {
        self.amount += amount;
        self.placed_at = placed_at;
    }
}
