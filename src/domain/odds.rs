//! Implied odds from stake pool sums.
//!
//! Pure and total: the denominator is floored at 1 so an empty market
//! reports 0% on both sides instead of dividing by zero.

use rust_decimal::Decimal;

use super::outcome::Outcome;

/// Percentage split across the two sides of a market.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OddsPair {
    pub yes: Decimal,
    pub no: Decimal,
}

impl OddsPair {
    /// The percentage for one side.
    #[must_use]
    pub fn side(&self, outcome: Outcome) -> Decimal {
        match outcome {
            Outcome::Yes => self.yes,
            Outcome::No => self.no,
        }
    }
}

/// Compute implied odds as a percentage of the combined pool.
///
/// `odds(side) = pool_sum(side) / max(1, yes + no) * 100`
#[must_use]
pub fn implied_odds(yes_sum: Decimal, no_sum: Decimal) -> OddsPair {
    let denominator = (yes_sum + no_sum).max(Decimal::ONE);
    let hundred = Decimal::ONE_HUNDRED;
    OddsPair {
        yes: yes_sum / denominator * hundred,
        no: no_sum / denominator * hundred,
    }
}
