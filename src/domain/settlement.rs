//! Payout computation for market settlement.
//!
//! Isolated behind [`SettlementPolicy`] so the payout rule can be
//! swapped (a rake, fixed odds) without touching transaction or locking
//! logic in the engine.

use rust_decimal::Decimal;

use super::ids::Username;
use super::stake::Stake;

/// One winner's computed payout.
#[derive(Debug, Clone, PartialEq)]
pub struct Payout {
    pub account: Username,
    pub amount: Decimal,
}

/// Computes winner payouts given the winning pool and the losing pool's
/// total. Pure: no side effects, no access to stores or locks.
pub trait SettlementPolicy: Send + Sync {
    /// Payouts for every stake in the winning pool, in pool order.
    ///
    /// Must conserve money exactly: the returned amounts sum to
    /// `winning_sum + losing_sum` whenever the winning pool is
    /// non-empty, and to zero when it is empty.
    fn payouts(&self, winning_pool: &[Stake], losing_sum: Decimal) -> Vec<Payout>;
}

/// Zero-house-edge pro-rata redistribution.
///
/// Every winner gets their stake back plus
/// `stake / winning_sum * losing_sum`. Division remainders are folded
/// into the last winner's share so the losing pool is redistributed to
/// the cent, nothing withheld and nothing minted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProportionalPayout;

impl SettlementPolicy for ProportionalPayout {
    fn payouts(&self, winning_pool: &[Stake], losing_sum: Decimal) -> Vec<Payout> {
        let winning_sum: Decimal = winning_pool.iter().map(|s| s.amount).sum();
        if winning_pool.is_empty() || winning_sum <= Decimal::ZERO {
            // Nothing to distribute to.
            return Vec::new();
        }

        let mut payouts = Vec::with_capacity(winning_pool.len());
        let mut remaining = losing_sum;
        for (i, stake) in winning_pool.iter().enumerate() {
            let share = if i + 1 == winning_pool.len() {
                remaining
            } else {
                stake.amount / winning_sum * losing_sum
            };
            remaining -= share;
            payouts.push(Payout {
                account: stake.account.clone(),
                amount: stake.amount + share,
            });
        }
        payouts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MarketId, Outcome};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn stake(account: &str, amount: Decimal) -> Stake {
        Stake::new(
            Username::new(account),
            MarketId::new(1),
            Outcome::Yes,
            amount,
            Utc::now(),
            dec!(0),
        )
    }

    fn total(payouts: &[Payout]) -> Decimal {
        payouts.iter().map(|p| p.amount).sum()
    }

    #[test]
    fn sole_winner_takes_the_whole_losing_pool() {
        let pool = vec![stake("alice", dec!(40))];
        let payouts = ProportionalPayout.payouts(&pool, dec!(50));

        assert_eq!(payouts.len(), 1);
        assert_eq!(payouts[0].amount, dec!(90));
    }

    #[test]
    fn shares_are_proportional_to_stakes() {
        let pool = vec![stake("alice", dec!(75)), stake("bob", dec!(25))];
        let payouts = ProportionalPayout.payouts(&pool, dec!(100));

        assert_eq!(payouts[0].amount, dec!(150));
        assert_eq!(payouts[1].amount, dec!(50));
        assert_eq!(total(&payouts), dec!(200));
    }

    #[test]
    fn empty_losing_pool_refunds_stakes_exactly() {
        let pool = vec![stake("alice", dec!(40)), stake("bob", dec!(10))];
        let payouts = ProportionalPayout.payouts(&pool, Decimal::ZERO);

        assert_eq!(payouts[0].amount, dec!(40));
        assert_eq!(payouts[1].amount, dec!(10));
    }

    #[test]
    fn empty_winning_pool_pays_nobody() {
        let payouts = ProportionalPayout.payouts(&[], dec!(100));
        assert!(payouts.is_empty());
    }

    #[test]
    fn non_terminating_shares_still_conserve_exactly() {
        // 3 equal winners splitting 100: each exact share is 33.33...
        let pool = vec![
            stake("a", dec!(10)),
            stake("b", dec!(10)),
            stake("c", dec!(10)),
        ];
        let payouts = ProportionalPayout.payouts(&pool, dec!(100));

        assert_eq!(total(&payouts), dec!(130));
    }
}
