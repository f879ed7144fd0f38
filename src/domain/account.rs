//! Account domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ids::{MarketId, Username};
use super::outcome::Outcome;
use super::stake::Stake;

/// Advisory profile data attached to an account at registration.
///
/// The ledger never branches on any of these fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub full_name: String,
    pub email: String,
    pub joined_at: Option<DateTime<Utc>>,
}

/// A user account: balance plus stake history.
///
/// Invariant: `balance >= 0` at every committed state. Only the ledger
/// engine mutates balances; accounts are never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    username: Username,
    pub profile: Profile,
    balance: Decimal,
    /// Stakes in placement order.
    stakes: Vec<Stake>,
    /// Informational only.
    pub created_markets: Vec<MarketId>,
    /// Informational only.
    pub resolved_markets: Vec<MarketId>,
}

impl Account {
    pub fn new(username: Username, profile: Profile, balance: Decimal) -> Self {
        Self {
            username,
            profile,
            balance,
            stakes: Vec::new(),
            created_markets: Vec::new(),
            resolved_markets: Vec::new(),
        }
    }

    #[must_use]
    pub fn username(&self) -> &Username {
        &self.username
    }

    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.balance
    }

    #[must_use]
    pub fn stakes(&self) -> &[Stake] {
        &self.stakes
    }

    /// Whether the account can cover a debit of `amount`.
    #[must_use]
    pub fn can_afford(&self, amount: Decimal) -> bool {
        self.balance >= amount
    }

    /// Debit `amount` from the balance. Callers must have checked
    /// affordability; debiting below zero is a programming error.
    pub(crate) fn debit(&mut self, amount: Decimal) {
        debug_assert!(self.balance >= amount, "debit past zero");
        self.balance -= amount;
    }

    /// Credit `amount` to the balance.
    pub(crate) fn credit(&mut self, amount: Decimal) {
        self.balance += amount;
    }

    /// Record a bet on the account side, merging into an existing stake
    /// on the same `(market, outcome)` or appending a new record.
    pub(crate) fn record_stake(&mut self, stake: Stake) {
        match self
            .stakes
            .iter_mut()
            .find(|s| s.matches(&stake.account, stake.market_id, stake.outcome))
        {
            Some(existing) => existing.merge(stake.amount, stake.placed_at),
            None => self.stakes.push(stake),
        }
    }

    /// Mark the stake matching `(market, outcome)` as paid out.
    pub(crate) fn settle_stake(&mut self, market_id: MarketId, outcome: Outcome, payout: Decimal) {
        let username = self.username.clone();
        if let Some(stake) = self
            .stakes
            .iter_mut()
            .find(|s| s.matches(&username, market_id, outcome))
        {
            stake.payout = Some(payout);
        }
    }

    /// Rebuild an account from persisted parts. Store-layer use only.
    pub(crate) fn from_parts(
        username: Username,
        profile: Profile,
        balance: Decimal,
        stakes: Vec<Stake>,
        created_markets: Vec<MarketId>,
        resolved_markets: Vec<MarketId>,
    ) -> Self {
        Self {
            username,
            profile,
            balance,
            stakes,
            created_markets,
            resolved_markets,
        }
    }
}
