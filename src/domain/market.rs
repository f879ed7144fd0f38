//! Market domain types.
//!
//! - [`Market`] - A binary prediction market with two stake pools
//! - [`MarketStatus`] - Open/Resolved lifecycle
//! - [`Resolution`] - The declared outcome, frozen onto the market

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ids::{MarketId, Username};
use super::outcome::Outcome;
use super::stake::Stake;

/// Lifecycle state of a market. `Resolved` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketStatus {
    Open,
    Resolved,
}

/// The one-time outcome declaration for a market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub outcome: Outcome,
    pub resolver: Username,
    pub resolved_at: DateTime<Utc>,
}

/// All stakes committed to one side of a market, in placement order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    stakes: Vec<Stake>,
}

impl Pool {
    #[must_use]
    pub fn stakes(&self) -> &[Stake] {
        &self.stakes
    }

    /// Total amount committed to this side.
    #[must_use]
    pub fn sum(&self) -> Decimal {
        self.stakes.iter().map(|s| s.amount).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stakes.is_empty()
    }

    fn place(&mut self, stake: Stake) {
        match self
            .stakes
            .iter_mut()
            .find(|s| s.matches(&stake.account, stake.market_id, stake.outcome))
        {
            Some(existing) => existing.merge(stake.amount, stake.placed_at),
            None => self.stakes.push(stake),
        }
    }

    fn mark_paid(&mut self, account: &Username, payout: Decimal) {
        if let Some(stake) = self.stakes.iter_mut().find(|s| s.account == *account) {
            stake.payout = Some(payout);
        }
    }
}

/// A binary prediction market.
///
/// Created `Open` with empty pools; transitions to `Resolved` exactly
/// once, after which its pools are never mutated again. The creator is
/// recorded as the default resolver. `ends_at` is advisory and not
/// enforced by the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    id: MarketId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    resolver: Username,
    status: MarketStatus,
    yes_pool: Pool,
    no_pool: Pool,
    resolution: Option<Resolution>,
}

impl Market {
    pub fn new(
        id: MarketId,
        name: impl Into<String>,
        description: impl Into<String>,
        created_at: DateTime<Utc>,
        ends_at: Option<DateTime<Utc>>,
        resolver: Username,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            created_at,
            ends_at,
            resolver,
            status: MarketStatus::Open,
            yes_pool: Pool::default(),
            no_pool: Pool::default(),
            resolution: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> MarketId {
        self.id
    }

    #[must_use]
    pub fn status(&self) -> MarketStatus {
        self.status
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == MarketStatus::Open
    }

    /// The account that may settle this market (the creator).
    #[must_use]
    pub fn resolver(&self) -> &Username {
        &self.resolver
    }

    #[must_use]
    pub fn resolution(&self) -> Option<&Resolution> {
        self.resolution.as_ref()
    }

    #[must_use]
    pub fn pool(&self, outcome: Outcome) -> &Pool {
        match outcome {
            Outcome::Yes => &self.yes_pool,
            Outcome::No => &self.no_pool,
        }
    }

    /// Total committed on one side.
    #[must_use]
    pub fn pool_sum(&self, outcome: Outcome) -> Decimal {
        self.pool(outcome).sum()
    }

    /// Add a stake to the pool for its outcome, merging with an existing
    /// stake by the same account on the same side. Callers must have
    /// checked the market is open.
    pub(crate) fn place(&mut self, stake: Stake) {
        debug_assert!(self.is_open(), "stake placed on resolved market");
        match stake.outcome {
            Outcome::Yes => self.yes_pool.place(stake),
            Outcome::No => self.no_pool.place(stake),
        }
    }

    /// Freeze the market with the declared outcome.
    pub(crate) fn resolve(&mut self, resolution: Resolution) {
        debug_assert!(self.is_open(), "market resolved twice");
        self.status = MarketStatus::Resolved;
        self.resolution = Some(resolution);
    }

    /// Record a payout against the winning-pool stake of `account`.
    pub(crate) fn mark_paid(&mut self, outcome: Outcome, account: &Username, payout: Decimal) {
        match outcome {
            Outcome::Yes => self.yes_pool.mark_paid(account, payout),
            Outcome::No => self.no_pool.mark_paid(account, payout),
        }
    }

    /// Rebuild a market from persisted parts. Store-layer use only.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        id: MarketId,
        name: String,
        description: String,
        created_at: DateTime<Utc>,
        ends_at: Option<DateTime<Utc>>,
        resolver: Username,
        status: MarketStatus,
        yes_stakes: Vec<Stake>,
        no_stakes: Vec<Stake>,
        resolution: Option<Resolution>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            created_at,
            ends_at,
            resolver,
            status,
            yes_pool: Pool { stakes: yes_stakes },
            no_pool: Pool { stakes: no_stakes },
            resolution,
        }
    }

    /// The persisted stake lists, for the store layer.
    pub(crate) fn pool_stakes(&self, outcome: Outcome) -> &[Stake] {
        self.pool(outcome).stakes()
    }
}
