//! The ledger engine: atomic transactions over accounts and markets.
//!
//! [`LedgerEngine`] exposes the four transactions of the platform
//! (register account, create market, place bet, resolve market) plus
//! read-only queries. Each transaction validates its input before any
//! lock is taken, acquires exclusive locks on every record it will
//! mutate in the fixed global order (market before accounts, accounts
//! in username sort order), stages mutations on clones, and commits
//! them through the store as one atomic batch. A failed commit discards
//! the clones, so no other transaction ever observes a partial write.

mod locks;

pub use locks::{LockKey, LockTable};

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::config::LedgerConfig;
use crate::domain::{
    implied_odds, Account, Market, MarketId, OddsPair, Outcome, Payout, Profile,
    ProportionalPayout, Resolution, SettlementPolicy, Stake, Username,
};
use crate::error::{LedgerError, Result};
use crate::store::{AccountStore, LedgerStore, MarketStore, WriteBatch};

/// The market ledger and settlement engine.
///
/// Generic over the store so it runs identically against the in-memory
/// backend (tests, ephemeral ledgers) and SQLite (durable deployments).
pub struct LedgerEngine<S> {
    store: Arc<S>,
    locks: LockTable,
    policy: Box<dyn SettlementPolicy>,
    config: LedgerConfig,
}

impl<S: LedgerStore> LedgerEngine<S> {
    /// Create an engine with the default zero-house-edge payout policy.
    pub fn new(store: Arc<S>, config: LedgerConfig) -> Self {
        Self::with_policy(store, config, Box::new(ProportionalPayout))
    }

    /// Create an engine with a custom settlement policy.
    pub fn with_policy(
        store: Arc<S>,
        config: LedgerConfig,
        policy: Box<dyn SettlementPolicy>,
    ) -> Self {
        let locks = LockTable::new(Duration::from_millis(config.lock_timeout_ms));
        Self {
            store,
            locks,
            policy,
            config,
        }
    }

    /// Register a new account with the configured starting balance.
    pub async fn create_account(&self, username: Username, profile: Profile) -> Result<Account> {
        if username.is_blank() {
            return Err(LedgerError::MissingField { field: "username" });
        }

        let _guard = self.locks.write(LockKey::Account(username.clone())).await?;

        if self.store.account_exists(&username).await? {
            return Err(LedgerError::UsernameTaken { username });
        }

        let account = Account::new(username.clone(), profile, self.config.starting_balance);
        let mut batch = WriteBatch::new();
        batch.put_account(account.clone());
        self.store.commit(batch).await?;

        info!(username = %username, balance = %account.balance(), "account created");
        Ok(account)
    }

    /// Open a new market. The creator becomes its default resolver.
    pub async fn create_market(
        &self,
        name: &str,
        description: &str,
        ends_at: Option<DateTime<Utc>>,
        creator: Username,
    ) -> Result<Market> {
        if name.trim().is_empty() {
            return Err(LedgerError::MissingField { field: "name" });
        }

        let _guard = self.locks.write(LockKey::Account(creator.clone())).await?;

        let mut account = self
            .store
            .load_account(&creator)
            .await?
            .ok_or(LedgerError::UnknownAccount {
                username: creator.clone(),
            })?;

        // Ids burned by failed transactions are never reissued, so
        // allocation does not need to be part of the commit.
        let id = self.store.allocate_market_id().await?;
        let market = Market::new(id, name, description, Utc::now(), ends_at, creator.clone());
        account.created_markets.push(id);

        let mut batch = WriteBatch::new();
        batch.put_account(account).put_market(market.clone());
        self.store.commit(batch).await?;

        info!(market_id = %id, creator = %creator, name = %market.name, "market created");
        Ok(market)
    }

    /// Stake `amount` on one side of an open market.
    ///
    /// Moves money from the account balance into the market pool; total
    /// currency in the system is unchanged. A repeat bet on the same
    /// side merges into the existing stake instead of duplicating it.
    pub async fn place_bet(
        &self,
        market_id: MarketId,
        username: Username,
        outcome: Outcome,
        amount: Decimal,
        placed_at: Option<DateTime<Utc>>,
    ) -> Result<(Market, Account)> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount { amount });
        }

        let _guards = self
            .locks
            .write_set(Some(market_id), std::slice::from_ref(&username))
            .await?;

        let mut market =
            self.store
                .load_market(market_id)
                .await?
                .ok_or(LedgerError::MarketNotFound { id: market_id })?;
        if !market.is_open() {
            return Err(LedgerError::MarketClosed { id: market_id });
        }

        let mut account = self
            .store
            .load_account(&username)
            .await?
            .ok_or(LedgerError::UnknownAccount {
                username: username.clone(),
            })?;
        if !account.can_afford(amount) {
            return Err(LedgerError::InsufficientBalance {
                username: username.clone(),
                balance: account.balance(),
                requested: amount,
            });
        }

        let placed_at = placed_at.unwrap_or_else(Utc::now);

        // Snapshot of the implied odds including this stake, kept on
        // the record for audit and display. Settlement never reads it.
        let mut yes_sum = market.pool_sum(Outcome::Yes);
        let mut no_sum = market.pool_sum(Outcome::No);
        match outcome {
            Outcome::Yes => yes_sum += amount,
            Outcome::No => no_sum += amount,
        }
        let odds = implied_odds(yes_sum, no_sum).side(outcome);

        let stake = Stake::new(
            username.clone(),
            market_id,
            outcome,
            amount,
            placed_at,
            odds,
        );
        account.debit(amount);
        account.record_stake(stake.clone());
        market.place(stake);

        let mut batch = WriteBatch::new();
        batch.put_account(account.clone()).put_market(market.clone());
        self.store.commit(batch).await?;

        info!(
            market_id = %market_id,
            account = %username,
            outcome = %outcome,
            amount = %amount,
            "bet placed"
        );
        Ok((market, account))
    }

    /// Declare a market's outcome and settle every winning stake.
    ///
    /// Winners are paid their stake back plus a pro-rata share of the
    /// entire losing pool (no house edge); the combined pool is
    /// redistributed exactly. Resolution is terminal: a second call
    /// returns `MarketAlreadyResolved` and changes nothing.
    pub async fn resolve_market(
        &self,
        market_id: MarketId,
        resolver: Username,
        outcome: Outcome,
        resolved_at: Option<DateTime<Utc>>,
    ) -> Result<(Market, Vec<Account>)> {
        // The market lock freezes pool membership, so the winner set
        // read below cannot change before commit.
        let _market_guard = self.locks.write(LockKey::Market(market_id)).await?;

        let mut market =
            self.store
                .load_market(market_id)
                .await?
                .ok_or(LedgerError::MarketNotFound { id: market_id })?;
        if !market.is_open() {
            return Err(LedgerError::MarketAlreadyResolved { id: market_id });
        }

        let winning_pool: Vec<Stake> = market.pool(outcome).stakes().to_vec();
        let losing_sum = market.pool_sum(outcome.opposite());

        // Accounts mutated by this transaction: every winner plus the
        // resolver (bookkeeping). Locked in username sort order, after
        // the market, per the global order.
        let mut to_lock: Vec<Username> =
            winning_pool.iter().map(|s| s.account.clone()).collect();
        to_lock.push(resolver.clone());
        let _account_guards = self.locks.write_set(None, &to_lock).await?;

        let payouts = self.policy.payouts(&winning_pool, losing_sum);

        let resolved_at = resolved_at.unwrap_or_else(Utc::now);
        market.resolve(Resolution {
            outcome,
            resolver: resolver.clone(),
            resolved_at,
        });

        let mut staged: BTreeMap<Username, Account> = BTreeMap::new();
        for Payout { account, amount } in &payouts {
            let entry = match staged.entry(account.clone()) {
                std::collections::btree_map::Entry::Occupied(e) => e.into_mut(),
                std::collections::btree_map::Entry::Vacant(e) => {
                    let loaded = self.store.load_account(account).await?.ok_or_else(|| {
                        LedgerError::Storage(format!(
                            "stake holder '{account}' missing from account store"
                        ))
                    })?;
                    e.insert(loaded)
                }
            };
            entry.credit(*amount);
            entry.settle_stake(market_id, outcome, *amount);
            market.mark_paid(outcome, account, *amount);
        }

        // Resolver bookkeeping; the resolution stands even when the
        // resolver has no account record.
        match staged.entry(resolver.clone()) {
            std::collections::btree_map::Entry::Occupied(e) => {
                e.into_mut().resolved_markets.push(market_id);
            }
            std::collections::btree_map::Entry::Vacant(e) => {
                match self.store.load_account(&resolver).await? {
                    Some(mut account) => {
                        account.resolved_markets.push(market_id);
                        e.insert(account);
                    }
                    None => warn!(resolver = %resolver, "resolver has no account record"),
                }
            }
        }

        // The accounts whose balances changed: exactly the payout
        // receivers, at their post-settlement state.
        let winners: Vec<Account> = payouts
            .iter()
            .filter_map(|p| staged.get(&p.account).cloned())
            .collect();

        let mut batch = WriteBatch::new();
        batch.put_market(market.clone());
        for account in staged.into_values() {
            batch.put_account(account);
        }
        self.store.commit(batch).await?;

        let distributed: Decimal = payouts.iter().map(|p| p.amount).sum();
        info!(
            market_id = %market_id,
            outcome = %outcome,
            resolver = %resolver,
            winners = payouts.len(),
            distributed = %distributed,
            "market resolved"
        );
        Ok((market, winners))
    }

    /// Fetch a market snapshot under a shared lock.
    pub async fn market(&self, id: MarketId) -> Result<Option<Market>> {
        let _guard = self.locks.read(LockKey::Market(id)).await?;
        self.store.load_market(id).await
    }

    /// Fetch an account snapshot under a shared lock.
    pub async fn account(&self, username: &Username) -> Result<Option<Account>> {
        let _guard = self.locks.read(LockKey::Account(username.clone())).await?;
        self.store.load_account(username).await
    }

    /// All markets, ordered by id. Each record is read at committed
    /// state; the listing itself takes no locks.
    pub async fn markets(&self) -> Result<Vec<Market>> {
        self.store.list_markets().await
    }

    /// All registered usernames.
    pub async fn usernames(&self) -> Result<Vec<Username>> {
        self.store.usernames().await
    }

    /// Current implied odds for a market.
    pub async fn odds(&self, id: MarketId) -> Result<OddsPair> {
        let market = self
            .market(id)
            .await?
            .ok_or(LedgerError::MarketNotFound { id })?;
        Ok(implied_odds(
            market.pool_sum(Outcome::Yes),
            market.pool_sum(Outcome::No),
        ))
    }
}
