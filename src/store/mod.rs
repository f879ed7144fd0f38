//! Persistence layer with pluggable storage backends.
//!
//! The ledger engine is constructed over a [`LedgerStore`] capability
//! rather than a concrete database, which keeps it unit-testable against
//! the in-memory backend. A store must provide atomic multi-record
//! commits: every upsert in a [`WriteBatch`] becomes visible together or
//! not at all, and a failed commit leaves prior state intact.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::future::Future;

use crate::domain::{Account, Market, MarketId, Username};
use crate::error::Result;

/// The staged writes of one ledger transaction.
///
/// Holds fully-formed record snapshots; the engine mutates clones and
/// hands the results here, so a discarded batch is a free rollback.
#[derive(Debug, Default)]
pub struct WriteBatch {
    accounts: Vec<Account>,
    markets: Vec<Market>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage an account upsert.
    pub fn put_account(&mut self, account: Account) -> &mut Self {
        self.accounts.push(account);
        self
    }

    /// Stage a market upsert.
    pub fn put_market(&mut self, market: Market) -> &mut Self {
        self.markets.push(market);
        self
    }

    #[must_use]
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    #[must_use]
    pub fn markets(&self) -> &[Market] {
        &self.markets
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty() && self.markets.is_empty()
    }
}

/// Read operations over account records.
pub trait AccountStore: Send + Sync {
    /// Load an account by username.
    fn load_account(
        &self,
        username: &Username,
    ) -> impl Future<Output = Result<Option<Account>>> + Send;

    /// Whether an account exists.
    fn account_exists(&self, username: &Username) -> impl Future<Output = Result<bool>> + Send;

    /// All registered usernames, unordered.
    fn usernames(&self) -> impl Future<Output = Result<Vec<Username>>> + Send;
}

/// Read operations and id allocation over market records.
pub trait MarketStore: Send + Sync {
    /// Load a market by id.
    fn load_market(&self, id: MarketId) -> impl Future<Output = Result<Option<Market>>> + Send;

    /// All markets, ordered by id.
    fn list_markets(&self) -> impl Future<Output = Result<Vec<Market>>> + Send;

    /// Allocate the next market id.
    ///
    /// Strictly greater than every id ever returned or stored; an id
    /// burned by a failed transaction is never reissued.
    fn allocate_market_id(&self) -> impl Future<Output = Result<MarketId>> + Send;
}

/// Full store capability required by the ledger engine.
pub trait LedgerStore: AccountStore + MarketStore {
    /// Apply every upsert in the batch atomically and durably.
    fn commit(&self, batch: WriteBatch) -> impl Future<Output = Result<()>> + Send;
}
