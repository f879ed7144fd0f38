//! In-memory store backend.
//!
//! The unit-test fake and the backing for ephemeral ledgers. A single
//! write lock spans both record maps so a batch commit is atomic with
//! respect to every concurrent reader.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use super::{AccountStore, LedgerStore, MarketStore, WriteBatch};
use crate::domain::{Account, Market, MarketId, Username};
use crate::error::Result;

#[derive(Debug, Default)]
struct Records {
    accounts: BTreeMap<Username, Account>,
    markets: BTreeMap<MarketId, Market>,
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Records>,
    next_market_id: AtomicU64,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Records::default()),
            next_market_id: AtomicU64::new(1),
        }
    }
}

impl AccountStore for MemoryStore {
    async fn load_account(&self, username: &Username) -> Result<Option<Account>> {
        Ok(self.records.read().accounts.get(username).cloned())
    }

    async fn account_exists(&self, username: &Username) -> Result<bool> {
        Ok(self.records.read().accounts.contains_key(username))
    }

    async fn usernames(&self) -> Result<Vec<Username>> {
        Ok(self.records.read().accounts.keys().cloned().collect())
    }
}

impl MarketStore for MemoryStore {
    async fn load_market(&self, id: MarketId) -> Result<Option<Market>> {
        Ok(self.records.read().markets.get(&id).cloned())
    }

    async fn list_markets(&self) -> Result<Vec<Market>> {
        Ok(self.records.read().markets.values().cloned().collect())
    }

    async fn allocate_market_id(&self) -> Result<MarketId> {
        let id = self.next_market_id.fetch_add(1, Ordering::SeqCst);
        Ok(MarketId::new(id))
    }
}

impl LedgerStore for MemoryStore {
    async fn commit(&self, batch: WriteBatch) -> Result<()> {
        let mut records = self.records.write();
        for account in batch.accounts() {
            records
                .accounts
                .insert(account.username().clone(), account.clone());
        }
        for market in batch.markets() {
            records.markets.insert(market.id(), market.clone());
        }
        Ok(())
    }
}
