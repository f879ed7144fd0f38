//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests). Provides concise factories for ledgers seeded
//! with funded accounts so tests focus on assertions rather than
//! registration boilerplate.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::config::LedgerConfig;
use crate::domain::{Account, Profile, Username};
use crate::ledger::LedgerEngine;
use crate::store::{LedgerStore, MemoryStore, WriteBatch};

/// Create a [`Username`] from a string.
pub fn user(name: &str) -> Username {
    Username::new(name)
}

/// An in-memory ledger with the given starting balance for new accounts.
pub fn memory_ledger(starting_balance: Decimal) -> LedgerEngine<MemoryStore> {
    let config = LedgerConfig {
        lock_timeout_ms: 500,
        starting_balance,
    };
    LedgerEngine::new(Arc::new(MemoryStore::new()), config)
}

/// An in-memory ledger seeded with accounts at the given balances.
pub async fn seeded_ledger(balances: &[(&str, Decimal)]) -> LedgerEngine<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    for (name, balance) in balances {
        let mut batch = WriteBatch::new();
        batch.put_account(Account::new(user(name), Profile::default(), *balance));
        store.commit(batch).await.expect("seed account in test setup");
    }
    let config = LedgerConfig {
        lock_timeout_ms: 500,
        starting_balance: Decimal::ZERO,
    };
    LedgerEngine::new(store, config)
}
