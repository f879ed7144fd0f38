//! Per-record lock table for ledger transactions.
//!
//! Every account and market record has an entry keyed by its stable
//! identifier. Writers take the exclusive side, read-only queries the
//! shared side. Acquisition is bounded: exceeding the configured wait
//! surfaces [`LedgerError::Busy`] with nothing applied, so callers can
//! retry.
//!
//! Deadlock freedom comes from a fixed global acquisition order, which
//! [`LockTable::write_set`] enforces: the market lock first, then
//! account locks in username sort order.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};
use tokio::time::timeout;

use crate::domain::{MarketId, Username};
use crate::error::{LedgerError, Result};

/// Stable identity of a lockable record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LockKey {
    Market(MarketId),
    Account(Username),
}

impl fmt::Display for LockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Market(id) => write!(f, "market/{id}"),
            Self::Account(username) => write!(f, "account/{username}"),
        }
    }
}

/// Guards held by an in-flight transaction. Dropping releases every
/// lock, in any order.
pub struct WriteGuards {
    _guards: Vec<OwnedRwLockWriteGuard<()>>,
}

/// Lock table over all ledger records.
pub struct LockTable {
    entries: DashMap<LockKey, Arc<RwLock<()>>>,
    wait: Duration,
}

impl LockTable {
    pub fn new(wait: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            wait,
        }
    }

    fn entry(&self, key: &LockKey) -> Arc<RwLock<()>> {
        self.entries
            .entry(key.clone())
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .value()
            .clone()
    }

    /// Acquire one exclusive lock with a bounded wait.
    pub async fn write(&self, key: LockKey) -> Result<OwnedRwLockWriteGuard<()>> {
        let lock = self.entry(&key);
        timeout(self.wait, lock.write_owned())
            .await
            .map_err(|_| LedgerError::Busy {
                key: key.to_string(),
                timeout_ms: self.wait.as_millis() as u64,
            })
    }

    /// Acquire one shared lock with a bounded wait.
    pub async fn read(&self, key: LockKey) -> Result<OwnedRwLockReadGuard<()>> {
        let lock = self.entry(&key);
        timeout(self.wait, lock.read_owned())
            .await
            .map_err(|_| LedgerError::Busy {
                key: key.to_string(),
                timeout_ms: self.wait.as_millis() as u64,
            })
    }

    /// Acquire exclusive locks for a whole transaction in the fixed
    /// global order: market first, then accounts sorted by username
    /// (deduplicated). On timeout, already-held guards are dropped and
    /// nothing stays locked.
    pub async fn write_set(
        &self,
        market: Option<MarketId>,
        accounts: &[Username],
    ) -> Result<WriteGuards> {
        let mut sorted: Vec<Username> = accounts.to_vec();
        sorted.sort();
        sorted.dedup();

        let mut guards = Vec::with_capacity(sorted.len() + 1);
        if let Some(id) = market {
            guards.push(self.write(LockKey::Market(id)).await?);
        }
        for username in sorted {
            guards.push(self.write(LockKey::Account(username)).await?);
        }
        Ok(WriteGuards { _guards: guards })
    }
}
