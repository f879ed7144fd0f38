//! Microbet - Market ledger and settlement engine.
//!
//! The authoritative core of a peer-to-peer micro-betting platform:
//! users hold a balance, open binary prediction markets, stake money on
//! an outcome, and a resolver settles the market, redistributing the
//! losing pool to winners pro-rata with no house edge.
//!
//! # Architecture
//!
//! - [`domain`] - Storage-agnostic types: accounts, markets, stakes,
//!   the two-variant [`domain::Outcome`], plus the pure odds and
//!   settlement computations
//! - [`store`] - Pluggable persistence behind the [`store::LedgerStore`]
//!   capability: [`store::MemoryStore`] for tests and ephemeral
//!   ledgers, [`store::SqliteStore`] for durable state
//! - [`ledger`] - [`ledger::LedgerEngine`], the transaction layer:
//!   per-record locking in a fixed global order, bounded lock waits,
//!   atomic batch commits
//! - [`config`] - TOML configuration and logging setup
//! - [`error`] - Error taxonomy for the crate
//!
//! # Guarantees
//!
//! Money is conserved: placing a bet moves an amount from a balance
//! into a pool, and settlement redistributes the combined pool to
//! winners exactly. Transactions are atomic (a failed durable write
//! leaves no partial state) and serialized per record, so concurrent
//! bets cannot lose updates or double-spend a balance.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use microbet::config::LedgerConfig;
//! use microbet::domain::{Outcome, Profile, Username};
//! use microbet::ledger::LedgerEngine;
//! use microbet::store::MemoryStore;
//! use rust_decimal_macros::dec;
//!
//! # async fn run() -> microbet::error::Result<()> {
//! let config = LedgerConfig {
//!     starting_balance: dec!(100),
//!     ..Default::default()
//! };
//! let ledger = LedgerEngine::new(Arc::new(MemoryStore::new()), config);
//!
//! ledger.create_account(Username::new("alice"), Profile::default()).await?;
//! ledger.create_account(Username::new("bob"), Profile::default()).await?;
//!
//! let market = ledger
//!     .create_market("Will it rain tomorrow?", "", None, Username::new("bob"))
//!     .await?;
//! ledger
//!     .place_bet(market.id(), Username::new("alice"), Outcome::Yes, dec!(40), None)
//!     .await?;
//! ledger
//!     .resolve_market(market.id(), Username::new("bob"), Outcome::Yes, None)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod ledger;
pub mod store;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
