//! Storage-agnostic domain logic.

mod account;
mod ids;
mod market;
mod outcome;
mod stake;

pub mod odds;
pub mod settlement;

// Core domain types
pub use account::{Account, Profile};
pub use ids::{MarketId, Username};
pub use market::{Market, MarketStatus, Pool, Resolution};
pub use outcome::Outcome;
pub use stake::Stake;

// Pure components
pub use odds::{implied_odds, OddsPair};
pub use settlement::{Payout, ProportionalPayout, SettlementPolicy};
