//! Error types for the crate.
//!
//! Every rejected transaction maps to one of four categories (see
//! [`ErrorCategory`]): validation errors are raised before any lock is
//! taken, precondition errors after reads but before any mutation,
//! concurrency errors are transient and retryable, and storage errors
//! are fatal to the transaction that hit them.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::{MarketId, Username};

/// Broad classification of a [`LedgerError`], used by callers to decide
/// on retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed input; rejected before any lock or read. Correct the
    /// input and resubmit.
    Validation,
    /// Input was well-formed but the world disagrees (missing account,
    /// closed market, not enough money). Side-effect-free.
    Precondition,
    /// Lock acquisition timed out. Nothing was applied; safe to retry.
    Concurrency,
    /// Durable write failed. The transaction was rolled back; retry
    /// policy belongs to the caller.
    Storage,
}

/// Errors produced by ledger transactions and the stores beneath them.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid amount {amount}: must be positive")]
    InvalidAmount { amount: Decimal },

    #[error("invalid outcome '{input}': expected yes or no")]
    InvalidOutcome { input: String },

    #[error("username '{username}' is already taken")]
    UsernameTaken { username: Username },

    #[error("unknown account '{username}'")]
    UnknownAccount { username: Username },

    #[error("market {id} not found")]
    MarketNotFound { id: MarketId },

    #[error("market {id} is closed to new bets")]
    MarketClosed { id: MarketId },

    #[error("market {id} is already resolved")]
    MarketAlreadyResolved { id: MarketId },

    #[error("insufficient balance for '{username}': have {balance}, need {requested}")]
    InsufficientBalance {
        username: Username,
        balance: Decimal,
        requested: Decimal,
    },

    #[error("record '{key}' is busy: lock not acquired within {timeout_ms}ms")]
    Busy { key: String, timeout_ms: u64 },

    #[error("database error: {0}")]
    Storage(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl LedgerError {
    /// The error's category per the taxonomy above.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingField { .. }
            | Self::InvalidAmount { .. }
            | Self::InvalidOutcome { .. } => ErrorCategory::Validation,
            Self::UsernameTaken { .. }
            | Self::UnknownAccount { .. }
            | Self::MarketNotFound { .. }
            | Self::MarketClosed { .. }
            | Self::MarketAlreadyResolved { .. }
            | Self::InsufficientBalance { .. } => ErrorCategory::Precondition,
            Self::Busy { .. } => ErrorCategory::Concurrency,
            Self::Storage(_) | Self::Connection(_) | Self::Serialize(_) => ErrorCategory::Storage,
        }
    }

    /// Whether the caller may safely resubmit the same transaction.
    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Concurrency
    }
}

impl From<diesel::result::Error> for LedgerError {
    fn from(e: diesel::result::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Crate-wide result alias.
pub type Result<T, E = LedgerError> = std::result::Result<T, E>;
