//! Configuration loading and validation.
//!
//! Settings are loaded from a TOML file. Every section has a `Default`
//! so an empty file yields a working in-memory configuration.

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::ConfigError;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub ledger: LedgerConfig,
    pub logging: LoggingConfig,
}

/// Durable storage settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database path, or ":memory:" for an ephemeral database.
    pub database_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: "microbet.db".into(),
        }
    }
}

/// Ledger engine knobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Bound on per-record lock waits; exceeding it surfaces `Busy`.
    pub lock_timeout_ms: u64,
    /// Balance granted to newly registered accounts.
    pub starting_balance: Decimal,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: 2_000,
            starting_balance: Decimal::ZERO,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

impl LoggingConfig {
    /// Initialize the tracing subscriber with this logging configuration.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Initialize logging per the `[logging]` section.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.database_url.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "storage.database_url",
            });
        }
        if self.ledger.lock_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ledger.lock_timeout_ms",
                reason: "must be positive".into(),
            });
        }
        if self.ledger.starting_balance < Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "ledger.starting_balance",
                reason: format!("must be non-negative, got {}", self.ledger.starting_balance),
            });
        }
        Ok(())
    }
}
