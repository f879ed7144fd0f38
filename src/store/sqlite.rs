//! SQLite store implementation using Diesel.

use std::ops::DerefMut;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;

use super::{AccountStore, LedgerStore, MarketStore, WriteBatch};
use crate::db::model::{AccountRow, MarketRow};
use crate::db::schema::{accounts, counters, markets};
use crate::db::DbPool;
use crate::domain::{
    Account, Market, MarketId, MarketStatus, Outcome, Profile, Resolution, Stake, Username,
};
use crate::error::{LedgerError, Result};

/// SQLite-backed ledger store.
///
/// Batch commits run inside a single SQLite transaction, so a failed
/// write rolls back every record in the batch.
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    /// Create a new SQLite ledger store over an initialized pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Open a store: create the pool and run pending migrations.
    pub fn open(database_url: &str) -> Result<Self> {
        let pool = crate::db::create_pool(database_url)?;
        crate::db::run_migrations(&pool)?;
        Ok(Self::new(pool))
    }

    fn conn(&self) -> Result<impl DerefMut<Target = SqliteConnection>> {
        self.pool
            .get()
            .map_err(|e| LedgerError::Connection(e.to_string()))
    }

    fn to_account_row(account: &Account) -> Result<AccountRow> {
        Ok(AccountRow {
            username: account.username().to_string(),
            full_name: account.profile.full_name.clone(),
            email: account.profile.email.clone(),
            joined_at: account.profile.joined_at.map(|t| t.to_rfc3339()),
            balance: account.balance().to_string(),
            stakes: serde_json::to_string(account.stakes())?,
            created_markets: serde_json::to_string(&account.created_markets)?,
            resolved_markets: serde_json::to_string(&account.resolved_markets)?,
        })
    }

    fn from_account_row(row: AccountRow) -> Result<Account> {
        let joined_at = row.joined_at.as_deref().map(parse_timestamp).transpose()?;
        let balance = parse_decimal(&row.balance)?;
        let stakes: Vec<Stake> = serde_json::from_str(&row.stakes)?;
        let created_markets: Vec<MarketId> = serde_json::from_str(&row.created_markets)?;
        let resolved_markets: Vec<MarketId> = serde_json::from_str(&row.resolved_markets)?;

        Ok(Account::from_parts(
            Username::new(row.username),
            Profile {
                full_name: row.full_name,
                email: row.email,
                joined_at,
            },
            balance,
            stakes,
            created_markets,
            resolved_markets,
        ))
    }

    fn to_market_row(market: &Market) -> Result<MarketRow> {
        Ok(MarketRow {
            id: market.id().value() as i64,
            name: market.name.clone(),
            description: market.description.clone(),
            created_at: market.created_at.to_rfc3339(),
            ends_at: market.ends_at.map(|t| t.to_rfc3339()),
            resolver: market.resolver().to_string(),
            status: match market.status() {
                MarketStatus::Open => "open".to_string(),
                MarketStatus::Resolved => "resolved".to_string(),
            },
            yes_pool: serde_json::to_string(market.pool_stakes(Outcome::Yes))?,
            no_pool: serde_json::to_string(market.pool_stakes(Outcome::No))?,
            resolution: market
                .resolution()
                .map(serde_json::to_string)
                .transpose()?,
        })
    }

    fn from_market_row(row: MarketRow) -> Result<Market> {
        let status = match row.status.as_str() {
            "open" => MarketStatus::Open,
            "resolved" => MarketStatus::Resolved,
            other => {
                return Err(LedgerError::Storage(format!(
                    "unknown market status '{other}' for market {}",
                    row.id
                )))
            }
        };
        let created_at = parse_timestamp(&row.created_at)?;
        let ends_at = row.ends_at.as_deref().map(parse_timestamp).transpose()?;
        let yes_stakes: Vec<Stake> = serde_json::from_str(&row.yes_pool)?;
        let no_stakes: Vec<Stake> = serde_json::from_str(&row.no_pool)?;
        let resolution: Option<Resolution> = row
            .resolution
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;

        Ok(Market::from_parts(
            MarketId::new(row.id as u64),
            row.name,
            row.description,
            created_at,
            ends_at,
            Username::new(row.resolver),
            status,
            yes_stakes,
            no_stakes,
            resolution,
        ))
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| LedgerError::Storage(format!("bad timestamp '{raw}': {e}")))
}

fn parse_decimal(raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw).map_err(|e| LedgerError::Storage(format!("bad amount '{raw}': {e}")))
}

impl AccountStore for SqliteStore {
    async fn load_account(&self, username: &Username) -> Result<Option<Account>> {
        let mut conn = self.conn()?;
        let row: Option<AccountRow> = accounts::table
            .find(username.as_str())
            .first(&mut *conn)
            .optional()
            .map_err(|e| LedgerError::Storage(e.to_string()))?;

        row.map(Self::from_account_row).transpose()
    }

    async fn account_exists(&self, username: &Username) -> Result<bool> {
        let mut conn = self.conn()?;
        let count: i64 = accounts::table
            .filter(accounts::username.eq(username.as_str()))
            .count()
            .get_result(&mut *conn)
            .map_err(|e| LedgerError::Storage(e.to_string()))?;
        Ok(count > 0)
    }

    async fn usernames(&self) -> Result<Vec<Username>> {
        let mut conn = self.conn()?;
        let names: Vec<String> = accounts::table
            .select(accounts::username)
            .load(&mut *conn)
            .map_err(|e| LedgerError::Storage(e.to_string()))?;
        Ok(names.into_iter().map(Username::new).collect())
    }
}

impl MarketStore for SqliteStore {
    async fn load_market(&self, id: MarketId) -> Result<Option<Market>> {
        let mut conn = self.conn()?;
        let row: Option<MarketRow> = markets::table
            .find(id.value() as i64)
            .first(&mut *conn)
            .optional()
            .map_err(|e| LedgerError::Storage(e.to_string()))?;

        row.map(Self::from_market_row).transpose()
    }

    async fn list_markets(&self) -> Result<Vec<Market>> {
        let mut conn = self.conn()?;
        let rows: Vec<MarketRow> = markets::table
            .order(markets::id.asc())
            .load(&mut *conn)
            .map_err(|e| LedgerError::Storage(e.to_string()))?;

        rows.into_iter().map(Self::from_market_row).collect()
    }

    async fn allocate_market_id(&self) -> Result<MarketId> {
        let mut conn = self.conn()?;
        conn.immediate_transaction(|conn| {
            diesel::update(counters::table.find("market_id"))
                .set(counters::value.eq(counters::value + 1))
                .execute(conn)?;
            let value: i64 = counters::table
                .find("market_id")
                .select(counters::value)
                .first(conn)?;
            Ok(MarketId::new(value as u64))
        })
    }
}

impl LedgerStore for SqliteStore {
    async fn commit(&self, batch: WriteBatch) -> Result<()> {
        // Row conversion happens outside the transaction so a
        // serialization failure cannot leave a partial batch behind.
        let account_rows = batch
            .accounts()
            .iter()
            .map(Self::to_account_row)
            .collect::<Result<Vec<_>>>()?;
        let market_rows = batch
            .markets()
            .iter()
            .map(Self::to_market_row)
            .collect::<Result<Vec<_>>>()?;

        let mut conn = self.conn()?;
        conn.immediate_transaction(|conn| {
            for row in &account_rows {
                diesel::replace_into(accounts::table)
                    .values(row)
                    .execute(conn)?;
            }
            for row in &market_rows {
                diesel::replace_into(markets::table)
                    .values(row)
                    .execute(conn)?;
            }
            Ok(())
        })
    }
}
