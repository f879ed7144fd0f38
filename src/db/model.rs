//! Database row types for Diesel ORM.
//!
//! Nested collections (stakes, pools, resolution) are stored as JSON
//! text columns; timestamps as RFC 3339 text; monetary amounts as
//! decimal strings to avoid float drift.

use diesel::prelude::*;

use super::schema::{accounts, counters, markets};

/// Database row for an account.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AccountRow {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub joined_at: Option<String>,
    pub balance: String,
    pub stakes: String,
    pub created_markets: String,
    pub resolved_markets: String,
}

/// Database row for a market.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = markets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MarketRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: String,
    pub ends_at: Option<String>,
    pub resolver: String,
    pub status: String,
    pub yes_pool: String,
    pub no_pool: String,
    pub resolution: Option<String>,
}

/// Database row for a named monotonic counter.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = counters)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CounterRow {
    pub name: String,
    pub value: i64,
}
