//! # SQLite Database methods
//!
//! This module contains "low-level" SQLite database interactions.
//!
//! All these interactions are simple functions that accept a `&mut SqliteConnection` argument. Callers can obtain a
//! connection from a pool, or open a transaction and pass `&mut tx` instead, without any other changes.
//!
//! SQLite transactions start deferred, so two transactions that both read before writing can deadlock on the lock
//! upgrade. Every mutating transaction in [`super::SqliteDatabase`] therefore opens with a write statement.
//!
//! Writes that use `RETURNING` must also run inside an explicit transaction. The statement is not stepped to
//! completion once its row has been read, so on a bare connection the implicit commit can land after the call returns
//! and other connections will not see the row yet.
use std::{str::FromStr, time::Duration};

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

use crate::traits::LedgerError;

pub mod balances;
pub mod orders;
pub mod sessions;
pub mod users;
pub mod withdrawals;

const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, LedgerError> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}
