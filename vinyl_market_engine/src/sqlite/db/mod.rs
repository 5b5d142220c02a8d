//! # SQLite Database methods
//!
//! Low-level SQLite queries, written as free functions that accept a `&mut SqliteConnection`. Callers pick the unit
//! of work: pass a pooled connection for a one-off query, or `&mut *tx` to run several calls in one transaction.
use std::env;

use log::info;
use sqlx::{sqlite::SqlitePoolOptions, Error as SqlxError, SqlitePool};

pub mod orders;
pub mod reviews;
pub mod system_logs;
pub mod users;
pub mod vinyls;

const SQLITE_DB_URL: &str = "sqlite://data/vinyl_market.db";

pub fn db_url() -> String {
    let result = env::var("VMS_DATABASE_URL").unwrap_or_else(|_| {
        info!("🗃️ VMS_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("🗃️ Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect(url).await?;
    Ok(pool)
}
