//! SQLite driver backed by sqlx.
//!
//! [`open_pool`] builds a pool; [`SqliteTransaction`] hands out one live
//! connection from it that every statement (primary and EXPLAIN) shares.

mod connection;
mod transaction;

pub use connection::{SqlitePreparedStatement, SqliteResultSet};
pub use transaction::SqliteTransaction;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::error::{ExplainError, Result};

/// Open a pool for `url` (e.g. `sqlite::memory:` or `sqlite://app.db`).
///
/// In-memory databases live as long as their single connection, so the pool
/// is capped at one connection that is never reaped.
pub async fn open_pool(url: &str) -> Result<SqlitePool> {
    let in_memory = url.contains(":memory:") || url.contains("mode=memory");
    let options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(4)
    };

    let pool = options
        .connect(url)
        .await
        .map_err(|e| ExplainError::Connection(format!("SQLite connection failed: {}", e)))?;
    info!("Opened SQLite pool for {}", url);
    Ok(pool)
}
