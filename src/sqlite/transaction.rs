//! Pool-backed transaction holding one live SQLite connection.

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{Sqlite, SqliteConnection, SqlitePool};

use super::SqlitePreparedStatement;
use crate::driver::{Connection, PreparedStatement};
use crate::error::{ExplainError, Result};
use crate::transaction::Transaction;

/// The connection a [`SqliteTransaction`] currently holds.
enum LiveConnection {
    Transaction(sqlx::Transaction<'static, Sqlite>),
    AutoCommit(PoolConnection<Sqlite>),
}

impl LiveConnection {
    fn raw(&mut self) -> &mut SqliteConnection {
        match self {
            Self::Transaction(tx) => &mut **tx,
            Self::AutoCommit(conn) => &mut **conn,
        }
    }
}

#[async_trait]
impl Connection for LiveConnection {
    async fn prepare_statement<'c>(
        &'c mut self,
        sql: &str,
    ) -> Result<Box<dyn PreparedStatement + 'c>> {
        let statement = SqlitePreparedStatement::prepare(self.raw(), sql).await?;
        Ok(Box::new(statement))
    }
}

/// Pool-backed [`Transaction`].
///
/// The connection is acquired lazily on first use and kept until commit or
/// rollback, so every statement in between (EXPLAIN included) runs on it.
/// Dropping an uncommitted transaction rolls it back.
pub struct SqliteTransaction {
    pool: SqlitePool,
    auto_commit: bool,
    connection: Option<LiveConnection>,
}

impl SqliteTransaction {
    /// Statements run inside `BEGIN ... COMMIT/ROLLBACK`.
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            auto_commit: false,
            connection: None,
        }
    }

    /// Every statement commits on its own; commit and rollback only release
    /// the connection.
    pub fn auto_commit(pool: SqlitePool) -> Self {
        Self {
            pool,
            auto_commit: true,
            connection: None,
        }
    }

    pub fn is_auto_commit(&self) -> bool {
        self.auto_commit
    }

    async fn open(&self) -> Result<LiveConnection> {
        let live = if self.auto_commit {
            LiveConnection::AutoCommit(
                self.pool
                    .acquire()
                    .await
                    .map_err(|e| ExplainError::Connection(e.to_string()))?,
            )
        } else {
            LiveConnection::Transaction(
                self.pool
                    .begin()
                    .await
                    .map_err(|e| ExplainError::Connection(e.to_string()))?,
            )
        };
        debug!(
            "Opened {} connection",
            if self.auto_commit { "auto-commit" } else { "transactional" }
        );
        Ok(live)
    }
}

#[async_trait]
impl Transaction for SqliteTransaction {
    async fn connection(&mut self) -> Result<&mut dyn Connection> {
        if self.connection.is_none() {
            self.connection = Some(self.open().await?);
        }
        self.connection
            .as_mut()
            .map(|live| live as &mut dyn Connection)
            .ok_or_else(|| ExplainError::Transaction("no live connection".to_string()))
    }

    fn is_active(&self) -> bool {
        self.connection.is_some()
    }

    async fn commit(&mut self) -> Result<()> {
        if let Some(LiveConnection::Transaction(tx)) = self.connection.take() {
            tx.commit()
                .await
                .map_err(|e| ExplainError::Transaction(e.to_string()))?;
            debug!("Committed transaction");
        }
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        if let Some(LiveConnection::Transaction(tx)) = self.connection.take() {
            tx.rollback()
                .await
                .map_err(|e| ExplainError::Transaction(e.to_string()))?;
            debug!("Rolled back transaction");
        }
        Ok(())
    }
}
