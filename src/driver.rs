//! Driver boundary: connections, prepared statements and result sets.
//!
//! These traits are the only way the executor and the explain shadow touch a
//! database. Prepared statements and result sets borrow the connection they
//! came from and are released when dropped, so every exit path (including
//! `?` returns) closes them exactly once.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::param::Value;

/// Column labels of a result set, in ordinal order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSetMetadata {
    labels: Arc<[String]>,
}

impl ResultSetMetadata {
    pub fn new(labels: Vec<String>) -> Self {
        Self {
            labels: labels.into(),
        }
    }

    pub fn column_count(&self) -> usize {
        self.labels.len()
    }

    /// Display label of the column at `index` (zero-based).
    pub fn column_label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

/// A live database connection shared through a [`Transaction`](crate::transaction::Transaction).
#[async_trait]
pub trait Connection: Send {
    /// Prepare `sql` on this connection.
    async fn prepare_statement<'c>(
        &'c mut self,
        sql: &str,
    ) -> Result<Box<dyn PreparedStatement + 'c>>;
}

/// A statement prepared on a connection, awaiting parameters.
#[async_trait]
pub trait PreparedStatement: Send {
    /// Bind `value` to the placeholder at `index` (one-based, as in JDBC).
    fn set_parameter(&mut self, index: usize, value: &Value) -> Result<()>;

    /// Execute as a row-producing query.
    async fn execute_query<'s>(&'s mut self) -> Result<Box<dyn ResultSet + 's>>;

    /// Execute as a mutation and return the number of affected rows.
    async fn execute_update(&mut self) -> Result<u64>;
}

/// Forward-only cursor over the rows of a query.
#[async_trait]
pub trait ResultSet: Send {
    fn metadata(&self) -> &ResultSetMetadata;

    /// Advance to the next row, returning its values in column order.
    async fn next(&mut self) -> Result<Option<Vec<Value>>>;
}

/// One row returned to the caller of a query.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    metadata: ResultSetMetadata,
    values: Vec<Value>,
}

impl Row {
    pub fn new(metadata: ResultSetMetadata, values: Vec<Value>) -> Self {
        Self { metadata, values }
    }

    /// Value of the column labelled `label` (case-insensitive).
    pub fn get(&self, label: &str) -> Option<&Value> {
        self.metadata
            .labels()
            .iter()
            .position(|l| l.eq_ignore_ascii_case(label))
            .and_then(|i| self.values.get(i))
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn metadata(&self) -> &ResultSetMetadata {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
