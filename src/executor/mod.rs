//! The statement execution pipeline.
//!
//! [`Executor`] is the seam the explain interceptor decorates. It exposes the
//! three operation shapes that get shadowed ([`OperationKind`]) plus access to
//! the shared [`Transaction`].

mod cache_key;
mod simple;

pub use cache_key::CacheKey;
pub use simple::SimpleExecutor;

use std::fmt;

use async_trait::async_trait;

use crate::driver::Row;
use crate::error::Result;
use crate::mapping::{BoundSql, MappedStatement};
use crate::param::Parameter;
use crate::transaction::Transaction;

/// Pagination applied while reading query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowBounds {
    pub offset: usize,
    pub limit: usize,
}

impl RowBounds {
    pub const DEFAULT: RowBounds = RowBounds {
        offset: 0,
        limit: usize::MAX,
    };

    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }
}

impl Default for RowBounds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Receives query rows one by one instead of collecting them.
pub trait ResultHandler: Send {
    fn handle_row(&mut self, row: Row);
}

impl<F> ResultHandler for F
where
    F: FnMut(Row) + Send,
{
    fn handle_row(&mut self, row: Row) {
        self(row)
    }
}

/// The executor operations that get shadowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    QueryWithCacheKey,
    Update,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query => write!(f, "query"),
            Self::QueryWithCacheKey => write!(f, "query_with_cache_key"),
            Self::Update => write!(f, "update"),
        }
    }
}

/// Runs mapped statements on a transaction.
#[async_trait]
pub trait Executor: Send {
    /// Run a row query. When `handler` is given, rows go to it and the
    /// returned list is empty.
    async fn query(
        &mut self,
        ms: &MappedStatement,
        parameter: &Parameter,
        bounds: RowBounds,
        handler: Option<&mut dyn ResultHandler>,
    ) -> Result<Vec<Row>>;

    /// Run a row query with a precomputed cache key and bound SQL.
    async fn query_with_cache_key(
        &mut self,
        ms: &MappedStatement,
        parameter: &Parameter,
        bounds: RowBounds,
        handler: Option<&mut dyn ResultHandler>,
        cache_key: &CacheKey,
        bound_sql: &BoundSql,
    ) -> Result<Vec<Row>>;

    /// Run a mutating statement and return the number of affected rows.
    async fn update(&mut self, ms: &MappedStatement, parameter: &Parameter) -> Result<u64>;

    fn create_cache_key(
        &self,
        ms: &MappedStatement,
        parameter: &Parameter,
        bounds: RowBounds,
        bound_sql: &BoundSql,
    ) -> Result<CacheKey>;

    /// The transaction statements run under.
    fn transaction(&mut self) -> &mut dyn Transaction;

    async fn commit(&mut self) -> Result<()>;

    async fn rollback(&mut self) -> Result<()>;
}
