//! Executor that prepares a new statement per call, with a local result cache.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::driver::Row;
use crate::error::Result;
use crate::mapping::{BoundSql, MappedStatement};
use crate::param::{Parameter, Value};
use crate::transaction::Transaction;

use super::{CacheKey, Executor, ResultHandler, RowBounds};

/// Executor that prepares a fresh statement for every call.
///
/// Collected query results are kept in a per-executor local cache keyed by
/// [`CacheKey`]; any update, commit or rollback clears it.
pub struct SimpleExecutor<T> {
    transaction: T,
    local_cache: HashMap<CacheKey, Vec<Row>>,
}

impl<T: Transaction> SimpleExecutor<T> {
    pub fn new(transaction: T) -> Self {
        Self {
            transaction,
            local_cache: HashMap::new(),
        }
    }

    pub fn into_transaction(self) -> T {
        self.transaction
    }

    async fn do_query(
        &mut self,
        ms: &MappedStatement,
        parameter: &Parameter,
        bounds: RowBounds,
        mut handler: Option<&mut dyn ResultHandler>,
        bound_sql: &BoundSql,
    ) -> Result<Vec<Row>> {
        let log = ms.statement_log();
        let binder = ms.new_parameter_handler(parameter, bound_sql);
        if log.is_debug_enabled() {
            log.debug(&format!("==>  Preparing: {}", bound_sql.sql()));
            log.debug(&format!("==> Parameters: {}", describe_values(&binder.values()?)));
        }

        let connection = self.transaction.connection().await?;
        let mut statement = connection.prepare_statement(bound_sql.sql()).await?;
        binder.set_parameters(&mut *statement)?;
        let mut results = statement.execute_query().await?;

        let mut rows = Vec::new();
        let mut skipped = 0;
        let mut total = 0;
        while total < bounds.limit {
            let Some(values) = results.next().await? else {
                break;
            };
            if skipped < bounds.offset {
                skipped += 1;
                continue;
            }
            let row = Row::new(results.metadata().clone(), values);
            match handler.as_mut() {
                Some(h) => h.handle_row(row),
                None => rows.push(row),
            }
            total += 1;
        }

        if log.is_debug_enabled() {
            log.debug(&format!("<==      Total: {}", total));
        }
        Ok(rows)
    }
}

#[async_trait]
impl<T: Transaction> Executor for SimpleExecutor<T> {
    async fn query(
        &mut self,
        ms: &MappedStatement,
        parameter: &Parameter,
        bounds: RowBounds,
        handler: Option<&mut dyn ResultHandler>,
    ) -> Result<Vec<Row>> {
        let bound_sql = ms.bound_sql();
        let cache_key = self.create_cache_key(ms, parameter, bounds, bound_sql)?;
        self.query_with_cache_key(ms, parameter, bounds, handler, &cache_key, bound_sql)
            .await
    }

    async fn query_with_cache_key(
        &mut self,
        ms: &MappedStatement,
        parameter: &Parameter,
        bounds: RowBounds,
        handler: Option<&mut dyn ResultHandler>,
        cache_key: &CacheKey,
        bound_sql: &BoundSql,
    ) -> Result<Vec<Row>> {
        if handler.is_some() {
            return self
                .do_query(ms, parameter, bounds, handler, bound_sql)
                .await;
        }

        if let Some(rows) = self.local_cache.get(cache_key) {
            trace!("Local cache hit for {}", ms.id());
            return Ok(rows.clone());
        }

        let rows = self
            .do_query(ms, parameter, bounds, None, bound_sql)
            .await?;
        self.local_cache.insert(cache_key.clone(), rows.clone());
        Ok(rows)
    }

    async fn update(&mut self, ms: &MappedStatement, parameter: &Parameter) -> Result<u64> {
        self.local_cache.clear();

        let log = ms.statement_log();
        let bound_sql = ms.bound_sql();
        let binder = ms.new_parameter_handler(parameter, bound_sql);
        if log.is_debug_enabled() {
            log.debug(&format!("==>  Preparing: {}", bound_sql.sql()));
            log.debug(&format!("==> Parameters: {}", describe_values(&binder.values()?)));
        }

        let connection = self.transaction.connection().await?;
        let mut statement = connection.prepare_statement(bound_sql.sql()).await?;
        binder.set_parameters(&mut *statement)?;
        let updated = statement.execute_update().await?;

        if log.is_debug_enabled() {
            log.debug(&format!("<==    Updates: {}", updated));
        }
        Ok(updated)
    }

    fn create_cache_key(
        &self,
        ms: &MappedStatement,
        parameter: &Parameter,
        bounds: RowBounds,
        bound_sql: &BoundSql,
    ) -> Result<CacheKey> {
        let mut key = CacheKey::new();
        key.update(ms.id());
        key.update(bounds.offset);
        key.update(bounds.limit);
        key.update(bound_sql.sql());
        for value in ms.new_parameter_handler(parameter, bound_sql).values()? {
            key.update(format!("{:?}", value));
        }
        Ok(key)
    }

    fn transaction(&mut self) -> &mut dyn Transaction {
        &mut self.transaction
    }

    async fn commit(&mut self) -> Result<()> {
        self.local_cache.clear();
        self.transaction.commit().await
    }

    async fn rollback(&mut self) -> Result<()> {
        self.local_cache.clear();
        self.transaction.rollback().await
    }
}

/// `1(Integer), Alice(Text), null`
fn describe_values(values: &[Value]) -> String {
    values
        .iter()
        .map(|v| match v {
            Value::Null => "null".to_string(),
            other => format!("{}({})", other, other.type_name()),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
