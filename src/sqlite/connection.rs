//! SQLite prepared statements and result sets over sqlx.

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::TryStreamExt;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteConnection, SqliteRow};
use sqlx::{Column, Either, Executor as _, Row as _, Statement as _};

use crate::driver::{PreparedStatement, ResultSet, ResultSetMetadata};
use crate::error::{ExplainError, Result};
use crate::param::Value;

/// A statement prepared on a borrowed SQLite connection.
pub struct SqlitePreparedStatement<'c> {
    conn: &'c mut SqliteConnection,
    sql: String,
    params: Vec<Option<Value>>,
    metadata: ResultSetMetadata,
}

impl<'c> SqlitePreparedStatement<'c> {
    /// Prepare `sql` so syntax errors and unknown tables surface here rather
    /// than at execution.
    pub async fn prepare(conn: &'c mut SqliteConnection, sql: &str) -> Result<Self> {
        let (labels, parameter_count) = {
            let statement = (&mut *conn)
                .prepare(sql)
                .await
                .map_err(|e| ExplainError::Prepare(e.to_string()))?;
            let labels: Vec<String> = statement
                .columns()
                .iter()
                .map(|c| c.name().to_string())
                .collect();
            let parameter_count = match statement.parameters() {
                Some(Either::Left(types)) => types.len(),
                Some(Either::Right(n)) => n,
                None => 0,
            };
            (labels, parameter_count)
        };
        trace!("Prepared [{}] with {} parameters", sql, parameter_count);

        Ok(Self {
            conn,
            sql: sql.to_string(),
            params: vec![None; parameter_count],
            metadata: ResultSetMetadata::new(labels),
        })
    }

    pub fn parameter_count(&self) -> usize {
        self.params.len()
    }
}

#[async_trait]
impl<'c> PreparedStatement for SqlitePreparedStatement<'c> {
    fn set_parameter(&mut self, index: usize, value: &Value) -> Result<()> {
        let count = self.params.len();
        let slot = index
            .checked_sub(1)
            .and_then(|i| self.params.get_mut(i))
            .ok_or_else(|| {
                ExplainError::Binding(format!(
                    "Parameter index {} out of range (statement has {} parameters)",
                    index, count
                ))
            })?;
        *slot = Some(value.clone());
        Ok(())
    }

    async fn execute_query<'s>(&'s mut self) -> Result<Box<dyn ResultSet + 's>> {
        let query = bind_query(&self.sql, &self.params)?;
        let rows = query.fetch(&mut *self.conn);
        Ok(Box::new(SqliteResultSet {
            rows,
            metadata: self.metadata.clone(),
        }))
    }

    async fn execute_update(&mut self) -> Result<u64> {
        let query = bind_query(&self.sql, &self.params)?;
        let done = query
            .execute(&mut *self.conn)
            .await
            .map_err(|e| ExplainError::Execution(e.to_string()))?;
        Ok(done.rows_affected())
    }
}

fn bind_query<'q>(
    sql: &'q str,
    params: &[Option<Value>],
) -> Result<Query<'q, Sqlite, SqliteArguments<'q>>> {
    let mut query = sqlx::query(sql);
    for (i, param) in params.iter().enumerate() {
        let value = param.clone().ok_or_else(|| {
            ExplainError::Binding(format!("No value bound for parameter {}", i + 1))
        })?;
        query = match value {
            Value::Null => query.bind(None::<String>),
            Value::Integer(v) => query.bind(v),
            Value::Real(v) => query.bind(v),
            Value::Text(v) => query.bind(v),
            Value::Blob(v) => query.bind(v),
            Value::Boolean(v) => query.bind(v),
        };
    }
    Ok(query)
}

/// Streaming rows of an executing query.
pub struct SqliteResultSet<'s> {
    rows: BoxStream<'s, std::result::Result<SqliteRow, sqlx::Error>>,
    metadata: ResultSetMetadata,
}

#[async_trait]
impl<'s> ResultSet for SqliteResultSet<'s> {
    fn metadata(&self) -> &ResultSetMetadata {
        &self.metadata
    }

    async fn next(&mut self) -> Result<Option<Vec<Value>>> {
        let Some(row) = self
            .rows
            .try_next()
            .await
            .map_err(|e| ExplainError::Execution(e.to_string()))?
        else {
            return Ok(None);
        };

        if self.metadata.column_count() == 0 && !row.columns().is_empty() {
            self.metadata = ResultSetMetadata::new(
                row.columns().iter().map(|c| c.name().to_string()).collect(),
            );
        }

        (0..row.len())
            .map(|i| decode_value(&row, i))
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }
}

/// Decode by storage class: the first type the value converts to wins.
fn decode_value(row: &SqliteRow, index: usize) -> Result<Value> {
    let value = if let Ok(val) = row.try_get::<Option<i64>, _>(index) {
        val.map_or(Value::Null, Value::Integer)
    } else if let Ok(val) = row.try_get::<f64, _>(index) {
        Value::Real(val)
    } else if let Ok(val) = row.try_get::<String, _>(index) {
        Value::Text(val)
    } else if let Ok(val) = row.try_get::<Vec<u8>, _>(index) {
        Value::Blob(val)
    } else {
        return Err(ExplainError::Execution(format!(
            "Unable to convert column {} of type {}",
            index + 1,
            row.columns()
                .get(index)
                .map(|c| c.type_info().to_string())
                .unwrap_or_default()
        )));
    };
    Ok(value)
}
