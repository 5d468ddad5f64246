//! Mapped statements and the parameter handler that binds them.

use std::fmt;
use std::sync::Arc;

use crate::driver::PreparedStatement;
use crate::error::{ExplainError, Result};
use crate::log::{StatementLog, TracingLog};
use crate::param::{Parameter, Value};

use super::sql_source::{BoundSql, SqlSource};

/// How a statement is sent to the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatementType {
    Statement,
    #[default]
    Prepared,
    /// Stored procedure call; never shadowed.
    Callable,
}

/// SQL command type of a mapped statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlCommandType {
    Select,
    Insert,
    Update,
    Delete,
    Unknown,
}

impl SqlCommandType {
    /// Detect command type from the first keyword of a SQL string.
    pub fn from_sql(sql: &str) -> Self {
        let first_word = sql
            .trim_start()
            .split(|c: char| c.is_whitespace() || c == '(')
            .next()
            .unwrap_or("")
            .to_uppercase();

        match first_word.as_str() {
            "SELECT" | "WITH" | "VALUES" => Self::Select,
            "INSERT" | "REPLACE" => Self::Insert,
            "UPDATE" => Self::Update,
            "DELETE" => Self::Delete,
            _ => Self::Unknown,
        }
    }
}

/// A registered statement: SQL source plus everything needed to run and trace it.
pub struct MappedStatement {
    id: String,
    sql_source: SqlSource,
    statement_type: StatementType,
    command_type: SqlCommandType,
    database_id: Option<String>,
    statement_log: Arc<dyn StatementLog>,
}

impl fmt::Debug for MappedStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappedStatement")
            .field("id", &self.id)
            .field("sql", &self.sql_source.bound_sql().sql())
            .field("statement_type", &self.statement_type)
            .field("command_type", &self.command_type)
            .field("database_id", &self.database_id)
            .finish()
    }
}

impl MappedStatement {
    pub fn builder(
        id: impl Into<String>,
        sql: impl Into<String>,
        command_type: SqlCommandType,
    ) -> MappedStatementBuilder {
        MappedStatementBuilder {
            id: id.into(),
            sql: sql.into(),
            command_type,
            statement_type: StatementType::default(),
            database_id: None,
            statement_log: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn statement_type(&self) -> StatementType {
        self.statement_type
    }

    pub fn command_type(&self) -> SqlCommandType {
        self.command_type
    }

    pub fn database_id(&self) -> Option<&str> {
        self.database_id.as_deref()
    }

    pub fn statement_log(&self) -> &dyn StatementLog {
        self.statement_log.as_ref()
    }

    /// SQL after placeholder resolution.
    pub fn bound_sql(&self) -> &BoundSql {
        self.sql_source.bound_sql()
    }

    /// Create the binder the pipeline uses for this statement and parameter.
    pub fn new_parameter_handler<'a>(
        &'a self,
        parameter: &'a Parameter,
        bound_sql: &'a BoundSql,
    ) -> ParameterHandler<'a> {
        ParameterHandler {
            statement_id: &self.id,
            parameter,
            bound_sql,
        }
    }
}

/// Builder for [`MappedStatement`].
pub struct MappedStatementBuilder {
    id: String,
    sql: String,
    command_type: SqlCommandType,
    statement_type: StatementType,
    database_id: Option<String>,
    statement_log: Option<Arc<dyn StatementLog>>,
}

impl MappedStatementBuilder {
    pub fn statement_type(mut self, statement_type: StatementType) -> Self {
        self.statement_type = statement_type;
        self
    }

    pub fn database_id(mut self, database_id: Option<String>) -> Self {
        self.database_id = database_id;
        self
    }

    /// Inject the log sink. Defaults to a [`TracingLog`] named after the statement id.
    pub fn statement_log(mut self, log: Arc<dyn StatementLog>) -> Self {
        self.statement_log = Some(log);
        self
    }

    pub fn build(self) -> Result<MappedStatement> {
        if self.id.trim().is_empty() {
            return Err(ExplainError::Mapping(
                "Statement id must not be empty".to_string(),
            ));
        }
        let sql_source = SqlSource::parse(&self.sql)?;
        let statement_log = self
            .statement_log
            .unwrap_or_else(|| Arc::new(TracingLog::new(self.id.clone())));
        Ok(MappedStatement {
            id: self.id,
            sql_source,
            statement_type: self.statement_type,
            command_type: self.command_type,
            database_id: self.database_id,
            statement_log,
        })
    }
}

/// Binds a parameter object onto a prepared statement, one placeholder at a time.
///
/// The executor and the explain shadow both bind through this type, so the
/// diagnostic statement receives exactly the values, positions and types the
/// primary statement did.
pub struct ParameterHandler<'a> {
    statement_id: &'a str,
    parameter: &'a Parameter,
    bound_sql: &'a BoundSql,
}

impl ParameterHandler<'_> {
    /// Resolve the value of every placeholder, in order.
    pub fn values(&self) -> Result<Vec<Value>> {
        self.bound_sql
            .parameter_mappings()
            .iter()
            .map(|mapping| {
                self.parameter.lookup(&mapping.property).ok_or_else(|| {
                    ExplainError::Binding(format!(
                        "No value for parameter '{}' in statement '{}'",
                        mapping.property, self.statement_id
                    ))
                })
            })
            .collect()
    }

    pub fn set_parameters(&self, statement: &mut dyn PreparedStatement) -> Result<()> {
        for (i, value) in self.values()?.iter().enumerate() {
            statement.set_parameter(i + 1, value)?;
        }
        Ok(())
    }
}
