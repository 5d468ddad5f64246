//! Mapped statements and their SQL sources.
//!
//! A [`MappedStatement`] is registered once (id, SQL with `#{name}`
//! placeholders, statement kind, database id, log sink) and then executed any
//! number of times with different [`Parameter`](crate::param::Parameter)s.

mod sql_source;
mod statement;

pub use sql_source::{BoundSql, ParameterMapping, SqlSource};
pub use statement::{
    MappedStatement, MappedStatementBuilder, ParameterHandler, SqlCommandType, StatementType,
};
