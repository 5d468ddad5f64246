//! EXPLAIN shadowing for a SQL statement executor.
//!
//! Every query or update that goes through an [`ExplainInterceptor`] is
//! followed by an `EXPLAIN` of the same SQL, with the same parameters, on
//! the same transaction. The plan is written to the statement's debug log and
//! never changes what the caller sees.
//!
//! ```no_run
//! use std::sync::Arc;
//! use shadow_explain::{Configuration, Parameter, SqlCommandType, SqlSession};
//! use shadow_explain::sqlite::{open_pool, SqliteTransaction};
//!
//! # async fn demo() -> shadow_explain::Result<()> {
//! let mut config = Configuration::default();
//! let ms = config
//!     .statement_builder("users.by_id", "SELECT * FROM users WHERE id = #{id}", SqlCommandType::Select)
//!     .build()?;
//! config.add_mapped_statement(ms)?;
//!
//! let pool = open_pool("sqlite::memory:").await?;
//! let mut session = SqlSession::open(Arc::new(config), SqliteTransaction::new(pool));
//! let rows = session.select_list("users.by_id", &Parameter::from(1)).await?;
//! # let _ = rows;
//! # Ok(())
//! # }
//! ```

#[macro_use]
mod logging;

pub mod config;
pub mod dialect;
pub mod driver;
pub mod error;
pub mod executor;
pub mod explain;
pub mod interceptor;
pub mod log;
pub mod mapping;
pub mod param;
pub mod session;
pub mod sqlite;
pub mod transaction;

pub use config::{Config, Configuration, ExplainConfig};
pub use dialect::DatabaseType;
pub use driver::{Connection, PreparedStatement, ResultSet, ResultSetMetadata, Row};
pub use error::{ExplainError, Result};
pub use executor::{CacheKey, Executor, ResultHandler, RowBounds, SimpleExecutor};
pub use explain::{ExplainShadow, PlanRow, ShadowOutcome, PLAN_MARKER};
pub use interceptor::{ExplainInterceptor, ShadowPolicy};
pub use log::{LogImpl, StatementLog};
pub use mapping::{BoundSql, MappedStatement, SqlCommandType, StatementType};
pub use param::{Parameter, Value};
pub use session::SqlSession;
pub use transaction::Transaction;
