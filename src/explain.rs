//! EXPLAIN shadow execution.
//!
//! After a primary statement has produced its outcome, [`ExplainShadow`]
//! re-issues it as `<dialect prefix><sql>` on the same transaction with the
//! same parameters and writes every plan row to the statement's log:
//!
//! ```text
//! <== ExplainPlan: id=1, select_type=SIMPLE, table=users
//! ```
//!
//! Nothing that happens here is ever returned to the caller. Failures become
//! a single `Failed to execute EXPLAIN` line. An unsupported dialect, or a
//! primary that failed before acquiring a connection, produces no output at
//! all: the shadow never opens a connection of its own.

use std::fmt;
use std::time::Duration;

use crate::dialect::DatabaseType;
use crate::driver::ResultSetMetadata;
use crate::error::{ExplainError, Result};
use crate::log::StatementLog;
use crate::mapping::{BoundSql, MappedStatement, StatementType};
use crate::param::{Parameter, Value};
use crate::transaction::Transaction;

/// Marker every plan line starts with.
pub const PLAN_MARKER: &str = "<== ExplainPlan: ";

/// Terminal state of one shadow attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowOutcome {
    /// Debug logging disabled or statement is callable.
    SkippedIneligible,
    /// The primary failed and the policy only shadows successes.
    SkippedByPolicy,
    /// The dialect has no EXPLAIN prefix.
    SkippedUnsupportedDialect,
    /// The primary never acquired a connection, so there is no transaction
    /// to share.
    SkippedNoConnection,
    /// The plan was logged, one line per row.
    Completed { rows: usize },
    /// The diagnostic statement failed and the failure was logged.
    FailedLogged,
}

/// One row of plan output: `(column label, string value)` pairs in ordinal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanRow {
    columns: Vec<(String, String)>,
}

impl PlanRow {
    pub fn new(metadata: &ResultSetMetadata, values: &[Value]) -> Self {
        let columns = values
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let label = metadata
                    .column_label(i)
                    .map(str::to_string)
                    .unwrap_or_else(|| (i + 1).to_string());
                (label, value.to_string())
            })
            .collect();
        Self { columns }
    }

    pub fn columns(&self) -> &[(String, String)] {
        &self.columns
    }
}

/// A single column prints its bare value; several print as `label=value, ...`.
impl fmt::Display for PlanRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let [(_, value)] = self.columns.as_slice() {
            return f.write_str(value);
        }
        for (i, (label, value)) in self.columns.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", label, value)?;
        }
        Ok(())
    }
}

/// Runs the EXPLAIN variant of a statement and logs its plan.
#[derive(Debug, Clone, Default)]
pub struct ExplainShadow {
    timeout: Option<Duration>,
}

impl ExplainShadow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the diagnostic statement's run time. Requires a tokio runtime
    /// with the time driver enabled.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Debug logging is on for the statement and it is not a procedure call.
    pub fn is_eligible(ms: &MappedStatement) -> bool {
        ms.statement_log().is_debug_enabled() && ms.statement_type() != StatementType::Callable
    }

    /// Check eligibility, then [`execute_explain`](Self::execute_explain).
    pub async fn shadow_explain(
        &self,
        ms: &MappedStatement,
        parameter: &Parameter,
        bound_sql: &BoundSql,
        transaction: &mut dyn Transaction,
    ) -> ShadowOutcome {
        if !Self::is_eligible(ms) {
            return ShadowOutcome::SkippedIneligible;
        }
        self.execute_explain(ms, parameter, bound_sql, transaction)
            .await
    }

    /// Execute EXPLAIN using the same parameters and transaction as the
    /// original statement. Never fails; see [`ShadowOutcome`].
    pub async fn execute_explain(
        &self,
        ms: &MappedStatement,
        parameter: &Parameter,
        bound_sql: &BoundSql,
        transaction: &mut dyn Transaction,
    ) -> ShadowOutcome {
        let Some(prefix) = DatabaseType::from_database_id(ms.database_id()).explain_prefix()
        else {
            return ShadowOutcome::SkippedUnsupportedDialect;
        };
        if !transaction.is_active() {
            return ShadowOutcome::SkippedNoConnection;
        }

        let log = ms.statement_log();
        let explain_sql = format!("{}{}", prefix, bound_sql.sql());
        let run = log_plan(&explain_sql, ms, parameter, bound_sql, transaction, log);

        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, run)
                .await
                .unwrap_or_else(|_| Err(ExplainError::Timeout(limit.as_millis() as u64))),
            None => run.await,
        };

        match result {
            Ok(rows) => ShadowOutcome::Completed { rows },
            Err(e) => {
                log.debug(&format!("{}Failed to execute EXPLAIN: {}", PLAN_MARKER, e));
                ShadowOutcome::FailedLogged
            }
        }
    }
}

/// Prepare, bind, execute and log. The statement and result set are dropped
/// before this returns, on success and on every `?`.
async fn log_plan(
    explain_sql: &str,
    ms: &MappedStatement,
    parameter: &Parameter,
    bound_sql: &BoundSql,
    transaction: &mut dyn Transaction,
    log: &dyn StatementLog,
) -> Result<usize> {
    let connection = transaction.connection().await?;
    let mut statement = connection.prepare_statement(explain_sql).await?;
    ms.new_parameter_handler(parameter, bound_sql)
        .set_parameters(&mut *statement)?;
    let mut results = statement.execute_query().await?;

    let mut rows = 0;
    while let Some(values) = results.next().await? {
        let row = PlanRow::new(results.metadata(), &values);
        log.debug(&format!("{}{}", PLAN_MARKER, row));
        rows += 1;
    }
    Ok(rows)
}
