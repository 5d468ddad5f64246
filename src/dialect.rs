//! Database dialects and their EXPLAIN prefixes.

use std::fmt;
use std::str::FromStr;

use crate::error::ExplainError;

/// Database types with their corresponding EXPLAIN prefix.
///
/// A `None` prefix means the target has no statement-prefix form of
/// EXPLAIN, and shadowing is skipped without any output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseType {
    /// `EXPLAIN <sql>` (MySQL, MariaDB, PostgreSQL, SQLite, H2, ...)
    Default,
    /// `EXPLAIN PLAN FOR <sql>`
    Oracle,
    /// Microsoft SQL Server, which only offers SHOWPLAN session settings
    SqlServer,
}

impl DatabaseType {
    /// All variants in declaration order.
    pub const ALL: [DatabaseType; 3] = [Self::Default, Self::Oracle, Self::SqlServer];

    /// Resolve a dialect from a statement's configured database id.
    ///
    /// Returns [`DatabaseType::Default`] when the id is absent or unrecognized.
    pub fn from_database_id(database_id: Option<&str>) -> Self {
        let Some(id) = database_id else {
            return Self::Default;
        };
        match id.to_lowercase().as_str() {
            "oracle" => Self::Oracle,
            "sqlserver" | "sql server" => Self::SqlServer,
            _ => Self::Default,
        }
    }

    /// The EXPLAIN prefix for this dialect, or `None` if EXPLAIN is not supported.
    pub fn explain_prefix(&self) -> Option<&'static str> {
        match self {
            Self::Default => Some("EXPLAIN "),
            Self::Oracle => Some("EXPLAIN PLAN FOR "),
            Self::SqlServer => None,
        }
    }

    /// Canonical variant name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Default => "DEFAULT",
            Self::Oracle => "ORACLE",
            Self::SqlServer => "SQL_SERVER",
        }
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DatabaseType {
    type Err = ExplainError;

    /// Resolve by canonical variant name (exact match).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| ExplainError::Config(format!("Unknown database type '{}'", s)))
    }
}
