//! `#{name}` placeholder parsing into driver SQL and ordered mappings.

use crate::error::{ExplainError, Result};

/// One `#{name}` placeholder, in the order it appears in the SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterMapping {
    pub property: String,
}

/// SQL text after placeholder resolution, plus its ordered parameter mappings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundSql {
    sql: String,
    parameter_mappings: Vec<ParameterMapping>,
}

impl BoundSql {
    pub fn new(sql: impl Into<String>, parameter_mappings: Vec<ParameterMapping>) -> Self {
        Self {
            sql: sql.into(),
            parameter_mappings,
        }
    }

    /// SQL with every placeholder replaced by `?`.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn parameter_mappings(&self) -> &[ParameterMapping] {
        &self.parameter_mappings
    }
}

/// Static SQL source, resolved once at registration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlSource {
    bound_sql: BoundSql,
}

impl SqlSource {
    /// Parse `#{name}` placeholders into positional `?` markers.
    ///
    /// Anything after a comma inside the braces (`#{id,jdbcType=INTEGER}`)
    /// is accepted and ignored.
    pub fn parse(script: &str) -> Result<Self> {
        let mut sql = String::with_capacity(script.len());
        let mut mappings = Vec::new();
        let mut rest = script;

        while let Some(start) = rest.find("#{") {
            sql.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after.find('}').ok_or_else(|| {
                ExplainError::Mapping(format!("Unclosed placeholder in SQL: {}", script))
            })?;
            let property = after[..end].split(',').next().unwrap_or("").trim();
            if property.is_empty() {
                return Err(ExplainError::Mapping(format!(
                    "Empty placeholder in SQL: {}",
                    script
                )));
            }
            mappings.push(ParameterMapping {
                property: property.to_string(),
            });
            sql.push('?');
            rest = &after[end + 1..];
        }
        sql.push_str(rest);

        Ok(Self {
            bound_sql: BoundSql::new(sql, mappings),
        })
    }

    pub fn bound_sql(&self) -> &BoundSql {
        &self.bound_sql
    }
}
