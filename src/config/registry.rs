//! Runtime registry of settings and mapped statements.

use std::collections::HashMap;
use std::sync::Arc;

use super::Config;
use crate::error::{ExplainError, Result};
use crate::executor::{Executor, SimpleExecutor};
use crate::interceptor::ExplainInterceptor;
use crate::mapping::{MappedStatement, MappedStatementBuilder, SqlCommandType};
use crate::transaction::Transaction;

/// Runtime registry: loaded settings plus the mapped statements known by id.
#[derive(Debug, Default)]
pub struct Configuration {
    settings: Config,
    statements: HashMap<String, Arc<MappedStatement>>,
}

impl Configuration {
    pub fn new(settings: Config) -> Self {
        Self {
            settings,
            statements: HashMap::new(),
        }
    }

    pub fn settings(&self) -> &Config {
        &self.settings
    }

    /// Start a statement that inherits the configured database id and log implementation.
    pub fn statement_builder(
        &self,
        id: &str,
        sql: &str,
        command_type: SqlCommandType,
    ) -> MappedStatementBuilder {
        MappedStatement::builder(id, sql, command_type)
            .database_id(self.settings.database_id.clone())
            .statement_log(self.settings.log_impl.create(id))
    }

    /// Register a statement. Ids must be unique.
    pub fn add_mapped_statement(&mut self, ms: MappedStatement) -> Result<Arc<MappedStatement>> {
        if self.statements.contains_key(ms.id()) {
            return Err(ExplainError::Mapping(format!(
                "Mapped statement '{}' is already registered",
                ms.id()
            )));
        }
        let ms = Arc::new(ms);
        self.statements.insert(ms.id().to_string(), Arc::clone(&ms));
        debug!("Registered mapped statement {}", ms.id());
        Ok(ms)
    }

    pub fn mapped_statement(&self, id: &str) -> Result<Arc<MappedStatement>> {
        self.statements
            .get(id)
            .cloned()
            .ok_or_else(|| ExplainError::Mapping(format!("Unknown mapped statement '{}'", id)))
    }

    pub fn has_statement(&self, id: &str) -> bool {
        self.statements.contains_key(id)
    }

    /// Create an executor on `transaction`, wrapped with the explain
    /// interceptor unless `explain.enabled` is off.
    pub fn new_executor<T>(&self, transaction: T) -> Box<dyn Executor>
    where
        T: Transaction + 'static,
    {
        let executor = SimpleExecutor::new(transaction);
        if !self.settings.explain.enabled {
            return Box::new(executor);
        }
        Box::new(
            ExplainInterceptor::new(executor)
                .with_policy(self.settings.explain.policy)
                .with_timeout(self.settings.explain.timeout()),
        )
    }
}
