//! Statement-id based API on top of an [`Executor`].

use std::sync::Arc;

use crate::config::Configuration;
use crate::driver::Row;
use crate::error::{ExplainError, Result};
use crate::executor::{Executor, ResultHandler, RowBounds};
use crate::param::Parameter;

/// Runs registered statements by id on one executor.
pub struct SqlSession {
    configuration: Arc<Configuration>,
    executor: Box<dyn Executor>,
}

impl SqlSession {
    pub fn new(configuration: Arc<Configuration>, executor: Box<dyn Executor>) -> Self {
        Self {
            configuration,
            executor,
        }
    }

    /// Session over a fresh executor on `transaction`; see
    /// [`Configuration::new_executor`].
    pub fn open<T>(configuration: Arc<Configuration>, transaction: T) -> Self
    where
        T: crate::transaction::Transaction + 'static,
    {
        let executor = configuration.new_executor(transaction);
        Self::new(configuration, executor)
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn executor(&mut self) -> &mut dyn Executor {
        self.executor.as_mut()
    }

    pub async fn select_list(&mut self, id: &str, parameter: &Parameter) -> Result<Vec<Row>> {
        self.select_list_with_bounds(id, parameter, RowBounds::DEFAULT)
            .await
    }

    pub async fn select_list_with_bounds(
        &mut self,
        id: &str,
        parameter: &Parameter,
        bounds: RowBounds,
    ) -> Result<Vec<Row>> {
        let ms = self.configuration.mapped_statement(id)?;
        self.executor.query(&ms, parameter, bounds, None).await
    }

    /// At most one row; more is an error.
    pub async fn select_one(&mut self, id: &str, parameter: &Parameter) -> Result<Option<Row>> {
        let mut rows = self.select_list(id, parameter).await?;
        match rows.len() {
            0 => Ok(None),
            1 => Ok(rows.pop()),
            n => Err(ExplainError::Mapping(format!(
                "Expected one result (or none) from '{}', but found {}",
                id, n
            ))),
        }
    }

    /// Stream rows into `handler` instead of collecting them.
    pub async fn select_with_handler(
        &mut self,
        id: &str,
        parameter: &Parameter,
        bounds: RowBounds,
        handler: &mut dyn ResultHandler,
    ) -> Result<()> {
        let ms = self.configuration.mapped_statement(id)?;
        self.executor
            .query(&ms, parameter, bounds, Some(handler))
            .await?;
        Ok(())
    }

    pub async fn insert(&mut self, id: &str, parameter: &Parameter) -> Result<u64> {
        self.update(id, parameter).await
    }

    pub async fn update(&mut self, id: &str, parameter: &Parameter) -> Result<u64> {
        let ms = self.configuration.mapped_statement(id)?;
        self.executor.update(&ms, parameter).await
    }

    pub async fn delete(&mut self, id: &str, parameter: &Parameter) -> Result<u64> {
        self.update(id, parameter).await
    }

    pub async fn commit(&mut self) -> Result<()> {
        self.executor.commit().await
    }

    pub async fn rollback(&mut self) -> Result<()> {
        self.executor.rollback().await
    }
}
