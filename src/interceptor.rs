//! Executor decorator that shadows every statement with EXPLAIN.
//!
//! [`ExplainInterceptor`] wraps any [`Executor`]. For `query`,
//! `query_with_cache_key` and `update` it:
//!
//! 1. runs the wrapped operation and keeps its result, success or error;
//! 2. runs the explain shadow on the wrapped executor's transaction;
//! 3. returns the kept result untouched.
//!
//! The caller cannot tell from return values whether the shadow ran,
//! succeeded or failed.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::driver::Row;
use crate::error::Result;
use crate::executor::{CacheKey, Executor, OperationKind, ResultHandler, RowBounds};
use crate::explain::{ExplainShadow, ShadowOutcome};
use crate::mapping::{BoundSql, MappedStatement};
use crate::param::Parameter;
use crate::transaction::Transaction;

/// Whether to shadow a statement whose primary execution failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShadowPolicy {
    /// Shadow after every primary outcome.
    #[default]
    Always,
    /// Shadow only after the primary succeeded.
    OnSuccess,
}

/// Wraps an executor and shadows its statements with EXPLAIN.
pub struct ExplainInterceptor<E> {
    inner: E,
    shadow: ExplainShadow,
    policy: ShadowPolicy,
}

impl<E: Executor> ExplainInterceptor<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            shadow: ExplainShadow::new(),
            policy: ShadowPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ShadowPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.shadow = self.shadow.with_timeout(timeout);
        self
    }

    pub fn policy(&self) -> ShadowPolicy {
        self.policy
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn into_inner(self) -> E {
        self.inner
    }

    async fn after(
        &mut self,
        kind: OperationKind,
        ms: &MappedStatement,
        parameter: &Parameter,
        bound_sql: &BoundSql,
        primary_ok: bool,
    ) -> ShadowOutcome {
        let outcome = if !primary_ok && self.policy == ShadowPolicy::OnSuccess {
            ShadowOutcome::SkippedByPolicy
        } else {
            self.shadow
                .shadow_explain(ms, parameter, bound_sql, self.inner.transaction())
                .await
        };
        trace!("Explain shadow for {} {}: {:?}", kind, ms.id(), outcome);
        outcome
    }
}

#[async_trait]
impl<E: Executor> Executor for ExplainInterceptor<E> {
    async fn query(
        &mut self,
        ms: &MappedStatement,
        parameter: &Parameter,
        bounds: RowBounds,
        handler: Option<&mut dyn ResultHandler>,
    ) -> Result<Vec<Row>> {
        let result = self.inner.query(ms, parameter, bounds, handler).await;
        self.after(
            OperationKind::Query,
            ms,
            parameter,
            ms.bound_sql(),
            result.is_ok(),
        )
        .await;
        result
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
        let result = self
            .inner
            .query_with_cache_key(ms, parameter, bounds, handler, cache_key, bound_sql)
            .await;
        self.after(
            OperationKind::QueryWithCacheKey,
            ms,
            parameter,
            bound_sql,
            result.is_ok(),
        )
        .await;
        result
    }

    async fn update(&mut self, ms: &MappedStatement, parameter: &Parameter) -> Result<u64> {
        let result = self.inner.update(ms, parameter).await;
        self.after(
            OperationKind::Update,
            ms,
            parameter,
            ms.bound_sql(),
            result.is_ok(),
        )
        .await;
        result
    }

    fn create_cache_key(
        &self,
        ms: &MappedStatement,
        parameter: &Parameter,
        bounds: RowBounds,
        bound_sql: &BoundSql,
    ) -> Result<CacheKey> {
        self.inner.create_cache_key(ms, parameter, bounds, bound_sql)
    }

    fn transaction(&mut self) -> &mut dyn Transaction {
        self.inner.transaction()
    }

    async fn commit(&mut self) -> Result<()> {
        self.inner.commit().await
    }

    async fn rollback(&mut self) -> Result<()> {
        self.inner.rollback().await
    }
}
