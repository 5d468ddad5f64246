//! Scripted in-memory driver and a capturing statement log for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use shadow_explain::{
    Connection, ExplainError, MappedStatement, PreparedStatement, Result, ResultSet,
    ResultSetMetadata, SqlCommandType, StatementLog, StatementType, Transaction, Value,
    PLAN_MARKER,
};

/// Statement log that records every line it is given.
pub struct CaptureLog {
    debug_enabled: bool,
    lines: Mutex<Vec<String>>,
}

impl CaptureLog {
    pub fn enabled() -> Arc<Self> {
        Arc::new(Self {
            debug_enabled: true,
            lines: Mutex::new(Vec::new()),
        })
    }

    pub fn disabled() -> Arc<Self> {
        Arc::new(Self {
            debug_enabled: false,
            lines: Mutex::new(Vec::new()),
        })
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    /// Only the lines written by the explain shadow.
    pub fn plan_lines(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|l| l.starts_with(PLAN_MARKER))
            .collect()
    }
}

impl StatementLog for CaptureLog {
    fn is_debug_enabled(&self) -> bool {
        self.debug_enabled
    }

    fn debug(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }
}

/// Build a statement logging into `log`.
pub fn statement(
    sql: &str,
    database_id: Option<&str>,
    statement_type: StatementType,
    log: &Arc<CaptureLog>,
) -> MappedStatement {
    MappedStatement::builder("test.statement", sql, SqlCommandType::from_sql(sql))
        .statement_type(statement_type)
        .database_id(database_id.map(str::to_string))
        .statement_log(Arc::clone(log) as Arc<dyn StatementLog>)
        .build()
        .unwrap()
}

/// What one kind of statement (primary or EXPLAIN) does when run.
#[derive(Debug, Clone, Default)]
pub struct Outcome {
    pub labels: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub update_count: u64,
    pub fail_prepare: Option<String>,
    pub fail_execute: Option<String>,
    /// Fail when asked for the row at this zero-based position.
    pub fail_at_row: Option<usize>,
    /// Sleep before producing the row at this zero-based position.
    pub stall_at_row: Option<(usize, Duration)>,
}

impl Outcome {
    pub fn rows(labels: &[&str], rows: Vec<Vec<Value>>) -> Self {
        Self {
            labels: labels.iter().map(|l| l.to_string()).collect(),
            rows,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Script {
    pub primary: Outcome,
    pub explain: Outcome,
    pub fail_connection: Option<String>,
    /// Sleep this long inside every `connection()` call.
    pub connection_delay: Option<Duration>,
    /// No connection held yet, as when the primary failed before acquiring one.
    pub idle: bool,
}

impl Script {
    fn outcome_for(&self, sql: &str) -> &Outcome {
        if sql.starts_with("EXPLAIN") {
            &self.explain
        } else {
            &self.primary
        }
    }
}

/// Everything the mock driver observed.
#[derive(Debug, Default)]
pub struct Recorder {
    pub connection_requests: AtomicUsize,
    pub prepared: Mutex<Vec<String>>,
    /// Parameters bound to each executed statement, in execution order.
    pub bound: Mutex<Vec<Vec<(usize, Value)>>>,
    pub statements_opened: AtomicUsize,
    pub statements_closed: AtomicUsize,
    pub result_sets_opened: AtomicUsize,
    pub result_sets_closed: AtomicUsize,
    pub commits: AtomicUsize,
    pub rollbacks: AtomicUsize,
}

impl Recorder {
    pub fn prepared(&self) -> Vec<String> {
        self.prepared.lock().unwrap().clone()
    }

    pub fn bound(&self) -> Vec<Vec<(usize, Value)>> {
        self.bound.lock().unwrap().clone()
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

pub struct MockTransaction {
    script: Arc<Script>,
    recorder: Arc<Recorder>,
    connection: MockConnection,
}

impl MockTransaction {
    pub fn new(script: Script) -> (Self, Arc<Recorder>) {
        let script = Arc::new(script);
        let recorder = Arc::new(Recorder::default());
        let tx = Self {
            script: Arc::clone(&script),
            recorder: Arc::clone(&recorder),
            connection: MockConnection {
                script,
                recorder: Arc::clone(&recorder),
            },
        };
        (tx, recorder)
    }
}

#[async_trait]
impl Transaction for MockTransaction {
    async fn connection(&mut self) -> Result<&mut dyn Connection> {
        self.recorder.connection_requests.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.script.connection_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(msg) = &self.script.fail_connection {
            return Err(ExplainError::Connection(msg.clone()));
        }
        Ok(&mut self.connection)
    }

    fn is_active(&self) -> bool {
        !self.script.idle
    }

    async fn commit(&mut self) -> Result<()> {
        self.recorder.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.recorder.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct MockConnection {
    script: Arc<Script>,
    recorder: Arc<Recorder>,
}

#[async_trait]
impl Connection for MockConnection {
    async fn prepare_statement<'c>(
        &'c mut self,
        sql: &str,
    ) -> Result<Box<dyn PreparedStatement + 'c>> {
        self.recorder.prepared.lock().unwrap().push(sql.to_string());
        let outcome = self.script.outcome_for(sql).clone();
        if let Some(msg) = &outcome.fail_prepare {
            return Err(ExplainError::Prepare(msg.clone()));
        }
        self.recorder.statements_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockStatement {
            outcome,
            recorder: Arc::clone(&self.recorder),
            bound: Vec::new(),
        }))
    }
}

struct MockStatement {
    outcome: Outcome,
    recorder: Arc<Recorder>,
    bound: Vec<(usize, Value)>,
}

impl MockStatement {
    fn record_execution(&self) -> Result<()> {
        self.recorder.bound.lock().unwrap().push(self.bound.clone());
        match &self.outcome.fail_execute {
            Some(msg) => Err(ExplainError::Execution(msg.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PreparedStatement for MockStatement {
    fn set_parameter(&mut self, index: usize, value: &Value) -> Result<()> {
        self.bound.push((index, value.clone()));
        Ok(())
    }

    async fn execute_query<'s>(&'s mut self) -> Result<Box<dyn ResultSet + 's>> {
        self.record_execution()?;
        self.recorder.result_sets_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockResultSet {
            metadata: ResultSetMetadata::new(self.outcome.labels.clone()),
            rows: self.outcome.rows.clone().into(),
            position: 0,
            fail_at_row: self.outcome.fail_at_row,
            stall_at_row: self.outcome.stall_at_row,
            recorder: Arc::clone(&self.recorder),
        }))
    }

    async fn execute_update(&mut self) -> Result<u64> {
        self.record_execution()?;
        Ok(self.outcome.update_count)
    }
}

impl Drop for MockStatement {
    fn drop(&mut self) {
        self.recorder.statements_closed.fetch_add(1, Ordering::SeqCst);
    }
}

struct MockResultSet {
    metadata: ResultSetMetadata,
    rows: VecDeque<Vec<Value>>,
    position: usize,
    fail_at_row: Option<usize>,
    stall_at_row: Option<(usize, Duration)>,
    recorder: Arc<Recorder>,
}

#[async_trait]
impl ResultSet for MockResultSet {
    fn metadata(&self) -> &ResultSetMetadata {
        &self.metadata
    }

    async fn next(&mut self) -> Result<Option<Vec<Value>>> {
        if let Some((row, delay)) = self.stall_at_row {
            if row == self.position {
                tokio::time::sleep(delay).await;
            }
        }
        if self.fail_at_row == Some(self.position) {
            return Err(ExplainError::Execution(format!(
                "cursor failed at row {}",
                self.position
            )));
        }
        self.position += 1;
        Ok(self.rows.pop_front())
    }
}

impl Drop for MockResultSet {
    fn drop(&mut self) {
        self.recorder.result_sets_closed.fetch_add(1, Ordering::SeqCst);
    }
}
