//! Per-statement log sinks.
//!
//! Every [`MappedStatement`](crate::mapping::MappedStatement) carries its own
//! [`StatementLog`]. The executor writes its `==>`/`<==` trace lines there and
//! the explain shadow writes its plan lines there, so a single debug switch
//! controls both.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::ExplainError;

/// A logging sink bound to one mapped statement.
pub trait StatementLog: Send + Sync {
    /// Whether debug lines written to this sink would be recorded.
    fn is_debug_enabled(&self) -> bool;

    /// Write one diagnostic line.
    fn debug(&self, line: &str);
}

impl fmt::Debug for dyn StatementLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatementLog")
            .field("debug_enabled", &self.is_debug_enabled())
            .finish()
    }
}

/// Statement log backed by `tracing`.
///
/// Lines are emitted as DEBUG events on the `shadow_explain::statement`
/// target with a `statement` field holding the statement id, so they can be
/// switched on with e.g. `RUST_LOG=shadow_explain::statement=debug`.
#[derive(Debug, Clone)]
pub struct TracingLog {
    statement_id: String,
}

impl TracingLog {
    pub fn new(statement_id: impl Into<String>) -> Self {
        Self {
            statement_id: statement_id.into(),
        }
    }
}

impl StatementLog for TracingLog {
    fn is_debug_enabled(&self) -> bool {
        tracing::enabled!(target: "shadow_explain::statement", tracing::Level::DEBUG)
    }

    fn debug(&self, line: &str) {
        tracing::debug!(
            target: "shadow_explain::statement",
            statement = %self.statement_id,
            "{}",
            line
        );
    }
}

/// Statement log that prints every line to stdout. Always enabled.
#[derive(Debug, Clone, Default)]
pub struct StdOutLog;

impl StatementLog for StdOutLog {
    fn is_debug_enabled(&self) -> bool {
        true
    }

    fn debug(&self, line: &str) {
        println!("{}", line);
    }
}

/// Statement log that discards everything. Never enabled.
#[derive(Debug, Clone, Default)]
pub struct NoLoggingLog;

impl StatementLog for NoLoggingLog {
    fn is_debug_enabled(&self) -> bool {
        false
    }

    fn debug(&self, _line: &str) {}
}

/// Which [`StatementLog`] implementation new statements receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogImpl {
    #[default]
    Tracing,
    #[serde(rename = "stdout")]
    StdOut,
    NoLogging,
}

impl LogImpl {
    /// Create a sink for the statement `statement_id`.
    pub fn create(&self, statement_id: &str) -> Arc<dyn StatementLog> {
        match self {
            LogImpl::Tracing => Arc::new(TracingLog::new(statement_id)),
            LogImpl::StdOut => Arc::new(StdOutLog),
            LogImpl::NoLogging => Arc::new(NoLoggingLog),
        }
    }
}

impl FromStr for LogImpl {
    type Err = ExplainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tracing" => Ok(LogImpl::Tracing),
            "stdout" => Ok(LogImpl::StdOut),
            "no_logging" | "none" => Ok(LogImpl::NoLogging),
            other => Err(ExplainError::Config(format!(
                "Invalid log_impl '{}'. Must be 'tracing', 'stdout', or 'no_logging'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_logging_is_disabled() {
        assert!(!NoLoggingLog.is_debug_enabled());
        assert!(StdOutLog.is_debug_enabled());
    }

    #[test]
    fn test_tracing_log_disabled_without_subscriber() {
        let log = TracingLog::new("users.select");
        assert!(!log.is_debug_enabled());
        // Must not panic with no subscriber installed
        log.debug("<== ExplainPlan: ignored");
    }

    #[test]
    fn test_log_impl_create() {
        assert!(!LogImpl::NoLogging.create("s").is_debug_enabled());
        assert!(LogImpl::StdOut.create("s").is_debug_enabled());
    }

    #[test]
    fn test_log_impl_from_str() {
        assert_eq!("tracing".parse::<LogImpl>().unwrap(), LogImpl::Tracing);
        assert_eq!("STDOUT".parse::<LogImpl>().unwrap(), LogImpl::StdOut);
        assert_eq!("none".parse::<LogImpl>().unwrap(), LogImpl::NoLogging);
        assert!("slf4j".parse::<LogImpl>().is_err());
    }

    #[test]
    fn test_log_impl_yaml() {
        let parsed: LogImpl = serde_yaml::from_str("stdout").unwrap();
        assert_eq!(parsed, LogImpl::StdOut);
        let parsed: LogImpl = serde_yaml::from_str("no_logging").unwrap();
        assert_eq!(parsed, LogImpl::NoLogging);
    }
}
