//! Configuration types

use std::time::Duration;

use serde::Deserialize;

use crate::interceptor::ShadowPolicy;
use crate::log::LogImpl;

/// Longest accepted explain timeout (one hour).
const MAX_TIMEOUT_MS: u64 = 3_600_000;

/// Root configuration structure
///
/// ```yaml
/// database_id: oracle
/// log_impl: tracing
/// explain:
///   enabled: true
///   policy: always
///   timeout_ms: 0
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Database identifier stamped on every mapped statement; selects the
    /// EXPLAIN dialect. Absent means the default `EXPLAIN ` prefix.
    #[serde(default)]
    pub database_id: Option<String>,

    /// Statement log implementation
    #[serde(default)]
    pub log_impl: LogImpl,

    /// Explain shadow settings
    #[serde(default)]
    pub explain: ExplainConfig,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref id) = self.database_id {
            if id.trim().is_empty() {
                return Err("database_id must not be blank when set".to_string());
            }
        }
        if self.explain.timeout_ms > MAX_TIMEOUT_MS {
            return Err(format!(
                "explain.timeout_ms must be at most {} (got {})",
                MAX_TIMEOUT_MS, self.explain.timeout_ms
            ));
        }
        Ok(())
    }
}

/// Explain shadow configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExplainConfig {
    /// Register the explain interceptor on new executors
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Whether to shadow statements whose primary execution failed
    #[serde(default)]
    pub policy: ShadowPolicy,

    /// Time budget for the diagnostic statement in milliseconds (0 = unbounded)
    #[serde(default)]
    pub timeout_ms: u64,
}

impl ExplainConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }
}

impl Default for ExplainConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            policy: ShadowPolicy::default(),
            timeout_ms: 0,
        }
    }
}

fn default_true() -> bool {
    true
}
