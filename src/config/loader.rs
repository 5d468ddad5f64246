//! Configuration loader

use std::path::Path;

use super::Config;
use crate::error::{ExplainError, Result};
use crate::interceptor::ShadowPolicy;

/// Load configuration from a YAML file
///
/// Also applies SHADOW_EXPLAIN_* env var overrides after loading.
pub fn load_config(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path)?;
    load_config_from_str(&contents)
}

/// Load configuration from a YAML string (useful for testing)
///
/// Also applies SHADOW_EXPLAIN_* env var overrides after loading.
pub fn load_config_from_str(yaml: &str) -> Result<Config> {
    let mut config: Config = if yaml.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml::from_str(yaml)?
    };
    apply_env_overrides(&mut config)?;
    config.validate().map_err(ExplainError::Config)?;
    Ok(config)
}

/// Apply SHADOW_EXPLAIN_* environment variable overrides to a config.
///
/// Supported env vars:
/// - `SHADOW_EXPLAIN_DATABASE_ID` - Override database id (empty string clears it)
/// - `SHADOW_EXPLAIN_LOG_IMPL` - Override statement log implementation
/// - `SHADOW_EXPLAIN_ENABLED` - Enable or disable the interceptor (`true`/`false`)
/// - `SHADOW_EXPLAIN_POLICY` - `always` or `on_success`
/// - `SHADOW_EXPLAIN_TIMEOUT_MS` - Override explain timeout
///
/// A value that does not parse is a [`ExplainError::Config`], the same as an
/// invalid value in the YAML file.
pub fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Ok(val) = std::env::var("SHADOW_EXPLAIN_DATABASE_ID") {
        debug!("Overriding database_id from SHADOW_EXPLAIN_DATABASE_ID");
        config.database_id = (!val.is_empty()).then_some(val);
    }
    if let Ok(val) = std::env::var("SHADOW_EXPLAIN_LOG_IMPL") {
        debug!("Overriding log_impl from SHADOW_EXPLAIN_LOG_IMPL");
        config.log_impl = val.parse()?;
    }
    if let Ok(val) = std::env::var("SHADOW_EXPLAIN_ENABLED") {
        debug!("Overriding explain.enabled from SHADOW_EXPLAIN_ENABLED");
        config.explain.enabled = val.parse().map_err(|_| invalid_env("ENABLED", &val))?;
    }
    if let Ok(val) = std::env::var("SHADOW_EXPLAIN_POLICY") {
        debug!("Overriding explain.policy from SHADOW_EXPLAIN_POLICY");
        config.explain.policy = parse_policy(&val)?;
    }
    if let Ok(val) = std::env::var("SHADOW_EXPLAIN_TIMEOUT_MS") {
        debug!("Overriding explain.timeout_ms from SHADOW_EXPLAIN_TIMEOUT_MS");
        config.explain.timeout_ms = val.parse().map_err(|_| invalid_env("TIMEOUT_MS", &val))?;
    }
    Ok(())
}

fn invalid_env(name: &str, value: &str) -> ExplainError {
    ExplainError::Config(format!(
        "Invalid SHADOW_EXPLAIN_{} value '{}'",
        name, value
    ))
}

fn parse_policy(value: &str) -> Result<ShadowPolicy> {
    match value.to_lowercase().as_str() {
        "always" => Ok(ShadowPolicy::Always),
        "on_success" => Ok(ShadowPolicy::OnSuccess),
        other => Err(ExplainError::Config(format!(
            "Invalid explain policy '{}'. Must be 'always' or 'on_success'",
            other
        ))),
    }
}
