//! Configuration module for shadow-explain
//!
//! ```yaml
//! database_id: oracle        # selects the EXPLAIN dialect
//! log_impl: tracing          # tracing | stdout | no_logging
//! explain:
//!   enabled: true            # wrap new executors with the interceptor
//!   policy: always           # always | on_success
//!   timeout_ms: 0            # 0 = no timeout
//! ```
//!
//! Every key is optional. [`Configuration`] is the runtime registry built
//! from a loaded [`Config`].

mod loader;
mod registry;
mod types;

pub use loader::{apply_env_overrides, load_config, load_config_from_str};
pub use registry::Configuration;
pub use types::*;
