//! Error types for shadow-explain

use thiserror::Error;

/// Main error type for the crate
///
/// Driver-level variants (`Connection`, `Prepare`, `Binding`, `Execution`)
/// display the driver's message verbatim, since that message is what ends
/// up in the `Failed to execute EXPLAIN` plan line.
#[derive(Error, Debug)]
pub enum ExplainError {
    /// Obtaining the live connection failed
    #[error("{0}")]
    Connection(String),

    /// Statement preparation failed
    #[error("{0}")]
    Prepare(String),

    /// Parameter binding failed
    #[error("{0}")]
    Binding(String),

    /// Statement execution or row iteration failed
    #[error("{0}")]
    Execution(String),

    /// Commit or rollback failed, or the transaction is unusable
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Mapped statement registration or SQL source error
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The diagnostic statement exceeded its time budget
    #[error("timed out after {0} ms")]
    Timeout(u64),

    /// I/O error (config file, setup scripts)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error reported by the sqlx driver
    #[error(transparent)]
    Sql(#[from] sqlx::Error),
}

/// Result type alias for ExplainError
pub type Result<T> = std::result::Result<T, ExplainError>;

impl From<serde_yaml::Error> for ExplainError {
    fn from(err: serde_yaml::Error) -> Self {
        ExplainError::Config(err.to_string())
    }
}
