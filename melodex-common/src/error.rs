//! Common error types for melodex

use thiserror::Error;

/// Common result type for melodex operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the melodex services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A feed line that failed to deserialize; fatal for the whole run
    #[error("Malformed record at line {line}: {source}")]
    MalformedRecord {
        line: u64,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
