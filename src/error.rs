//! Crate-wide error types.

use thiserror::Error;

/// Errors raised by the document store, the state service and startup.
#[derive(Debug, Error)]
pub enum SyncError {
    /// SQLite failure while reading or writing the shared document.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The in-memory document could not be serialized.
    #[error("failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Filesystem or socket failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A thread panicked while holding the database connection.
    #[error("database connection lock poisoned")]
    LockPoisoned,

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for statesync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
