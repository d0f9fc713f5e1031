//! Error types for the store module.

use signpost_core::{CoreError, ResourceClass};
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Record encoding, decoding or validation failed.
    #[error(transparent)]
    Record(#[from] CoreError),

    /// A uniqueness conflict was reported but the holder was gone on refetch.
    #[error("{class} {key:?} reported as existing but could not be read back")]
    Vanished { class: ResourceClass, key: String },

    /// An update tried to change a record's natural key.
    #[error("{class} {from:?} cannot be renamed to {to:?}")]
    KeyChanged {
        class: ResourceClass,
        from: String,
        to: String,
    },

    /// The backend refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// A lock guarding the backend was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    Poisoned,

    /// A blocking task failed to complete.
    #[error("blocking task failed: {0}")]
    Task(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Whether the error came from record validation rather than the backend.
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Record(CoreError::Validation(_)))
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
