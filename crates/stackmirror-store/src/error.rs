//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Record data encoding/decoding error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record not found (update of a missing record).
    #[error("record not found: {namespace}/{name}")]
    NotFound { namespace: String, name: String },

    /// Record already exists (create of a present record).
    #[error("record already exists: {namespace}/{name}")]
    AlreadyExists { namespace: String, name: String },

    /// Record cannot be stored as given.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// The backend could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn not_found(namespace: &str, name: &str) -> Self {
        Self::NotFound {
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    pub fn already_exists(namespace: &str, name: &str) -> Self {
        Self::AlreadyExists {
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
