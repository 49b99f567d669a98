//! Storage error types
//!
//! Defines all errors that can occur in the storage layer.

use thiserror::Error;

/// Errors that can occur in the reading store and its key-value backends
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Key cannot be used as a storage slot name
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Reading value cannot be persisted (NaN or infinite)
    #[error("Reading value must be a finite number, got {0}")]
    NonFiniteValue(f64),

    /// Lock acquisition failed
    #[error("Lock error: {0}")]
    Lock(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
