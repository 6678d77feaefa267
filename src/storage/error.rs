//! Storage layer error types
//!
//! All errors that can occur while reading or writing the durable snapshot
//! are defined here. We use `thiserror` for ergonomic error definition.

use std::path::PathBuf;

use thiserror::Error;

/// the main error type for snapshot operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O error (filesystem level)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization or deserialization failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// the temporary snapshot could not be moved over the target
    #[error("failed to replace snapshot at {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// the snapshot path has no usable parent directory
    #[error("invalid snapshot path: {0}")]
    InvalidPath(PathBuf),
}

impl StorageError {
    /// check if this error came from the filesystem rather than encoding
    pub fn is_io(&self) -> bool {
        matches!(self, StorageError::Io(_) | StorageError::Persist { .. })
    }
}

/// result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
