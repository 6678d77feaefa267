//! Transaction error types.

use thiserror::Error;

use crate::storage::StorageError;

/// Result type for transaction operations.
pub type TransactionResult<T> = Result<T, TransactionError>;

/// Errors that can occur during engine operations.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// Key is checked out by an unfinished write.
    #[error("key is locked by an unfinished write: {key}")]
    AlreadyActive { key: String },

    /// Add on a key that is already committed.
    #[error("key already exists: {key}")]
    DuplicateKey { key: String },

    /// Operation on a key that is absent.
    #[error("key not found: {key}")]
    NotFound { key: String },

    /// Commit or rollback without an active transaction.
    #[error("no transaction started")]
    NoTransaction,

    /// Commit after an earlier command of the same batch failed.
    #[error("transaction failed")]
    TransactionFailed,

    /// Commit after the transaction was rolled back.
    #[error("transaction rolled back")]
    TransactionRolledBack,

    /// Durable snapshot could not be written.
    #[error("persistence failure: {0}")]
    Persistence(#[from] StorageError),
}

impl TransactionError {
    /// Check if this error is a write conflict on an existing or locked key.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            TransactionError::AlreadyActive { .. } | TransactionError::DuplicateKey { .. }
        )
    }

    /// Check if this error indicates the key doesn't exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, TransactionError::NotFound { .. })
    }

    /// Check if this error must abort the batch that triggered it.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TransactionError::Persistence(_))
    }

    /// Message reported to protocol clients.
    pub fn client_message(&self) -> String {
        match self {
            TransactionError::AlreadyActive { .. } | TransactionError::DuplicateKey { .. } => {
                "Key already exists".to_string()
            }
            TransactionError::NotFound { .. } => "Key not found".to_string(),
            TransactionError::NoTransaction => "No transaction started".to_string(),
            TransactionError::TransactionFailed => "Transaction failed".to_string(),
            TransactionError::TransactionRolledBack => "Transaction rolled back".to_string(),
            TransactionError::Persistence(e) => format!("Persistence failure: {}", e),
        }
    }
}
