//! Error types for the TCP server.

use thiserror::Error;

use crate::transaction::TransactionError;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// I/O error on the listener or a connection.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Engine error surfaced outside a batch.
    #[error("transaction error: {0}")]
    Transaction(#[from] TransactionError),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The blocking task running a batch panicked or was cancelled.
    #[error("batch task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
