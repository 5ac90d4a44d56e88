//! Error types for the store module.

use linkvault_core::{FedoraId, IdentifierError, PathNotFound, TransactionError};
use thiserror::Error;

/// Errors that can occur during session operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Nothing is stored at the identifier.
    #[error(transparent)]
    PathNotFound(#[from] PathNotFound),

    /// The transaction is closed or unknown.
    #[error("transaction error: {0}")]
    Transaction(#[from] TransactionError),

    /// Identifier derivation failed.
    #[error("identifier error: {0}")]
    Identifier(#[from] IdentifierError),

    /// Content was requested from something that is not a binary.
    #[error("{0} is not a binary")]
    NotBinary(FedoraId),

    /// The write conflicts with what is already stored.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A write was attempted through a read-only session.
    #[error("session is read-only")]
    ReadOnly,

    /// Invalid data in storage.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn not_found(id: &FedoraId) -> Self {
        StoreError::PathNotFound(PathNotFound::new(id.clone()))
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
