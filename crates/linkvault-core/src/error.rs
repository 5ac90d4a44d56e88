//! Error types for the LinkVault core.

use thiserror::Error;

use crate::identifier::FedoraId;
use crate::transaction::{TransactionId, TransactionState};

/// Errors from parsing or deriving identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("malformed identifier {raw:?}: {reason}")]
    Malformed { raw: String, reason: String },

    #[error("identifier {0} has no containing identifier")]
    NoContainingIdentifier(String),

    #[error("identifier {0} is already a description")]
    NestedDescription(String),

    #[error("the repository root has no description")]
    RootDescription,
}

impl IdentifierError {
    pub(crate) fn malformed(raw: &str, reason: impl Into<String>) -> Self {
        IdentifierError::Malformed {
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors from the transaction lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    /// The transaction already reached a terminal state.
    #[error("transaction {id} is {state}")]
    Closed {
        id: TransactionId,
        state: TransactionState,
    },

    /// The transaction has not yet reached the terminal state the call needs.
    #[error("transaction {0} is still active")]
    Active(TransactionId),
}

/// Errors from digest algorithm and digest URI handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DigestError {
    #[error("unsupported digest algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("malformed digest: {0}")]
    MalformedDigest(String),
}

/// Payload of the not-found condition.
///
/// Shared by the checked and runtime carriers in the kernel so callers can
/// match on the cause rather than on how it travelled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("path not found: {id}")]
pub struct PathNotFound {
    pub id: FedoraId,
}

impl PathNotFound {
    pub fn new(id: FedoraId) -> Self {
        Self { id }
    }
}
