//! Error types for the kernel.

use linkvault_core::{
    DigestError, FedoraId, IdentifierError, PathNotFound, ResourceKind, TransactionError,
};
use linkvault_store::StoreError;
use thiserror::Error;

/// Errors that can occur during kernel operations.
///
/// Not-found travels in one of two carriers around the same
/// [`PathNotFound`] payload. [`KernelError::PathNotFound`] is returned where
/// the caller resolves an identifier it chose. [`KernelError::PathNotFoundRuntime`]
/// is returned by accessors that promise a resource by construction (a
/// description's binary) and found none. Match on [`KernelError::not_found`]
/// to handle both.
#[derive(Debug, Error)]
pub enum KernelError {
    /// Nothing exists at the requested identifier.
    #[error(transparent)]
    PathNotFound(PathNotFound),

    /// A resource that should exist by construction is missing.
    #[error("{0} (companion resource)")]
    PathNotFoundRuntime(PathNotFound),

    /// Identifier parsing or derivation failed.
    #[error("identifier error: {0}")]
    Identifier(#[from] IdentifierError),

    /// The transaction is closed or unknown.
    #[error("transaction error: {0}")]
    Transaction(#[from] TransactionError),

    /// A requested fixity algorithm is not supported.
    #[error("unsupported digest algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// A supplied digest could not be parsed.
    #[error("malformed digest: {0}")]
    MalformedDigest(String),

    /// The resource exists but is not of the variant the call needs.
    #[error("{id} is a {actual}, expected a {expected}")]
    WrongResourceType {
        id: FedoraId,
        expected: ResourceKind,
        actual: ResourceKind,
    },

    /// Storage error.
    #[error("storage error: {0}")]
    Store(StoreError),

    /// I/O error while reading content.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl KernelError {
    /// The not-found payload, whichever carrier holds it.
    pub fn not_found(&self) -> Option<&PathNotFound> {
        match self {
            KernelError::PathNotFound(p) | KernelError::PathNotFoundRuntime(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.not_found().is_some()
    }

    /// Re-signal a checked not-found on the runtime carrier.
    pub fn into_runtime(self) -> Self {
        match self {
            KernelError::PathNotFound(p) => KernelError::PathNotFoundRuntime(p),
            other => other,
        }
    }

    /// Re-signal a runtime not-found on the checked carrier.
    pub fn into_checked(self) -> Self {
        match self {
            KernelError::PathNotFoundRuntime(p) => KernelError::PathNotFound(p),
            other => other,
        }
    }
}

impl From<PathNotFound> for KernelError {
    fn from(p: PathNotFound) -> Self {
        KernelError::PathNotFound(p)
    }
}

impl From<StoreError> for KernelError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::PathNotFound(p) => KernelError::PathNotFound(p),
            StoreError::Transaction(t) => KernelError::Transaction(t),
            StoreError::Identifier(i) => KernelError::Identifier(i),
            StoreError::Io(io) => KernelError::Io(io),
            other => KernelError::Store(other),
        }
    }
}

impl From<DigestError> for KernelError {
    fn from(e: DigestError) -> Self {
        match e {
            DigestError::UnsupportedAlgorithm(name) => KernelError::UnsupportedAlgorithm(name),
            DigestError::MalformedDigest(msg) => KernelError::MalformedDigest(msg),
        }
    }
}

/// Result type for kernel operations.
pub type Result<T> = std::result::Result<T, KernelError>;
