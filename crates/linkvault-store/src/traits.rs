//! Session traits: the abstract interface to persistence.
//!
//! The kernel is storage-agnostic. It only ever reaches bytes and triples
//! through a [`StorageSession`] obtained for its transaction.

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncRead;

use linkvault_core::{ContentMetadata, FedoraId, RdfStream, ResourceKind, Transaction, Triple};

use crate::error::{Result, StoreError};

/// A lazy stream of persisted triples.
pub type TripleStream = RdfStream<StoreError>;

/// An open handle on a binary's content.
///
/// Dropping the reader releases the handle.
pub type ContentReader = Pin<Box<dyn AsyncRead + Send>>;

/// A per-transaction view of persisted state.
///
/// Reads observe the owning transaction's staged writes layered over
/// committed state. A session must not be used after its transaction has
/// reached a terminal state; every call fails with
/// [`StoreError::Transaction`] once it has.
#[async_trait]
pub trait StorageSession: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────

    /// The owning transaction, or `None` for a read-only session.
    fn transaction(&self) -> Option<&Transaction>;

    /// Whether the identifier denotes an addressable resource.
    async fn exists(&self, id: &FedoraId) -> Result<bool>;

    /// The variant tag of the resource at `id`.
    ///
    /// Fails with [`StoreError::PathNotFound`] if nothing is there.
    async fn resource_kind(&self, id: &FedoraId) -> Result<ResourceKind>;

    /// The persisted triples for `id`, exactly as stored.
    ///
    /// Description triples carry the description's own identifier as their
    /// subject; rewriting them is the caller's business.
    async fn read_triples(&self, id: &FedoraId) -> Result<TripleStream>;

    /// Open the content of the binary at `id`.
    async fn read_content(&self, id: &FedoraId) -> Result<ContentReader>;

    /// The recorded size, media type and digests of the binary at `id`.
    async fn content_metadata(&self, id: &FedoraId) -> Result<ContentMetadata>;

    // ─────────────────────────────────────────────────────────────────────────
    // Writes
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a container holding the given triples.
    async fn create_container(&self, id: &FedoraId, triples: Vec<Triple>) -> Result<()>;

    /// Create or replace a binary's content and recorded metadata.
    ///
    /// Creating a binary also creates its (empty) description. Replacing
    /// content keeps the existing description.
    async fn write_binary(
        &self,
        id: &FedoraId,
        content: Bytes,
        metadata: ContentMetadata,
    ) -> Result<()>;

    /// Replace the triples of a container or a description.
    async fn write_triples(&self, id: &FedoraId, triples: Vec<Triple>) -> Result<()>;

    /// Delete a container or binary. A binary takes its description with it.
    async fn delete(&self, id: &FedoraId) -> Result<()>;
}

/// Supplies sessions per transaction and finalizes them.
#[async_trait]
pub trait SessionManager: Send + Sync {
    /// The session for `tx`, created on first use.
    ///
    /// Fails if `tx` is no longer active. Staged state must not outlive the
    /// transaction: once `tx` is terminal its overlay is settled even if
    /// [`SessionManager::commit`] or [`SessionManager::rollback`] is never
    /// called.
    async fn session(&self, tx: &Transaction) -> Result<Arc<dyn StorageSession>>;

    /// A session over committed state that rejects writes.
    async fn read_only_session(&self) -> Result<Arc<dyn StorageSession>>;

    /// Make the writes staged under `tx` visible to everyone.
    ///
    /// `tx` must already have claimed [`TransactionState::Committed`]; the
    /// handle's state decides the outcome and this call only settles
    /// storage to match. Fails with [`TransactionError::Active`] for an
    /// active transaction. Repeating the call is harmless.
    ///
    /// [`TransactionState::Committed`]: linkvault_core::TransactionState::Committed
    /// [`TransactionError::Active`]: linkvault_core::TransactionError::Active
    async fn commit(&self, tx: &Transaction) -> Result<()>;

    /// Discard the writes staged under `tx`, which must already have
    /// claimed the rolled-back state.
    async fn rollback(&self, tx: &Transaction) -> Result<()>;
}
