//! The Repository: unified API over resolution, transactions and fixity.

use std::collections::BTreeSet;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info};

use linkvault_core::{
    ContentMetadata, FedoraId, MultiDigester, ResourceKind, Term, Transaction, Triple,
};
use linkvault_store::{SessionManager, StorageSession};

use crate::binary::Binary;
use crate::config::KernelConfig;
use crate::description::Description;
use crate::error::{KernelError, Result};
use crate::factory::ResourceFactory;
use crate::fixity::{FixityReport, FixityService};
use crate::resource::{Container, Resource, TripleStream};

/// The main Repository struct.
///
/// Provides a unified API for:
/// - Beginning, committing and rolling back transactions
/// - Resolving identifiers to resources
/// - Writing containers, binaries and descriptions
/// - Verifying binary fixity
pub struct Repository<M: SessionManager> {
    /// The persistence session provider.
    sessions: Arc<M>,
    factory: ResourceFactory,
    fixity: FixityService,
    config: KernelConfig,
}

impl<M: SessionManager + 'static> Repository<M> {
    /// Create a new repository over a session manager.
    pub fn new(sessions: M, config: KernelConfig) -> Self {
        let sessions = Arc::new(sessions);
        let provider: Arc<dyn SessionManager> = sessions.clone();
        Self {
            sessions,
            factory: ResourceFactory::new(provider),
            fixity: FixityService::new(&config),
            config,
        }
    }

    pub fn sessions(&self) -> &M {
        &self.sessions
    }

    pub fn factory(&self) -> &ResourceFactory {
        &self.factory
    }

    pub fn fixity(&self) -> &FixityService {
        &self.fixity
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transactions
    // ─────────────────────────────────────────────────────────────────────────

    /// Begin a new transaction.
    pub fn begin(&self) -> Transaction {
        let tx = Transaction::begin();
        debug!(tx = %tx.id(), "began transaction");
        tx
    }

    /// Commit the transaction and publish its writes.
    ///
    /// The committed state is claimed first, so a racing rollback on a clone
    /// of `tx` fails instead of landing after publication. If publishing
    /// then fails the transaction stays committed and the error is
    /// returned; storage settles the overlay on its next reconcile.
    pub async fn commit(&self, tx: &Transaction) -> Result<()> {
        tx.commit()?;
        self.sessions.commit(tx).await?;
        info!(tx = %tx.id(), "committed transaction");
        Ok(())
    }

    /// Roll the transaction back and discard its writes.
    pub async fn rollback(&self, tx: &Transaction) -> Result<()> {
        tx.rollback()?;
        self.sessions.rollback(tx).await?;
        info!(tx = %tx.id(), "rolled back transaction");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Resolution
    // ─────────────────────────────────────────────────────────────────────────

    /// Resolve an identifier within a transaction.
    pub async fn get_resource(&self, tx: &Transaction, id: &FedoraId) -> Result<Resource> {
        self.factory.get_resource(tx, id).await
    }

    /// Parse a raw identifier and resolve it.
    pub async fn resolve(&self, tx: &Transaction, raw: &str) -> Result<Resource> {
        let id = FedoraId::create(raw)?;
        self.factory.get_resource(tx, &id).await
    }

    pub async fn exists(&self, tx: &Transaction, id: &FedoraId) -> Result<bool> {
        Ok(self.session(tx).await?.exists(id).await?)
    }

    /// Resolve the binary at `id`, or the binary a description at `id` describes.
    ///
    /// Not-found is always reported on the checked carrier here.
    pub async fn binary_for(&self, tx: &Transaction, id: &FedoraId) -> Result<Binary> {
        let target = id.base_id();
        self.factory.get_binary(tx, &target).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Writes
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a container with the given triples.
    pub async fn create_container(
        &self,
        tx: &Transaction,
        id: &FedoraId,
        triples: Vec<Triple>,
    ) -> Result<Container> {
        self.session(tx).await?.create_container(id, triples).await?;
        let resource = self.factory.get_resource(tx, id).await?;
        let actual = resource.kind();
        match resource {
            Resource::Container(c) => Ok(c),
            _ => Err(KernelError::WrongResourceType {
                id: id.clone(),
                expected: ResourceKind::Container,
                actual,
            }),
        }
    }

    /// Write a binary, recording its size and digests under the configured
    /// algorithms.
    pub async fn put_binary(
        &self,
        tx: &Transaction,
        id: &FedoraId,
        content: Bytes,
        mime_type: &str,
    ) -> Result<Binary> {
        let mut digester = MultiDigester::new(self.config.digest_algorithms.iter().copied());
        digester.update(&content);
        let metadata = digester
            .finalize()
            .into_iter()
            .fold(ContentMetadata::new(content.len() as u64, mime_type), |m, d| {
                m.with_digest(d)
            });
        self.put_binary_with_metadata(tx, id, content, metadata)
            .await
    }

    /// Write a binary with caller-asserted metadata.
    ///
    /// The recorded digests are taken as given; a later fixity check will
    /// report any disagreement with the content.
    pub async fn put_binary_with_metadata(
        &self,
        tx: &Transaction,
        id: &FedoraId,
        content: Bytes,
        metadata: ContentMetadata,
    ) -> Result<Binary> {
        self.session(tx)
            .await?
            .write_binary(id, content, metadata)
            .await?;
        debug!(tx = %tx.id(), %id, "wrote binary");
        self.factory.get_binary(tx, id).await
    }

    /// Replace the statements describing a binary.
    ///
    /// `binary` may name the binary or its description. Statements about the
    /// binary are persisted against the description's own node.
    pub async fn replace_description(
        &self,
        tx: &Transaction,
        binary: &FedoraId,
        triples: Vec<Triple>,
    ) -> Result<Description> {
        let binary = binary.base_id();
        let desc_id = binary.description_of()?;
        let public = Term::iri(binary.resource_id());
        let shadow = Term::iri(desc_id.resource_id());
        let stored = triples
            .into_iter()
            .map(|t| {
                if t.subject == public {
                    t.with_subject(shadow.clone())
                } else {
                    t
                }
            })
            .collect();
        self.session(tx)
            .await?
            .write_triples(&desc_id, stored)
            .await?;
        self.factory.get_description(tx, &desc_id).await
    }

    /// Delete a container or binary.
    pub async fn delete(&self, tx: &Transaction, id: &FedoraId) -> Result<()> {
        self.session(tx).await?.delete(id).await?;
        debug!(tx = %tx.id(), %id, "deleted resource");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Fixity
    // ─────────────────────────────────────────────────────────────────────────

    /// Compute digest URIs for the binary at `id` under exactly `algorithms`.
    pub async fn check_fixity<I, S>(
        &self,
        tx: &Transaction,
        id: &FedoraId,
        algorithms: I,
    ) -> Result<BTreeSet<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let binary = self.binary_for(tx, id).await?;
        self.fixity.check_fixity(&binary, algorithms).await
    }

    /// Verify the binary at `id` against its recorded metadata.
    pub async fn verify(&self, tx: &Transaction, id: &FedoraId) -> Result<FixityReport> {
        let binary = self.binary_for(tx, id).await?;
        self.fixity.verify(&binary).await
    }

    /// Verify the binary at `id` and render the outcome as triples.
    pub async fn compute_fixity(&self, tx: &Transaction, id: &FedoraId) -> Result<TripleStream> {
        let binary = self.binary_for(tx, id).await?;
        self.fixity.compute_fixity(&binary).await
    }

    async fn session(&self, tx: &Transaction) -> Result<Arc<dyn StorageSession>> {
        Ok(self.sessions.session(tx).await?)
    }
}
