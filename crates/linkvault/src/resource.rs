//! Resource views.
//!
//! A resource is a transient view of one identifier inside one transaction.
//! It holds no session and no companion resource; every accessor goes back
//! through the factory's session provider, so a view kept past its
//! transaction fails instead of reading stale state.

use std::sync::Arc;

use linkvault_core::{FedoraId, RdfStream, ResourceKind, Transaction};
use linkvault_store::StorageSession;

use crate::binary::Binary;
use crate::description::Description;
use crate::error::{KernelError, Result};
use crate::factory::ResourceFactory;

/// A lazy stream of triples surfaced by the kernel.
pub type TripleStream = RdfStream<KernelError>;

/// State shared by every resource variant.
#[derive(Clone)]
pub(crate) struct ResourceCore {
    id: FedoraId,
    tx: Transaction,
    factory: ResourceFactory,
}

impl ResourceCore {
    pub(crate) fn new(id: FedoraId, tx: Transaction, factory: ResourceFactory) -> Self {
        Self { id, tx, factory }
    }

    pub(crate) fn fedora_id(&self) -> &FedoraId {
        &self.id
    }

    pub(crate) fn transaction(&self) -> &Transaction {
        &self.tx
    }

    pub(crate) fn factory(&self) -> &ResourceFactory {
        &self.factory
    }

    pub(crate) async fn session(&self) -> Result<Arc<dyn StorageSession>> {
        self.factory.session(&self.tx).await
    }

    /// The persisted triples for this identifier, unrewritten.
    pub(crate) async fn persisted_triples(&self) -> Result<TripleStream> {
        let stream = self.session().await?.read_triples(&self.id).await?;
        Ok(stream.map_err(KernelError::from))
    }
}

impl std::fmt::Debug for ResourceCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceCore")
            .field("id", &self.id)
            .field("tx", &self.tx.id())
            .finish()
    }
}

/// A resolved resource.
#[derive(Debug, Clone)]
pub enum Resource {
    Container(Container),
    Binary(Binary),
    Description(Description),
}

impl Resource {
    fn core(&self) -> &ResourceCore {
        match self {
            Resource::Container(c) => &c.core,
            Resource::Binary(b) => b.core(),
            Resource::Description(d) => d.core(),
        }
    }

    /// Externally visible identifier, used as the RDF subject.
    pub fn id(&self) -> &str {
        self.core().fedora_id().resource_id()
    }

    pub fn fedora_id(&self) -> &FedoraId {
        self.core().fedora_id()
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Container(_) => ResourceKind::Container,
            Resource::Binary(_) => ResourceKind::Binary,
            Resource::Description(_) => ResourceKind::Description,
        }
    }

    pub fn transaction(&self) -> &Transaction {
        self.core().transaction()
    }

    /// Statements about this resource.
    pub async fn triples(&self) -> Result<TripleStream> {
        match self {
            Resource::Container(c) => c.triples().await,
            Resource::Binary(b) => b.triples().await,
            Resource::Description(d) => d.triples().await,
        }
    }

    pub fn as_binary(&self) -> Option<&Binary> {
        match self {
            Resource::Binary(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_description(&self) -> Option<&Description> {
        match self {
            Resource::Description(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_container(&self) -> Option<&Container> {
        match self {
            Resource::Container(c) => Some(c),
            _ => None,
        }
    }

    pub fn into_binary(self) -> Option<Binary> {
        match self {
            Resource::Binary(b) => Some(b),
            _ => None,
        }
    }

    pub fn into_description(self) -> Option<Description> {
        match self {
            Resource::Description(d) => Some(d),
            _ => None,
        }
    }
}

/// An RDF source that may contain other resources.
#[derive(Debug, Clone)]
pub struct Container {
    core: ResourceCore,
}

impl Container {
    pub(crate) fn new(core: ResourceCore) -> Self {
        Self { core }
    }

    pub fn id(&self) -> &str {
        self.core.fedora_id().resource_id()
    }

    pub fn fedora_id(&self) -> &FedoraId {
        self.core.fedora_id()
    }

    /// The persisted triples, unchanged.
    pub async fn triples(&self) -> Result<TripleStream> {
        self.core.persisted_triples().await
    }

    /// The parent container, or `None` at the root.
    pub async fn parent(&self) -> Result<Option<Resource>> {
        match self.core.fedora_id().parent() {
            Some(parent) => {
                let resource = self
                    .core
                    .factory()
                    .get_resource(self.core.transaction(), &parent)
                    .await?;
                Ok(Some(resource))
            }
            None => Ok(None),
        }
    }
}
