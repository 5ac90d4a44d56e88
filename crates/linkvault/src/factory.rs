//! Resource factory: resolves (transaction, identifier) to a typed resource.

use std::sync::Arc;

use tracing::{debug, trace};

use linkvault_core::{FedoraId, PathNotFound, ResourceKind, Transaction};
use linkvault_store::{SessionManager, StorageSession};

use crate::binary::Binary;
use crate::description::Description;
use crate::error::{KernelError, Result};
use crate::resource::{Container, Resource, ResourceCore};

/// Resolves identifiers to resource views within a transaction.
///
/// Cloning is cheap. Every resource the factory builds carries a clone so
/// that a description can resolve its binary (and vice versa) in the same
/// transaction without a global registry.
#[derive(Clone)]
pub struct ResourceFactory {
    sessions: Arc<dyn SessionManager>,
}

impl ResourceFactory {
    pub fn new(sessions: Arc<dyn SessionManager>) -> Self {
        Self { sessions }
    }

    /// The session for `tx`. Fails if the transaction is no longer active.
    pub(crate) async fn session(&self, tx: &Transaction) -> Result<Arc<dyn StorageSession>> {
        Ok(self.sessions.session(tx).await?)
    }

    /// Resolve `id` within `tx`.
    ///
    /// Fails with [`KernelError::PathNotFound`] if nothing exists at `id`.
    /// Repeated calls build independent, equivalent views.
    pub async fn get_resource(&self, tx: &Transaction, id: &FedoraId) -> Result<Resource> {
        let session = self.session(tx).await?;
        if !session.exists(id).await? {
            debug!(tx = %tx.id(), %id, "resource not found");
            return Err(PathNotFound::new(id.clone()).into());
        }
        let kind = session.resource_kind(id).await?;
        trace!(tx = %tx.id(), %id, %kind, "resolved resource");

        let core = ResourceCore::new(id.clone(), tx.clone(), self.clone());
        let resource = match kind {
            ResourceKind::Container => Resource::Container(Container::new(core)),
            ResourceKind::Binary => Resource::Binary(Binary::new(core)),
            ResourceKind::Description => Resource::Description(Description::new(core)),
        };
        Ok(resource)
    }

    /// Resolve `id`, requiring a binary.
    pub async fn get_binary(&self, tx: &Transaction, id: &FedoraId) -> Result<Binary> {
        let resource = self.get_resource(tx, id).await?;
        let actual = resource.kind();
        resource
            .into_binary()
            .ok_or_else(|| KernelError::WrongResourceType {
                id: id.clone(),
                expected: ResourceKind::Binary,
                actual,
            })
    }

    /// Resolve `id`, requiring a description.
    pub async fn get_description(&self, tx: &Transaction, id: &FedoraId) -> Result<Description> {
        let resource = self.get_resource(tx, id).await?;
        let actual = resource.kind();
        resource
            .into_description()
            .ok_or_else(|| KernelError::WrongResourceType {
                id: id.clone(),
                expected: ResourceKind::Description,
                actual,
            })
    }
}

impl std::fmt::Debug for ResourceFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceFactory").finish_non_exhaustive()
    }
}
