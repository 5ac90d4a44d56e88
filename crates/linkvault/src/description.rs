//! Descriptions: the separately addressed RDF about a binary.

use linkvault_core::{FedoraId, Term};

use crate::error::Result;
use crate::resource::{Resource, ResourceCore, TripleStream};

/// The description of a binary.
///
/// Addressed as `<binary>/fcr:metadata`, but every statement it surfaces is
/// about the binary. Triples are persisted against the description's own
/// storage node and rewritten on the way out.
#[derive(Debug, Clone)]
pub struct Description {
    core: ResourceCore,
}

impl Description {
    pub(crate) fn new(core: ResourceCore) -> Self {
        Self { core }
    }

    pub(crate) fn core(&self) -> &ResourceCore {
        &self.core
    }

    /// The description's own identifier.
    pub fn id(&self) -> &str {
        self.core.fedora_id().resource_id()
    }

    pub fn fedora_id(&self) -> &FedoraId {
        self.core.fedora_id()
    }

    /// Identifier of the binary this describes.
    pub fn described_id(&self) -> Result<FedoraId> {
        Ok(self.core.fedora_id().containing_of()?)
    }

    /// Resolve the binary this describes, in the same transaction.
    ///
    /// A description always has a binary, so a missing one is reported on
    /// the runtime carrier, [`KernelError::PathNotFoundRuntime`]. Callers that
    /// want the checked form should resolve [`Self::described_id`] through
    /// the factory themselves.
    ///
    /// [`KernelError::PathNotFoundRuntime`]: crate::KernelError::PathNotFoundRuntime
    pub async fn described_resource(&self) -> Result<Resource> {
        let described = self.described_id()?;
        self.core
            .factory()
            .get_resource(self.core.transaction(), &described)
            .await
            .map_err(|e| e.into_runtime())
    }

    /// The description's statements, with every subject set to the binary.
    ///
    /// Predicates and objects pass through unchanged. The stream's topic is
    /// the binary as well. Each call yields a fresh lazy stream.
    pub async fn triples(&self) -> Result<TripleStream> {
        let subject = Term::iri(self.described_resource().await?.id());
        let persisted = self.core.persisted_triples().await?;
        let rewrite_to = subject.clone();
        Ok(persisted
            .with_topic(subject)
            .map_triples(move |t| Ok(t.with_subject(rewrite_to.clone()))))
    }
}
