//! Binaries: opaque content plus recorded integrity metadata.

use linkvault_core::{
    vocab, ContentDigest, ContentMetadata, FedoraId, RdfStream, ResourceKind, Term, Transaction,
    Triple,
};
use linkvault_store::ContentReader;

use crate::description::Description;
use crate::error::{KernelError, Result};
use crate::resource::{ResourceCore, TripleStream};

/// A binary resource.
#[derive(Debug, Clone)]
pub struct Binary {
    core: ResourceCore,
}

impl Binary {
    pub(crate) fn new(core: ResourceCore) -> Self {
        Self { core }
    }

    pub(crate) fn core(&self) -> &ResourceCore {
        &self.core
    }

    pub fn id(&self) -> &str {
        self.core.fedora_id().resource_id()
    }

    pub fn fedora_id(&self) -> &FedoraId {
        self.core.fedora_id()
    }

    pub fn transaction(&self) -> &Transaction {
        self.core.transaction()
    }

    /// Recorded size, media type and digests.
    pub async fn metadata(&self) -> Result<ContentMetadata> {
        let session = self.core.session().await?;
        Ok(session.content_metadata(self.core.fedora_id()).await?)
    }

    pub async fn content_size(&self) -> Result<u64> {
        Ok(self.metadata().await?.size)
    }

    pub async fn mime_type(&self) -> Result<String> {
        Ok(self.metadata().await?.mime_type)
    }

    pub async fn content_digests(&self) -> Result<Vec<ContentDigest>> {
        Ok(self.metadata().await?.digests)
    }

    /// Open the persisted content. Dropping the reader releases it.
    pub async fn content(&self) -> Result<ContentReader> {
        let session = self.core.session().await?;
        Ok(session.read_content(self.core.fedora_id()).await?)
    }

    /// Resolve this binary's description in the same transaction.
    pub async fn description(&self) -> Result<Description> {
        let desc_id = self.core.fedora_id().description_of()?;
        let resource = self
            .core
            .factory()
            .get_resource(self.core.transaction(), &desc_id)
            .await?;
        let actual = resource.kind();
        resource
            .into_description()
            .ok_or_else(|| KernelError::WrongResourceType {
                id: desc_id,
                expected: ResourceKind::Description,
                actual,
            })
    }

    /// Statements about the binary: the managed technical properties
    /// followed by its description's statements.
    pub async fn triples(&self) -> Result<TripleStream> {
        let subject = Term::iri(self.id());
        let managed = managed_triples(&subject, &self.metadata().await?);
        let described = self.description().await?.triples().await?;
        Ok(RdfStream::from_triples(subject, managed).chain(described))
    }
}

fn managed_triples(subject: &Term, metadata: &ContentMetadata) -> Vec<Triple> {
    let mut triples = vec![
        Triple::new(
            subject.clone(),
            Term::iri(vocab::PREMIS_HAS_SIZE),
            Term::long(metadata.size),
        ),
        Triple::new(
            subject.clone(),
            Term::iri(vocab::EBUCORE_HAS_MIME_TYPE),
            Term::string(&metadata.mime_type),
        ),
    ];
    if let Some(filename) = &metadata.filename {
        triples.push(Triple::new(
            subject.clone(),
            Term::iri(vocab::EBUCORE_FILENAME),
            Term::string(filename),
        ));
    }
    for digest in &metadata.digests {
        triples.push(Triple::new(
            subject.clone(),
            Term::iri(vocab::PREMIS_HAS_MESSAGE_DIGEST),
            Term::iri(digest.to_uri()),
        ));
    }
    triples
}
