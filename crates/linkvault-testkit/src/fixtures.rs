//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use bytes::Bytes;

use linkvault::{KernelConfig, Repository};
use linkvault_core::{ContentMetadata, DigestAlgorithm, FedoraId, Term, Triple};
use linkvault_store::MemorySessionManager;

/// Install a test-writer tracing subscriber. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// A repository over fresh in-memory sessions.
pub struct TestRepository {
    pub repo: Repository<MemorySessionManager>,
}

impl TestRepository {
    /// Create a fixture with the default configuration.
    pub fn new() -> Self {
        Self::with_config(KernelConfig::default())
    }

    pub fn with_config(config: KernelConfig) -> Self {
        init_tracing();
        Self {
            repo: Repository::new(MemorySessionManager::new(), config),
        }
    }

    /// Parse an identifier, panicking on malformed input.
    pub fn id(raw: &str) -> FedoraId {
        FedoraId::create(raw).expect("valid test identifier")
    }

    /// Commit a binary holding `content` and return its identifier.
    pub async fn seed_binary(&self, raw: &str, content: &[u8]) -> FedoraId {
        let id = Self::id(raw);
        let tx = self.repo.begin();
        self.repo
            .put_binary(&tx, &id, Bytes::copy_from_slice(content), "application/octet-stream")
            .await
            .expect("seed binary");
        self.repo.commit(&tx).await.expect("commit seed");
        id
    }

    /// Commit a binary together with statements about it.
    pub async fn seed_described_binary(
        &self,
        raw: &str,
        content: &[u8],
        triples: Vec<Triple>,
    ) -> FedoraId {
        let id = self.seed_binary(raw, content).await;
        let tx = self.repo.begin();
        self.repo
            .replace_description(&tx, &id, triples)
            .await
            .expect("seed description");
        self.repo.commit(&tx).await.expect("commit description");
        id
    }

    /// Commit a binary whose content no longer matches its recorded digest.
    ///
    /// The recorded size and sha-256 are those of `original`; the stored
    /// content is `original` with its first byte flipped.
    pub async fn seed_tampered_binary(&self, raw: &str, original: &[u8]) -> FedoraId {
        assert!(!original.is_empty(), "cannot tamper with empty content");
        let id = Self::id(raw);
        let metadata = ContentMetadata::new(original.len() as u64, "application/octet-stream")
            .with_digest(DigestAlgorithm::Sha256.digest(original));
        let mut tampered = original.to_vec();
        tampered[0] ^= 0xff;

        let tx = self.repo.begin();
        self.repo
            .put_binary_with_metadata(&tx, &id, Bytes::from(tampered), metadata)
            .await
            .expect("seed tampered binary");
        self.repo.commit(&tx).await.expect("commit tampered");
        id
    }

    /// Commit an empty container.
    pub async fn seed_container(&self, raw: &str) -> FedoraId {
        let id = Self::id(raw);
        let tx = self.repo.begin();
        self.repo
            .create_container(&tx, &id, Vec::new())
            .await
            .expect("seed container");
        self.repo.commit(&tx).await.expect("commit container");
        id
    }
}

impl Default for TestRepository {
    fn default() -> Self {
        Self::new()
    }
}

/// A `dc:title` statement about `id`.
pub fn title(id: &FedoraId, title: &str) -> Triple {
    Triple::new(
        Term::iri(id.resource_id()),
        Term::iri(linkvault_core::vocab::DC_TITLE),
        Term::string(title),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seeded_binary_is_visible_to_new_transactions() {
        let fixture = TestRepository::new();
        let id = fixture.seed_binary("seed/one", b"abc").await;

        let tx = fixture.repo.begin();
        assert!(fixture.repo.exists(&tx, &id).await.unwrap());
        assert!(fixture
            .repo
            .exists(&tx, &id.description_of().unwrap())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_tampered_binary_keeps_recorded_size() {
        let fixture = TestRepository::new();
        let id = fixture.seed_tampered_binary("seed/bad", b"payload").await;

        let tx = fixture.repo.begin();
        let binary = fixture.repo.binary_for(&tx, &id).await.unwrap();
        assert_eq!(binary.content_size().await.unwrap(), 7);
    }
}
