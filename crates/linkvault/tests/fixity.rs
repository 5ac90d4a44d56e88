//! Fixity verification against recorded and asserted baselines.

use std::collections::BTreeSet;

use bytes::Bytes;

use linkvault::core::{vocab, ContentMetadata, DigestAlgorithm, Term};
use linkvault::store::MemorySessionManager;
use linkvault::{FixityOutcome, KernelConfig, KernelError, Repository};
use linkvault_testkit::{init_tracing, ProbeSessionManager, TestRepository};

const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";
const ABC_MD5: &str = "900150983cd24fb0d6963f7d28e17f72";

#[tokio::test]
async fn check_fixity_returns_recorded_digest() {
    let fixture = TestRepository::new();
    let id = fixture.seed_binary("abc.txt", b"abc").await;

    let tx = fixture.repo.begin();
    let binary = fixture.repo.binary_for(&tx, &id).await.unwrap();
    let recorded = binary.content_digests().await.unwrap();
    assert_eq!(recorded[0].hex(), ABC_SHA256);

    let digests = fixture.repo.check_fixity(&tx, &id, ["sha-256"]).await.unwrap();
    assert_eq!(digests, BTreeSet::from([format!("sha-256:{ABC_SHA256}")]));
}

#[tokio::test]
async fn check_fixity_computes_every_requested_algorithm() {
    let fixture = TestRepository::new();
    let id = fixture.seed_binary("abc.txt", b"abc").await;

    let tx = fixture.repo.begin();
    let digests = fixture
        .repo
        .check_fixity(&tx, &id, ["MD5", "sha256", "sha-256"])
        .await
        .unwrap();
    assert_eq!(
        digests,
        BTreeSet::from([format!("md5:{ABC_MD5}"), format!("sha-256:{ABC_SHA256}")])
    );
}

#[tokio::test]
async fn check_fixity_through_description_identifier() {
    let fixture = TestRepository::new();
    let id = fixture.seed_binary("abc.txt", b"abc").await;

    let tx = fixture.repo.begin();
    let digests = fixture
        .repo
        .check_fixity(&tx, &id.description_of().unwrap(), ["sha-256"])
        .await
        .unwrap();
    assert_eq!(digests.len(), 1);
}

#[tokio::test]
async fn unsupported_algorithm_fails_whole_request() {
    let fixture = TestRepository::new();
    let id = fixture.seed_binary("abc.txt", b"abc").await;

    let tx = fixture.repo.begin();
    let err = fixture
        .repo
        .check_fixity(&tx, &id, ["md5", "not-an-algorithm"])
        .await
        .unwrap_err();
    match err {
        KernelError::UnsupportedAlgorithm(name) => assert_eq!(name, "not-an-algorithm"),
        other => panic!("expected UnsupportedAlgorithm, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_request_computes_nothing() {
    let fixture = TestRepository::new();
    let id = fixture.seed_binary("abc.txt", b"abc").await;

    let tx = fixture.repo.begin();
    let digests = fixture
        .repo
        .check_fixity(&tx, &id, Vec::<String>::new())
        .await
        .unwrap();
    assert!(digests.is_empty());
}

#[tokio::test]
async fn fixity_on_missing_binary_is_not_found() {
    let fixture = TestRepository::new();
    let tx = fixture.repo.begin();
    let err = fixture
        .repo
        .check_fixity(&tx, &TestRepository::id("ghost"), ["sha-256"])
        .await
        .unwrap_err();
    assert!(matches!(err, KernelError::PathNotFound(_)));
}

#[tokio::test]
async fn fixity_on_container_is_wrong_type() {
    let fixture = TestRepository::new();
    let id = fixture.seed_container("folder").await;
    let tx = fixture.repo.begin();
    let err = fixture.repo.verify(&tx, &id).await.unwrap_err();
    assert!(matches!(err, KernelError::WrongResourceType { .. }));
}

#[tokio::test]
async fn intact_binary_matches() {
    let fixture = TestRepository::new();
    let id = fixture.seed_binary("ok.bin", &[7u8; 1000]).await;

    let tx = fixture.repo.begin();
    let report = fixture.repo.verify(&tx, &id).await.unwrap();
    assert!(report.is_ok());
    assert_eq!(report.outcomes(), BTreeSet::from([FixityOutcome::Match]));
    assert_eq!(report.results[0].computed_size, 1000);
}

#[tokio::test]
async fn tampered_byte_is_digest_mismatch() {
    let fixture = TestRepository::new();
    let id = fixture.seed_tampered_binary("bad.bin", b"original content").await;

    let tx = fixture.repo.begin();
    let report = fixture.repo.verify(&tx, &id).await.unwrap();
    assert!(!report.is_ok());
    assert_eq!(
        report.outcomes(),
        BTreeSet::from([FixityOutcome::DigestMismatch])
    );
}

#[tokio::test]
async fn wrong_expected_size_is_size_mismatch() {
    let fixture = TestRepository::new();
    let id = fixture.seed_binary("abc.txt", b"abc").await;

    let tx = fixture.repo.begin();
    let binary = fixture.repo.binary_for(&tx, &id).await.unwrap();
    let report = fixture
        .repo
        .fixity()
        .verify_against(&binary, &format!("sha-256:{ABC_SHA256}"), 4)
        .await
        .unwrap();
    assert_eq!(report.outcomes(), BTreeSet::from([FixityOutcome::SizeMismatch]));
    assert_eq!(report.results[0].expected_size, Some(4));
    assert_eq!(report.results[0].computed_size, 3);
}

#[tokio::test]
async fn wrong_digest_and_size_report_both() {
    let fixture = TestRepository::new();
    let id = fixture.seed_binary("abc.txt", b"abc").await;

    let tx = fixture.repo.begin();
    let binary = fixture.repo.binary_for(&tx, &id).await.unwrap();
    let report = fixture
        .repo
        .fixity()
        .verify_against(&binary, &format!("urn:md5:{}", "0".repeat(32)), 10)
        .await
        .unwrap();
    assert_eq!(
        report.outcomes(),
        BTreeSet::from([FixityOutcome::DigestMismatch, FixityOutcome::SizeMismatch])
    );
}

#[tokio::test]
async fn malformed_expected_digest_is_rejected() {
    let fixture = TestRepository::new();
    let id = fixture.seed_binary("abc.txt", b"abc").await;

    let tx = fixture.repo.begin();
    let binary = fixture.repo.binary_for(&tx, &id).await.unwrap();
    let err = fixture
        .repo
        .fixity()
        .verify_against(&binary, "sha-256:xyz", 3)
        .await
        .unwrap_err();
    assert!(matches!(err, KernelError::MalformedDigest(_)));
}

#[tokio::test]
async fn fixity_renders_premis_triples() {
    let fixture = TestRepository::new();
    let id = fixture.seed_tampered_binary("bad.bin", b"abc").await;

    let tx = fixture.repo.begin();
    let stream = fixture.repo.compute_fixity(&tx, &id).await.unwrap();
    let subject = Term::iri(id.resource_id());
    assert_eq!(stream.topic(), &subject);

    let triples = stream.collect_triples().unwrap();
    let node = triples
        .iter()
        .find(|t| t.subject == subject && t.predicate == Term::iri(vocab::PREMIS_HAS_FIXITY))
        .map(|t| t.object.clone())
        .unwrap();
    let about_node: Vec<_> = triples.iter().filter(|t| t.subject == node).collect();
    assert!(about_node.iter().any(|t| {
        t.predicate == Term::iri(vocab::PREMIS_HAS_EVENT_OUTCOME)
            && t.object == Term::string("BAD_CHECKSUM")
    }));
    assert!(about_node.iter().any(|t| {
        t.predicate == Term::iri(vocab::PREMIS_HAS_MESSAGE_DIGEST_ALGORITHM)
            && t.object == Term::string("SHA-256")
    }));
}

#[tokio::test]
async fn verification_leaves_metadata_untouched() {
    let fixture = TestRepository::new();
    let id = fixture.seed_tampered_binary("bad.bin", b"abc").await;

    let tx = fixture.repo.begin();
    let binary = fixture.repo.binary_for(&tx, &id).await.unwrap();
    let before = binary.metadata().await.unwrap();
    fixture.repo.verify(&tx, &id).await.unwrap();
    assert_eq!(binary.metadata().await.unwrap(), before);
}

#[tokio::test]
async fn rolled_back_write_does_not_change_recorded_digest() {
    let fixture = TestRepository::new();
    let id = fixture.seed_binary("abc.txt", b"abc").await;

    let tx = fixture.repo.begin();
    fixture
        .repo
        .put_binary(&tx, &id, Bytes::from_static(b"abcd"), "text/plain")
        .await
        .unwrap();
    fixture.repo.rollback(&tx).await.unwrap();

    let tx2 = fixture.repo.begin();
    let digests = fixture.repo.check_fixity(&tx2, &id, ["sha-256"]).await.unwrap();
    assert_eq!(digests, BTreeSet::from([format!("sha-256:{ABC_SHA256}")]));
    let binary = fixture.repo.binary_for(&tx2, &id).await.unwrap();
    assert_eq!(binary.content_size().await.unwrap(), 3);
}

#[tokio::test]
async fn fixity_check_then_rollback_leaves_metadata_unchanged() {
    let fixture = TestRepository::new();
    let id = fixture.seed_binary("abc.txt", b"abc").await;

    let tx = fixture.repo.begin();
    let before = fixture
        .repo
        .binary_for(&tx, &id)
        .await
        .unwrap()
        .metadata()
        .await
        .unwrap();
    let digests = fixture.repo.check_fixity(&tx, &id, ["sha-256"]).await.unwrap();
    assert_eq!(digests, BTreeSet::from([format!("sha-256:{ABC_SHA256}")]));
    fixture.repo.verify(&tx, &id).await.unwrap();
    fixture.repo.rollback(&tx).await.unwrap();

    let tx2 = fixture.repo.begin();
    let after = fixture
        .repo
        .binary_for(&tx2, &id)
        .await
        .unwrap()
        .metadata()
        .await
        .unwrap();
    assert_eq!(after, before);
    assert_eq!(after.size, 3);
    assert_eq!(
        after.digest_for(DigestAlgorithm::Sha256).map(|d| d.hex()),
        Some(ABC_SHA256)
    );
}

#[tokio::test]
async fn binary_without_recorded_digests_uses_defaults() {
    let fixture = TestRepository::new();
    let id = TestRepository::id("bare");
    let tx = fixture.repo.begin();
    fixture
        .repo
        .put_binary_with_metadata(
            &tx,
            &id,
            Bytes::from_static(b"abc"),
            ContentMetadata::new(3, "text/plain"),
        )
        .await
        .unwrap();

    let report = fixture.repo.verify(&tx, &id).await.unwrap();
    assert!(report.is_ok());
    assert_eq!(report.results.len(), 1);
    let result = &report.results[0];
    assert_eq!(result.algorithm, DigestAlgorithm::Sha256);
    assert_eq!(result.computed.hex(), ABC_SHA256);
    assert_eq!(result.expected, None);
    assert_eq!(result.expected_size, Some(3));
}

#[tokio::test]
async fn rollback_mid_read_aborts_and_releases_content() {
    init_tracing();
    let sessions = ProbeSessionManager::new(MemorySessionManager::new());
    let probe = sessions.probe();
    let config = KernelConfig::default()
        .with_fixity_chunk_size(4)
        .with_digest_algorithms([DigestAlgorithm::Sha256, DigestAlgorithm::Md5]);
    let repo = Repository::new(sessions, config);

    let id = TestRepository::id("big.bin");
    let content = vec![42u8; 256];
    let tx = repo.begin();
    repo.put_binary(&tx, &id, Bytes::from(content), "application/octet-stream")
        .await
        .unwrap();
    repo.commit(&tx).await.unwrap();

    probe.interrupt_after(8);
    let tx = repo.begin();
    let err = repo.verify(&tx, &id).await.unwrap_err();
    assert!(matches!(err, KernelError::Transaction(_)));
    assert!(!tx.is_active());
    assert!(probe.bytes_read() < 256);
    assert_eq!(probe.opened(), 1);
    assert_eq!(probe.open(), 0);

    // The aborted transaction leaves no staged state behind.
    assert_eq!(repo.sessions().inner().open_sessions(), 0);
    assert!(repo.rollback(&tx).await.is_err());
}

#[tokio::test]
async fn dropping_a_check_releases_content() {
    let sessions = ProbeSessionManager::new(MemorySessionManager::new());
    let probe = sessions.probe();
    let repo = Repository::new(sessions, KernelConfig::default());

    let id = TestRepository::id("drop.bin");
    let tx = repo.begin();
    repo.put_binary(&tx, &id, Bytes::from_static(b"abc"), "text/plain")
        .await
        .unwrap();

    let binary = repo.binary_for(&tx, &id).await.unwrap();
    let reader = binary.content().await.unwrap();
    assert_eq!(probe.open(), 1);
    drop(reader);
    assert_eq!(probe.open(), 0);

    let digests = repo.check_fixity(&tx, &id, ["sha-256"]).await.unwrap();
    assert_eq!(digests.len(), 1);
    assert_eq!(probe.open(), 0);
}
