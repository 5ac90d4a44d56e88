//! Resolution of identifiers to resources within transactions.

use bytes::Bytes;

use linkvault::core::{FedoraId, IdentifierError, ResourceKind, TransactionError};
use linkvault::store::StoreError;
use linkvault::KernelError;
use linkvault_testkit::TestRepository;

#[tokio::test]
async fn resolves_each_variant() {
    let fixture = TestRepository::new();
    let container = fixture.seed_container("albums").await;
    let binary = fixture.seed_binary("albums/cover.png", b"\x89PNG").await;
    let description = binary.description_of().unwrap();

    let tx = fixture.repo.begin();
    let kinds = [
        (&container, ResourceKind::Container),
        (&binary, ResourceKind::Binary),
        (&description, ResourceKind::Description),
    ];
    for (id, expected) in kinds {
        let resource = fixture.repo.get_resource(&tx, id).await.unwrap();
        assert_eq!(resource.kind(), expected);
        assert_eq!(resource.fedora_id(), id);
        assert_eq!(resource.id(), id.resource_id());
    }
}

#[tokio::test]
async fn missing_identifier_is_checked_not_found() {
    let fixture = TestRepository::new();
    let tx = fixture.repo.begin();
    let id = TestRepository::id("nowhere/at/all");

    let err = fixture.repo.get_resource(&tx, &id).await.unwrap_err();
    assert!(matches!(err, KernelError::PathNotFound(_)));
    assert_eq!(err.not_found().map(|p| &p.id), Some(&id));
}

#[tokio::test]
async fn description_of_missing_binary_is_not_found() {
    let fixture = TestRepository::new();
    fixture.seed_container("box").await;
    let tx = fixture.repo.begin();

    // A container has no description.
    let id = TestRepository::id("box/fcr:metadata");
    let err = fixture.repo.get_resource(&tx, &id).await.unwrap_err();
    assert!(matches!(err, KernelError::PathNotFound(_)));
}

#[tokio::test]
async fn resolve_parses_raw_identifiers() {
    let fixture = TestRepository::new();
    let id = fixture.seed_binary("docs/a.txt", b"a").await;
    let tx = fixture.repo.begin();

    for raw in ["docs/a.txt", "/docs/a.txt", "info:fedora/docs/a.txt"] {
        let resource = fixture.repo.resolve(&tx, raw).await.unwrap();
        assert_eq!(resource.fedora_id(), &id);
    }

    let err = fixture
        .repo
        .resolve(&tx, "docs/a.txt/fcr:metadata/fcr:metadata")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        KernelError::Identifier(IdentifierError::Malformed { .. })
    ));
}

#[tokio::test]
async fn repeated_resolution_yields_equivalent_views() {
    let fixture = TestRepository::new();
    let id = fixture.seed_binary("same", b"x").await;
    let tx = fixture.repo.begin();

    let a = fixture.repo.get_resource(&tx, &id).await.unwrap();
    let b = fixture.repo.get_resource(&tx, &id).await.unwrap();
    assert_eq!(a.id(), b.id());
    assert_eq!(a.kind(), b.kind());
}

#[tokio::test]
async fn uncommitted_writes_are_isolated() {
    let fixture = TestRepository::new();
    let id = TestRepository::id("draft");

    let writer = fixture.repo.begin();
    fixture
        .repo
        .put_binary(&writer, &id, Bytes::from_static(b"wip"), "text/plain")
        .await
        .unwrap();

    let reader = fixture.repo.begin();
    assert!(!fixture.repo.exists(&reader, &id).await.unwrap());
    assert!(fixture.repo.exists(&writer, &id).await.unwrap());

    fixture.repo.commit(&writer).await.unwrap();
    assert!(fixture.repo.exists(&reader, &id).await.unwrap());
}

#[tokio::test]
async fn operations_fail_after_terminal_transaction() {
    let fixture = TestRepository::new();
    let id = fixture.seed_binary("closed", b"data").await;

    let tx = fixture.repo.begin();
    let binary = fixture.repo.binary_for(&tx, &id).await.unwrap();
    fixture.repo.commit(&tx).await.unwrap();

    let err = fixture.repo.get_resource(&tx, &id).await.unwrap_err();
    assert!(matches!(
        err,
        KernelError::Transaction(TransactionError::Closed { .. })
    ));

    // A view kept past its transaction fails rather than reading stale state.
    let err = binary.metadata().await.unwrap_err();
    assert!(matches!(err, KernelError::Transaction(_)));

    // A terminal transaction cannot be ended twice.
    let err = fixture.repo.rollback(&tx).await.unwrap_err();
    assert!(matches!(err, KernelError::Transaction(_)));
}

#[tokio::test]
async fn container_parent_walks_to_root() {
    let fixture = TestRepository::new();
    fixture.seed_container("top").await;
    let child = fixture.seed_container("top/child").await;

    let tx = fixture.repo.begin();
    let resource = fixture.repo.get_resource(&tx, &child).await.unwrap();
    let parent = resource
        .as_container()
        .unwrap()
        .parent()
        .await
        .unwrap()
        .unwrap();
    assert_eq!(parent.fedora_id(), &TestRepository::id("top"));

    let root = parent
        .as_container()
        .unwrap()
        .parent()
        .await
        .unwrap()
        .unwrap();
    assert_eq!(root.fedora_id(), &FedoraId::root());
    assert_eq!(root.kind(), ResourceKind::Container);

    assert!(root.as_container().unwrap().parent().await.unwrap().is_none());
}

#[tokio::test]
async fn root_resolves_without_being_created() {
    let fixture = TestRepository::new();
    let tx = fixture.repo.begin();

    let root = fixture.repo.get_resource(&tx, &FedoraId::root()).await.unwrap();
    assert_eq!(root.kind(), ResourceKind::Container);
    assert_eq!(root.id(), "info:fedora");
    let resolved = fixture.repo.resolve(&tx, "/").await.unwrap();
    assert_eq!(resolved.fedora_id(), &FedoraId::root());
}

#[tokio::test]
async fn root_cannot_be_created_or_deleted() {
    let fixture = TestRepository::new();
    let tx = fixture.repo.begin();
    let root = FedoraId::root();

    let err = fixture
        .repo
        .create_container(&tx, &root, Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(err, KernelError::Store(StoreError::Conflict(_))));

    let err = fixture.repo.delete(&tx, &root).await.unwrap_err();
    assert!(matches!(err, KernelError::Store(StoreError::Conflict(_))));
    assert!(fixture.repo.exists(&tx, &root).await.unwrap());
}

#[tokio::test]
async fn handle_commit_publishes_writes() {
    let fixture = TestRepository::new();
    let id = TestRepository::id("direct");

    let tx = fixture.repo.begin();
    fixture
        .repo
        .put_binary(&tx, &id, Bytes::from_static(b"abc"), "text/plain")
        .await
        .unwrap();
    tx.commit().unwrap();

    assert_eq!(fixture.repo.sessions().open_sessions(), 0);
    assert_eq!(fixture.repo.sessions().committed_len(), 1);
    let reader = fixture.repo.begin();
    assert!(fixture.repo.exists(&reader, &id).await.unwrap());

    // The handle already ended; ending it again through the repository fails.
    assert!(fixture.repo.commit(&tx).await.is_err());
}

#[tokio::test]
async fn deleting_binary_removes_its_description() {
    let fixture = TestRepository::new();
    let id = fixture.seed_binary("doomed", b"bye").await;
    let desc = id.description_of().unwrap();

    let tx = fixture.repo.begin();
    fixture.repo.delete(&tx, &id).await.unwrap();
    assert!(!fixture.repo.exists(&tx, &id).await.unwrap());
    assert!(!fixture.repo.exists(&tx, &desc).await.unwrap());
    fixture.repo.rollback(&tx).await.unwrap();

    let tx = fixture.repo.begin();
    assert!(fixture.repo.exists(&tx, &desc).await.unwrap());
}

#[test]
fn root_has_no_description() {
    let err = FedoraId::root().description_of().unwrap_err();
    assert_eq!(err, IdentifierError::RootDescription);
}
