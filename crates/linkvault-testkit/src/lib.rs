//! # LinkVault Testkit
//!
//! Testing utilities for the LinkVault kernel.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: a repository over in-memory sessions with seeding helpers
//! - **Generators**: Proptest strategies for identifiers, content and triples
//! - **Probes**: a session manager that observes content handles and can
//!   end a transaction in the middle of a read
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use linkvault_testkit::TestRepository;
//!
//! async fn example() {
//!     let fixture = TestRepository::new();
//!     let id = fixture.seed_binary("a/b", b"hello").await;
//!     let tx = fixture.repo.begin();
//!     let binary = fixture.repo.binary_for(&tx, &id).await.unwrap();
//!     assert_eq!(binary.content_size().await.unwrap(), 5);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use linkvault_testkit::generators::fedora_id;
//!
//! proptest! {
//!     #[test]
//!     fn description_round_trips(id in fedora_id()) {
//!         let desc = id.description_of().unwrap();
//!         prop_assert_eq!(desc.containing_of().unwrap(), id);
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod probe;

pub use fixtures::{init_tracing, title, TestRepository};
pub use generators::{content, description_triples, fedora_id, path_segment, term, triple};
pub use probe::{ProbeSessionManager, ReaderProbe};
