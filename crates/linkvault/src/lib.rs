//! # LinkVault
//!
//! The identity-resolution and content-integrity kernel of a transactional
//! linked-data repository.
//!
//! ## Overview
//!
//! - **Resolution**: a [`ResourceFactory`] turns a transaction and an
//!   identifier into a typed [`Resource`] view
//! - **Binary/description duality**: a [`Binary`] and its [`Description`]
//!   are two addressable resources over one storage unit; the description's
//!   statements always come out about the binary
//! - **Fixity**: the [`FixityService`] recomputes content digests in one
//!   bounded pass and reports per-algorithm outcomes
//!
//! ## Key Concepts
//!
//! - **Transaction**: every call takes one explicitly. Views never outlive it.
//! - **Not-found**: one [`PathNotFound`] payload, two carriers; see [`KernelError`].
//! - **Read-only fixity**: verification never touches recorded metadata.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use linkvault::{KernelConfig, Repository};
//! use linkvault::core::FedoraId;
//! use linkvault::store::MemorySessionManager;
//!
//! async fn example() {
//!     let repo = Repository::new(MemorySessionManager::new(), KernelConfig::default());
//!
//!     let tx = repo.begin();
//!     let id = FedoraId::create("photos/cat.jpg").unwrap();
//!     repo.put_binary(&tx, &id, bytes::Bytes::from_static(b"..."), "image/jpeg")
//!         .await
//!         .unwrap();
//!     repo.commit(&tx).await.unwrap();
//!
//!     let tx = repo.begin();
//!     let digests = repo.check_fixity(&tx, &id, ["sha-256"]).await.unwrap();
//!     println!("{digests:?}");
//!     repo.rollback(&tx).await.unwrap();
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `linkvault::core` - Identifiers, transactions, RDF terms, digests
//! - `linkvault::store` - Persistence session contract and memory backend

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod binary;
pub mod config;
pub mod description;
pub mod error;
pub mod factory;
pub mod fixity;
pub mod repository;
pub mod resource;

// Re-export component crates
pub use linkvault_core as core;
pub use linkvault_store as store;

// Re-export main types for convenience
pub use binary::Binary;
pub use config::KernelConfig;
pub use description::Description;
pub use error::{KernelError, Result};
pub use factory::ResourceFactory;
pub use fixity::{FixityOutcome, FixityReport, FixityResult, FixityService};
pub use repository::Repository;
pub use resource::{Container, Resource, TripleStream};

// Re-export commonly used core types
pub use linkvault_core::{
    ContentDigest, ContentMetadata, DigestAlgorithm, FedoraId, PathNotFound, RdfStream,
    ResourceKind, Term, Transaction, TransactionState, Triple,
};
