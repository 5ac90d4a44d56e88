//! # LinkVault Store
//!
//! Persistence session contract for the LinkVault kernel. The kernel never
//! touches bytes or triples directly; it asks a [`SessionManager`] for the
//! [`StorageSession`] belonging to a transaction and reads through it.
//!
//! ## Key Types
//!
//! - [`SessionManager`] - Hands out per-transaction sessions, commits and rolls back
//! - [`StorageSession`] - Reads and writes triples and content for identifiers
//! - [`MemorySessionManager`] - Transactional in-memory implementation
//!
//! ## Usage
//!
//! ```rust,no_run
//! use linkvault_core::{ContentMetadata, FedoraId, Transaction};
//! use linkvault_store::{MemorySessionManager, SessionManager};
//!
//! async fn example() {
//!     let manager = MemorySessionManager::new();
//!     let tx = Transaction::begin();
//!     let session = manager.session(&tx).await.unwrap();
//!
//!     let id = FedoraId::create("docs/readme.txt").unwrap();
//!     let content = bytes::Bytes::from_static(b"hello");
//!     let metadata = ContentMetadata::new(5, "text/plain");
//!     session.write_binary(&id, content, metadata).await.unwrap();
//!
//!     tx.commit().unwrap();
//!     manager.commit(&tx).await.unwrap();
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Shared storage unit**: a binary and its description live in one unit
//!   keyed by the binary's identifier.
//! - **Isolation**: writes are staged per transaction and only become visible
//!   to other transactions on commit.
//! - **Terminal transactions**: every session call re-checks that its
//!   transaction is still active. The transaction handle decides how it
//!   ended; storage publishes or discards its overlay to match.
//! - **Root**: the repository root always exists as a container.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemorySessionManager;
pub use traits::{ContentReader, SessionManager, StorageSession, TripleStream};
