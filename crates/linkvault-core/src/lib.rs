//! # LinkVault Core
//!
//! Pure values for the LinkVault kernel: identifiers, transactions, RDF
//! terms, and content digests.
//!
//! This crate contains no I/O and no storage. Everything here is a value
//! type or a small state machine that the store and kernel crates thread
//! through their calls.
//!
//! ## Key Types
//!
//! - [`FedoraId`] - Logical address of a resource, including the derived
//!   address of a binary's description
//! - [`Transaction`] - Isolation scope with an active/committed/rolled-back lifecycle
//! - [`Triple`] and [`RdfStream`] - Statements and lazy statement streams
//! - [`DigestAlgorithm`] and [`ContentDigest`] - Fixity algorithms and digest URIs
//!
//! ## Identifiers
//!
//! A binary at `info:fedora/a/b` is described by `info:fedora/a/b/fcr:metadata`.
//! The two share one storage unit; see [`identifier`] for the derivation rules.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod digest;
pub mod error;
pub mod identifier;
pub mod rdf;
pub mod transaction;
pub mod types;
pub mod vocab;

pub use digest::{parse_algorithms, ContentDigest, DigestAlgorithm, MultiDigester};
pub use error::{DigestError, IdentifierError, PathNotFound, TransactionError};
pub use identifier::{FedoraId, DESCRIPTION_SUFFIX, FEDORA_ID_PREFIX};
pub use rdf::{RdfStream, Term, Triple};
pub use transaction::{Transaction, TransactionId, TransactionState};
pub use types::{ContentMetadata, ResourceKind};
