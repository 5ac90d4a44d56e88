//! Shared resource-level types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::digest::{ContentDigest, DigestAlgorithm};

/// The variant tag a storage session reports for an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// An RDF source that may contain other resources.
    Container,
    /// Opaque byte content plus integrity metadata.
    Binary,
    /// Statements about a companion binary.
    Description,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResourceKind::Container => "container",
            ResourceKind::Binary => "binary",
            ResourceKind::Description => "description",
        };
        f.write_str(s)
    }
}

/// Recorded metadata for a binary's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentMetadata {
    /// Content length in bytes.
    pub size: u64,
    pub mime_type: String,
    pub filename: Option<String>,
    /// At most one digest per algorithm.
    pub digests: Vec<ContentDigest>,
}

impl ContentMetadata {
    pub fn new(size: u64, mime_type: impl Into<String>) -> Self {
        Self {
            size,
            mime_type: mime_type.into(),
            filename: None,
            digests: Vec::new(),
        }
    }

    /// Record a digest, replacing any earlier one for the same algorithm.
    pub fn with_digest(mut self, digest: ContentDigest) -> Self {
        self.digests
            .retain(|d| d.algorithm() != digest.algorithm());
        self.digests.push(digest);
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn digest_for(&self, algorithm: DigestAlgorithm) -> Option<&ContentDigest> {
        self.digests.iter().find(|d| d.algorithm() == algorithm)
    }

    /// Algorithms that have a recorded digest.
    pub fn algorithms(&self) -> Vec<DigestAlgorithm> {
        self.digests.iter().map(ContentDigest::algorithm).collect()
    }
}
