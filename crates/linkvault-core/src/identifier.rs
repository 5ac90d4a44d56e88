//! Identifiers: logical addresses of repository resources.
//!
//! Every identifier has the canonical form `info:fedora[/segment...]`. A
//! binary and its description share one storage unit; the description is
//! addressed by appending [`DESCRIPTION_SUFFIX`] to the binary's identifier:
//!
//! ```text
//! info:fedora/photos/cat.jpg               binary
//! info:fedora/photos/cat.jpg/fcr:metadata  description of the binary
//! ```
//!
//! For any binary identifier `b`, `b.description_of()?.containing_of()? == b`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::IdentifierError;

/// Prefix shared by every canonical identifier.
pub const FEDORA_ID_PREFIX: &str = "info:fedora";

/// Final segment marking "the description of" the preceding resource.
pub const DESCRIPTION_SUFFIX: &str = "fcr:metadata";

/// Prefix reserved for repository-managed segments.
const RESERVED_SEGMENT_PREFIX: &str = "fcr:";

/// A normalized resource identifier.
///
/// Equality, ordering and hashing are defined on the normalized string form.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FedoraId {
    full: String,
}

impl FedoraId {
    /// Parse and normalize a raw identifier.
    ///
    /// Accepts a full identifier (`info:fedora/a/b`), an absolute path
    /// (`/a/b`) or a relative path (`a/b`). Trailing slashes are dropped.
    pub fn create(raw: &str) -> Result<Self, IdentifierError> {
        let path = match raw.strip_prefix(FEDORA_ID_PREFIX) {
            Some("") => "",
            Some(rest) => rest
                .strip_prefix('/')
                .ok_or_else(|| IdentifierError::malformed(raw, "unexpected text after prefix"))?,
            None if raw.contains("://") => {
                return Err(IdentifierError::malformed(raw, "foreign URI scheme"));
            }
            None => raw.strip_prefix('/').unwrap_or(raw),
        };
        let path = path.trim_end_matches('/');

        if path.is_empty() {
            return Ok(Self::root());
        }

        let segments: Vec<&str> = path.split('/').collect();
        let last = segments.len() - 1;
        for (i, segment) in segments.iter().enumerate() {
            validate_segment(raw, segment)?;
            if *segment == DESCRIPTION_SUFFIX {
                if i != last {
                    return Err(IdentifierError::malformed(
                        raw,
                        "description suffix must be the final segment",
                    ));
                }
                if i == 0 {
                    return Err(IdentifierError::malformed(raw, "the root has no description"));
                }
            } else if segment.starts_with(RESERVED_SEGMENT_PREFIX) {
                return Err(IdentifierError::malformed(
                    raw,
                    format!("reserved segment {segment:?}"),
                ));
            }
        }

        Ok(Self {
            full: format!("{FEDORA_ID_PREFIX}/{path}"),
        })
    }

    /// The repository root.
    pub fn root() -> Self {
        Self {
            full: FEDORA_ID_PREFIX.to_string(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.full == FEDORA_ID_PREFIX
    }

    /// Whether this identifier addresses the description of a binary.
    pub fn is_description(&self) -> bool {
        self.full
            .rsplit_once('/')
            .is_some_and(|(_, last)| last == DESCRIPTION_SUFFIX)
    }

    /// Derive the identifier of this resource's description.
    ///
    /// Descriptions are never nested, and the root has none.
    pub fn description_of(&self) -> Result<Self, IdentifierError> {
        if self.is_description() {
            return Err(IdentifierError::NestedDescription(self.full.clone()));
        }
        if self.is_root() {
            return Err(IdentifierError::RootDescription);
        }
        Ok(Self {
            full: format!("{}/{DESCRIPTION_SUFFIX}", self.full),
        })
    }

    /// The identifier of the binary a description belongs to.
    ///
    /// Only description identifiers have a containing identifier; asking for
    /// the containing identifier of the root or of a plain identifier fails.
    pub fn containing_of(&self) -> Result<Self, IdentifierError> {
        if !self.is_description() {
            return Err(IdentifierError::NoContainingIdentifier(self.full.clone()));
        }
        let base = self
            .full
            .strip_suffix(DESCRIPTION_SUFFIX)
            .and_then(|s| s.strip_suffix('/'))
            .ok_or_else(|| IdentifierError::NoContainingIdentifier(self.full.clone()))?;
        Ok(Self {
            full: base.to_string(),
        })
    }

    /// The identifier of the storage unit this identifier lives in.
    ///
    /// A description shares its binary's storage unit; anything else is its own.
    pub fn base_id(&self) -> Self {
        self.containing_of().unwrap_or_else(|_| self.clone())
    }

    /// The hierarchical parent container, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        let base = self.base_id();
        if base.is_root() {
            return None;
        }
        let (parent, _) = base.full.rsplit_once('/')?;
        Some(Self {
            full: parent.to_string(),
        })
    }

    /// Path segments below the root, including a trailing description suffix.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path().split('/').filter(|s| !s.is_empty())
    }

    /// The path portion of the identifier, without the prefix.
    pub fn path(&self) -> &str {
        self.full
            .strip_prefix(FEDORA_ID_PREFIX)
            .unwrap_or(&self.full)
    }

    /// Canonical externally-addressable form, used as the RDF subject.
    pub fn resource_id(&self) -> &str {
        &self.full
    }

    pub fn full_id(&self) -> &str {
        &self.full
    }
}

fn validate_segment(raw: &str, segment: &str) -> Result<(), IdentifierError> {
    if segment.is_empty() {
        return Err(IdentifierError::malformed(raw, "empty path segment"));
    }
    if segment == "." || segment == ".." {
        return Err(IdentifierError::malformed(raw, "relative path segment"));
    }
    if let Some(c) = segment
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || matches!(c, '#' | '?'))
    {
        return Err(IdentifierError::malformed(
            raw,
            format!("illegal character {c:?} in segment"),
        ));
    }
    Ok(())
}

impl fmt::Debug for FedoraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FedoraId({})", self.full)
    }
}

impl fmt::Display for FedoraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

impl FromStr for FedoraId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::create(s)
    }
}

impl TryFrom<String> for FedoraId {
    type Error = IdentifierError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::create(&s)
    }
}

impl From<FedoraId> for String {
    fn from(id: FedoraId) -> Self {
        id.full
    }
}

impl AsRef<str> for FedoraId {
    fn as_ref(&self) -> &str {
        &self.full
    }
}
