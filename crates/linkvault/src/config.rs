//! Kernel configuration.

use linkvault_core::DigestAlgorithm;

/// Default size of the buffer content is read through during fixity checks.
pub const DEFAULT_FIXITY_CHUNK_SIZE: usize = 64 * 1024;

/// Configuration for the kernel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelConfig {
    /// Read buffer size for fixity checks. Bounds memory per check.
    pub fixity_chunk_size: usize,
    /// Algorithms recorded when binaries are written, and computed when a
    /// binary has no recorded digests.
    pub digest_algorithms: Vec<DigestAlgorithm>,
    /// Whether recorded size takes part in fixity outcomes.
    ///
    /// An explicitly supplied expected size is always checked.
    pub check_size: bool,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            fixity_chunk_size: DEFAULT_FIXITY_CHUNK_SIZE,
            digest_algorithms: vec![DigestAlgorithm::Sha256],
            check_size: true,
        }
    }
}

impl KernelConfig {
    pub fn with_fixity_chunk_size(mut self, size: usize) -> Self {
        self.fixity_chunk_size = size.max(1);
        self
    }

    pub fn with_digest_algorithms(
        mut self,
        algorithms: impl IntoIterator<Item = DigestAlgorithm>,
    ) -> Self {
        self.digest_algorithms = algorithms.into_iter().collect();
        self
    }

    pub fn with_check_size(mut self, check: bool) -> Self {
        self.check_size = check;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = KernelConfig::default();
        assert_eq!(config.fixity_chunk_size, 64 * 1024);
        assert_eq!(config.digest_algorithms, vec![DigestAlgorithm::Sha256]);
        assert!(config.check_size);
    }

    #[test]
    fn test_chunk_size_never_zero() {
        let config = KernelConfig::default().with_fixity_chunk_size(0);
        assert_eq!(config.fixity_chunk_size, 1);
    }
}
