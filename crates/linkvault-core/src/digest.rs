//! Content digests for fixity checking.
//!
//! A digest is written as a scheme-qualified URI, `algorithm:hexvalue`
//! (for example `sha-256:9f86...`). The legacy `urn:algorithm:hexvalue`
//! form is accepted on input.

use serde::{Deserialize, Serialize};
use sha2::Digest as _;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::DigestError;

/// A supported digest algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DigestAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha512,
    Blake3,
}

impl DigestAlgorithm {
    pub const ALL: [DigestAlgorithm; 5] = [
        DigestAlgorithm::Md5,
        DigestAlgorithm::Sha1,
        DigestAlgorithm::Sha256,
        DigestAlgorithm::Sha512,
        DigestAlgorithm::Blake3,
    ];

    /// Canonical lowercase name, also the digest URI scheme.
    pub fn name(&self) -> &'static str {
        match self {
            DigestAlgorithm::Md5 => "md5",
            DigestAlgorithm::Sha1 => "sha-1",
            DigestAlgorithm::Sha256 => "sha-256",
            DigestAlgorithm::Sha512 => "sha-512",
            DigestAlgorithm::Blake3 => "blake3",
        }
    }

    /// Length of the digest in bytes.
    pub fn output_len(&self) -> usize {
        match self {
            DigestAlgorithm::Md5 => 16,
            DigestAlgorithm::Sha1 => 20,
            DigestAlgorithm::Sha256 | DigestAlgorithm::Blake3 => 32,
            DigestAlgorithm::Sha512 => 64,
        }
    }

    /// One-shot digest of an in-memory buffer.
    pub fn digest(&self, data: &[u8]) -> ContentDigest {
        let mut hasher = Hasher::new(*self);
        hasher.update(data);
        hasher.finalize()
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "md5" => Ok(DigestAlgorithm::Md5),
            "sha-1" | "sha1" => Ok(DigestAlgorithm::Sha1),
            "sha-256" | "sha256" => Ok(DigestAlgorithm::Sha256),
            "sha-512" | "sha512" => Ok(DigestAlgorithm::Sha512),
            "blake3" => Ok(DigestAlgorithm::Blake3),
            _ => Err(DigestError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

/// Parse a set of algorithm names, failing on the first unsupported one.
///
/// Nothing is returned unless every name is supported.
pub fn parse_algorithms<I, S>(names: I) -> Result<BTreeSet<DigestAlgorithm>, DigestError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names.into_iter().map(|n| n.as_ref().parse()).collect()
}

/// A digest value tagged with its algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentDigest {
    algorithm: DigestAlgorithm,
    /// Lowercase hex.
    value: String,
}

impl ContentDigest {
    /// Build from a hex value, validating its length and alphabet.
    pub fn new(algorithm: DigestAlgorithm, hex_value: &str) -> Result<Self, DigestError> {
        let value = hex_value.to_ascii_lowercase();
        if value.len() != algorithm.output_len() * 2 {
            return Err(DigestError::MalformedDigest(format!(
                "{algorithm} digest must be {} hex characters, got {}",
                algorithm.output_len() * 2,
                value.len()
            )));
        }
        if !value.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(DigestError::MalformedDigest(format!(
                "{hex_value:?} is not hex"
            )));
        }
        Ok(Self { algorithm, value })
    }

    pub fn from_bytes(algorithm: DigestAlgorithm, bytes: &[u8]) -> Self {
        Self {
            algorithm,
            value: hex::encode(bytes),
        }
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    pub fn hex(&self) -> &str {
        &self.value
    }

    /// The `algorithm:hexvalue` URI form.
    pub fn to_uri(&self) -> String {
        format!("{}:{}", self.algorithm, self.value)
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.value)
    }
}

impl FromStr for ContentDigest {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s.strip_prefix("urn:").unwrap_or(s);
        let (algorithm, value) = body
            .rsplit_once(':')
            .ok_or_else(|| DigestError::MalformedDigest(format!("{s:?} has no algorithm")))?;
        ContentDigest::new(algorithm.parse()?, value)
    }
}

enum Hasher {
    Md5(md5::Context),
    Sha1(sha1::Sha1),
    Sha256(sha2::Sha256),
    Sha512(sha2::Sha512),
    Blake3(Box<blake3::Hasher>),
}

impl Hasher {
    fn new(algorithm: DigestAlgorithm) -> Self {
        match algorithm {
            DigestAlgorithm::Md5 => Hasher::Md5(md5::Context::new()),
            DigestAlgorithm::Sha1 => Hasher::Sha1(sha1::Sha1::new()),
            DigestAlgorithm::Sha256 => Hasher::Sha256(sha2::Sha256::new()),
            DigestAlgorithm::Sha512 => Hasher::Sha512(sha2::Sha512::new()),
            DigestAlgorithm::Blake3 => Hasher::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Hasher::Md5(h) => h.consume(data),
            Hasher::Sha1(h) => h.update(data),
            Hasher::Sha256(h) => h.update(data),
            Hasher::Sha512(h) => h.update(data),
            Hasher::Blake3(h) => {
                h.update(data);
            }
        }
    }

    fn finalize(self) -> ContentDigest {
        match self {
            Hasher::Md5(h) => ContentDigest::from_bytes(DigestAlgorithm::Md5, &h.compute().0),
            Hasher::Sha1(h) => ContentDigest::from_bytes(DigestAlgorithm::Sha1, &h.finalize()),
            Hasher::Sha256(h) => ContentDigest::from_bytes(DigestAlgorithm::Sha256, &h.finalize()),
            Hasher::Sha512(h) => ContentDigest::from_bytes(DigestAlgorithm::Sha512, &h.finalize()),
            Hasher::Blake3(h) => {
                ContentDigest::from_bytes(DigestAlgorithm::Blake3, h.finalize().as_bytes())
            }
        }
    }
}

/// Computes several digests over one pass of the content.
pub struct MultiDigester {
    hashers: Vec<Hasher>,
    bytes_seen: u64,
}

impl MultiDigester {
    pub fn new(algorithms: impl IntoIterator<Item = DigestAlgorithm>) -> Self {
        let unique: BTreeSet<DigestAlgorithm> = algorithms.into_iter().collect();
        Self {
            hashers: unique.into_iter().map(Hasher::new).collect(),
            bytes_seen: 0,
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        for hasher in &mut self.hashers {
            hasher.update(data);
        }
        self.bytes_seen += data.len() as u64;
    }

    /// Total number of bytes fed so far.
    pub fn bytes_seen(&self) -> u64 {
        self.bytes_seen
    }

    /// Finish, returning one digest per algorithm in algorithm order.
    pub fn finalize(self) -> Vec<ContentDigest> {
        self.hashers.into_iter().map(Hasher::finalize).collect()
    }
}

impl fmt::Debug for MultiDigester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiDigester")
            .field("algorithms", &self.hashers.len())
            .field("bytes_seen", &self.bytes_seen)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vectors() {
        let data = b"abc";
        assert_eq!(
            DigestAlgorithm::Md5.digest(data).hex(),
            "900150983cd24fb0d6963f7d28e17f72"
        );
        assert_eq!(
            DigestAlgorithm::Sha1.digest(data).hex(),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
        assert_eq!(
            DigestAlgorithm::Sha256.digest(data).hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(
            DigestAlgorithm::Blake3.digest(data).hex(),
            blake3::hash(data).to_hex().as_str()
        );
    }

    #[test]
    fn test_multi_digester_matches_one_shot() {
        let data = vec![0x5au8; 10_000];
        let mut digester = MultiDigester::new(DigestAlgorithm::ALL);
        for chunk in data.chunks(777) {
            digester.update(chunk);
        }
        assert_eq!(digester.bytes_seen(), 10_000);
        let digests = digester.finalize();
        assert_eq!(digests.len(), DigestAlgorithm::ALL.len());
        for digest in digests {
            assert_eq!(digest, digest.algorithm().digest(&data));
        }
    }

    #[test]
    fn test_multi_digester_dedupes() {
        let digester = MultiDigester::new([DigestAlgorithm::Sha1, DigestAlgorithm::Sha1]);
        assert_eq!(digester.finalize().len(), 1);
    }

    #[test]
    fn test_algorithm_aliases() {
        assert_eq!("SHA-256".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Sha256);
        assert_eq!("sha1".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Sha1);
        assert_eq!(
            "crc32".parse::<DigestAlgorithm>().unwrap_err(),
            DigestError::UnsupportedAlgorithm("crc32".into())
        );
    }

    #[test]
    fn test_parse_algorithms_all_or_nothing() {
        let err = parse_algorithms(["md5", "not-an-algorithm"]).unwrap_err();
        assert_eq!(
            err,
            DigestError::UnsupportedAlgorithm("not-an-algorithm".into())
        );
        let ok = parse_algorithms(["md5", "sha-256"]).unwrap();
        assert_eq!(ok.len(), 2);
    }

    #[test]
    fn test_digest_uri_forms() {
        let digest = DigestAlgorithm::Sha256.digest(b"abc");
        let uri = digest.to_uri();
        assert!(uri.starts_with("sha-256:"));
        assert_eq!(uri.parse::<ContentDigest>().unwrap(), digest);
        assert_eq!(format!("urn:{uri}").parse::<ContentDigest>().unwrap(), digest);
        assert_eq!(
            uri.to_uppercase().replace("SHA-256", "sha-256").parse::<ContentDigest>().unwrap(),
            digest
        );
    }

    #[test]
    fn test_malformed_digest() {
        assert!(matches!(
            "sha-256:abc".parse::<ContentDigest>(),
            Err(DigestError::MalformedDigest(_))
        ));
        assert!(matches!(
            "deadbeef".parse::<ContentDigest>(),
            Err(DigestError::MalformedDigest(_))
        ));
        assert!(matches!(
            "foo:deadbeef".parse::<ContentDigest>(),
            Err(DigestError::UnsupportedAlgorithm(_))
        ));
    }
}
