//! Fixity verification: recompute a binary's digests and compare.
//!
//! Verification is read-only. Content is read once through a bounded
//! buffer, feeding every requested algorithm in the same pass, and the
//! owning transaction is re-checked between chunks so a rollback or commit
//! stops the read and releases the content handle.
//!
//! Requested algorithms are validated before any content is read; one
//! unsupported name fails the whole call.

use std::collections::BTreeSet;
use std::fmt;

use tokio::io::AsyncReadExt;
use tracing::{debug, instrument, warn};

use linkvault_core::{
    parse_algorithms, vocab, ContentDigest, DigestAlgorithm, MultiDigester, RdfStream, Term,
    Triple,
};

use crate::binary::Binary;
use crate::config::KernelConfig;
use crate::error::Result;
use crate::resource::TripleStream;

/// Outcome of comparing one computed digest against its baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FixityOutcome {
    Match,
    DigestMismatch,
    SizeMismatch,
}

impl FixityOutcome {
    /// The PREMIS event outcome literal.
    pub fn premis_outcome(&self) -> &'static str {
        match self {
            FixityOutcome::Match => "SUCCESS",
            FixityOutcome::DigestMismatch => "BAD_CHECKSUM",
            FixityOutcome::SizeMismatch => "BAD_SIZE",
        }
    }
}

impl fmt::Display for FixityOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FixityOutcome::Match => "MATCH",
            FixityOutcome::DigestMismatch => "DIGEST_MISMATCH",
            FixityOutcome::SizeMismatch => "SIZE_MISMATCH",
        };
        f.write_str(s)
    }
}

/// Result for one algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixityResult {
    pub algorithm: DigestAlgorithm,
    pub computed: ContentDigest,
    /// Recorded or caller-supplied digest; `None` when there was nothing to compare.
    pub expected: Option<ContentDigest>,
    pub computed_size: u64,
    pub expected_size: Option<u64>,
    /// Either `{Match}` or a non-empty set of mismatches.
    pub outcomes: BTreeSet<FixityOutcome>,
}

impl FixityResult {
    fn classify(
        computed: ContentDigest,
        expected: Option<ContentDigest>,
        computed_size: u64,
        expected_size: Option<u64>,
    ) -> Self {
        let mut outcomes = BTreeSet::new();
        if expected.as_ref().is_some_and(|e| *e != computed) {
            outcomes.insert(FixityOutcome::DigestMismatch);
        }
        if expected_size.is_some_and(|s| s != computed_size) {
            outcomes.insert(FixityOutcome::SizeMismatch);
        }
        if outcomes.is_empty() {
            outcomes.insert(FixityOutcome::Match);
        }
        Self {
            algorithm: computed.algorithm(),
            computed,
            expected,
            computed_size,
            expected_size,
            outcomes,
        }
    }

    pub fn is_match(&self) -> bool {
        self.outcomes.contains(&FixityOutcome::Match)
    }
}

/// Per-algorithm outcomes of one verification call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixityReport {
    /// Identifier of the verified binary.
    pub subject: String,
    pub results: Vec<FixityResult>,
}

impl FixityReport {
    /// Whether every algorithm matched.
    pub fn is_ok(&self) -> bool {
        self.results.iter().all(FixityResult::is_match)
    }

    /// Union of all outcomes.
    pub fn outcomes(&self) -> BTreeSet<FixityOutcome> {
        self.results
            .iter()
            .flat_map(|r| r.outcomes.iter().copied())
            .collect()
    }

    /// Render as PREMIS fixity assertions rooted at the binary.
    ///
    /// ```text
    /// <bin> premis:hasFixity <bin#fixity/0> .
    /// <bin#fixity/0> rdf:type premis:Fixity ;
    ///     premis:hasEventOutcome "SUCCESS" ;
    ///     premis:hasMessageDigestAlgorithm "SHA-256" ;
    ///     premis:hasMessageDigest <sha-256:...> ;
    ///     premis:hasSize "1024"^^xsd:long .
    /// ```
    pub fn into_rdf_stream(self) -> TripleStream {
        let subject = Term::iri(&self.subject);
        let mut triples = Vec::new();
        for (n, result) in self.results.into_iter().enumerate() {
            let node = Term::iri(format!("{}#fixity/{n}", self.subject));
            triples.push(Triple::new(
                subject.clone(),
                Term::iri(vocab::PREMIS_HAS_FIXITY),
                node.clone(),
            ));
            triples.push(Triple::new(
                node.clone(),
                Term::iri(vocab::RDF_TYPE),
                Term::iri(vocab::PREMIS_FIXITY),
            ));
            for outcome in &result.outcomes {
                triples.push(Triple::new(
                    node.clone(),
                    Term::iri(vocab::PREMIS_HAS_EVENT_OUTCOME),
                    Term::string(outcome.premis_outcome()),
                ));
            }
            triples.push(Triple::new(
                node.clone(),
                Term::iri(vocab::PREMIS_HAS_MESSAGE_DIGEST_ALGORITHM),
                Term::string(result.algorithm.name().to_ascii_uppercase()),
            ));
            triples.push(Triple::new(
                node.clone(),
                Term::iri(vocab::PREMIS_HAS_MESSAGE_DIGEST),
                Term::iri(result.computed.to_uri()),
            ));
            triples.push(Triple::new(
                node,
                Term::iri(vocab::PREMIS_HAS_SIZE),
                Term::long(result.computed_size),
            ));
        }
        RdfStream::from_triples(subject, triples)
    }
}

/// Computes and checks content digests for binaries.
#[derive(Debug, Clone)]
pub struct FixityService {
    chunk_size: usize,
    default_algorithms: Vec<DigestAlgorithm>,
    check_size: bool,
}

impl FixityService {
    pub fn new(config: &KernelConfig) -> Self {
        Self {
            chunk_size: config.fixity_chunk_size.max(1),
            default_algorithms: config.digest_algorithms.clone(),
            check_size: config.check_size,
        }
    }

    /// Verify against the binary's recorded digests and size, as triples.
    pub async fn compute_fixity(&self, binary: &Binary) -> Result<TripleStream> {
        Ok(self.verify(binary).await?.into_rdf_stream())
    }

    /// Verify against a caller-supplied digest URI and size, as triples.
    pub async fn compute_fixity_against(
        &self,
        binary: &Binary,
        expected_digest: &str,
        expected_size: u64,
    ) -> Result<TripleStream> {
        Ok(self
            .verify_against(binary, expected_digest, expected_size)
            .await?
            .into_rdf_stream())
    }

    /// Compute digests under exactly `algorithms`, returning digest URIs.
    ///
    /// No comparison is made. Fails without reading content if any
    /// algorithm is unsupported.
    #[instrument(skip_all, fields(binary = %binary.id()))]
    pub async fn check_fixity<I, S>(
        &self,
        binary: &Binary,
        algorithms: I,
    ) -> Result<BTreeSet<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let algorithms = parse_algorithms(algorithms)?;
        if algorithms.is_empty() {
            return Ok(BTreeSet::new());
        }
        let (digests, _) = self.digest_content(binary, &algorithms).await?;
        Ok(digests.iter().map(ContentDigest::to_uri).collect())
    }

    /// Verify against the binary's recorded metadata.
    ///
    /// Every recorded algorithm is recomputed. A binary with no recorded
    /// digests is digested under the configured defaults and only its size
    /// is compared.
    #[instrument(skip_all, fields(binary = %binary.id()))]
    pub async fn verify(&self, binary: &Binary) -> Result<FixityReport> {
        let metadata = binary.metadata().await?;
        let mut algorithms: BTreeSet<DigestAlgorithm> =
            metadata.algorithms().into_iter().collect();
        if algorithms.is_empty() {
            algorithms.extend(self.default_algorithms.iter().copied());
        }

        let (digests, computed_size) = self.digest_content(binary, &algorithms).await?;
        let expected_size = self.check_size.then_some(metadata.size);
        let results = digests
            .into_iter()
            .map(|computed| {
                let expected = metadata.digest_for(computed.algorithm()).cloned();
                FixityResult::classify(computed, expected, computed_size, expected_size)
            })
            .collect();

        Ok(self.report(binary, results))
    }

    /// Verify against an explicitly asserted digest and size.
    #[instrument(skip_all, fields(binary = %binary.id(), expected = %expected_digest))]
    pub async fn verify_against(
        &self,
        binary: &Binary,
        expected_digest: &str,
        expected_size: u64,
    ) -> Result<FixityReport> {
        let expected: ContentDigest = expected_digest.parse()?;
        let algorithms = BTreeSet::from([expected.algorithm()]);

        let (digests, computed_size) = self.digest_content(binary, &algorithms).await?;
        let results = digests
            .into_iter()
            .map(|computed| {
                FixityResult::classify(
                    computed,
                    Some(expected.clone()),
                    computed_size,
                    Some(expected_size),
                )
            })
            .collect();

        Ok(self.report(binary, results))
    }

    fn report(&self, binary: &Binary, results: Vec<FixityResult>) -> FixityReport {
        let report = FixityReport {
            subject: binary.id().to_string(),
            results,
        };
        if report.is_ok() {
            debug!(binary = %report.subject, "fixity check passed");
        } else {
            warn!(binary = %report.subject, outcomes = ?report.outcomes(), "fixity check failed");
        }
        report
    }

    /// One bounded pass over the content, feeding every algorithm.
    async fn digest_content(
        &self,
        binary: &Binary,
        algorithms: &BTreeSet<DigestAlgorithm>,
    ) -> Result<(Vec<ContentDigest>, u64)> {
        let tx = binary.transaction();
        let mut reader = binary.content().await?;
        let mut digester = MultiDigester::new(algorithms.iter().copied());
        let mut buf = vec![0u8; self.chunk_size];
        loop {
            tx.ensure_active()?;
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            digester.update(&buf[..n]);
        }
        let size = digester.bytes_seen();
        Ok((digester.finalize(), size))
    }
}
