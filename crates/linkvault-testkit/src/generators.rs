//! Proptest generators for property-based testing.

use proptest::prelude::*;

use linkvault_core::{vocab, FedoraId, Term, Triple};

/// Generate one identifier path segment.
pub fn path_segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,15}".prop_map(String::from)
}

/// Generate a non-root, non-description identifier one to four segments deep.
pub fn fedora_id() -> impl Strategy<Value = FedoraId> {
    prop::collection::vec(path_segment(), 1..=4).prop_filter_map("valid identifier", |segs| {
        FedoraId::create(&segs.join("/")).ok()
    })
}

/// Generate content bytes of specified max length.
pub fn content(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate an IRI under a fixed example namespace.
pub fn iri() -> impl Strategy<Value = Term> {
    "[a-z]{1,12}".prop_map(|local| Term::iri(format!("http://example.org/ns#{local}")))
}

/// Generate an object term: IRI, plain, typed or language-tagged literal, or blank node.
pub fn term() -> impl Strategy<Value = Term> {
    prop_oneof![
        iri(),
        "[ -~]{0,24}".prop_map(Term::string),
        any::<u64>().prop_map(Term::long),
        ("[ -~]{0,24}", "[a-z]{2}").prop_map(|(v, lang)| Term::lang_string(v, lang)),
        "b[0-9]{1,4}".prop_map(Term::blank),
    ]
}

/// Generate a predicate, biased towards vocabulary a description carries.
pub fn predicate() -> impl Strategy<Value = Term> {
    prop_oneof![
        Just(Term::iri(vocab::DC_TITLE)),
        Just(Term::iri(vocab::RDF_TYPE)),
        iri(),
    ]
}

/// Generate a triple about `subject`.
pub fn triple(subject: Term) -> impl Strategy<Value = Triple> {
    (predicate(), term()).prop_map(move |(p, o)| Triple::new(subject.clone(), p, o))
}

/// Generate statements as a client would submit them for the binary `id`.
///
/// Most are about the binary itself; some are about a blank node or the
/// description's own identifier, as a careless client might write them.
pub fn description_triples(id: FedoraId, max_len: usize) -> impl Strategy<Value = Vec<Triple>> {
    let binary = Term::iri(id.resource_id());
    let shadow = id
        .description_of()
        .map(|d| Term::iri(d.resource_id()))
        .unwrap_or_else(|_| binary.clone());
    let subject = prop_oneof![
        6 => Just(binary),
        1 => Just(shadow),
        1 => "b[0-9]{1,4}".prop_map(Term::blank),
    ];
    prop::collection::vec(
        (subject, predicate(), term()).prop_map(|(s, p, o)| Triple::new(s, p, o)),
        0..=max_len,
    )
}
