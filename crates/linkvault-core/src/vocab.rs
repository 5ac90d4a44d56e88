//! Vocabulary IRIs used in triples the kernel emits.

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
pub const XSD_LONG: &str = "http://www.w3.org/2001/XMLSchema#long";

pub const DC_TITLE: &str = "http://purl.org/dc/elements/1.1/title";

pub const PREMIS_FIXITY: &str = "http://www.loc.gov/premis/rdf/v1#Fixity";
pub const PREMIS_HAS_FIXITY: &str = "http://www.loc.gov/premis/rdf/v1#hasFixity";
pub const PREMIS_HAS_EVENT_OUTCOME: &str = "http://www.loc.gov/premis/rdf/v1#hasEventOutcome";
pub const PREMIS_HAS_MESSAGE_DIGEST: &str = "http://www.loc.gov/premis/rdf/v1#hasMessageDigest";
pub const PREMIS_HAS_MESSAGE_DIGEST_ALGORITHM: &str =
    "http://www.loc.gov/premis/rdf/v1#hasMessageDigestAlgorithm";
pub const PREMIS_HAS_SIZE: &str = "http://www.loc.gov/premis/rdf/v1#hasSize";

pub const EBUCORE_HAS_MIME_TYPE: &str =
    "http://www.ebu.ch/metadata/ontologies/ebucore/ebucore#hasMimeType";
pub const EBUCORE_FILENAME: &str = "http://www.ebu.ch/metadata/ontologies/ebucore/ebucore#filename";
