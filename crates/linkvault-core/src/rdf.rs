//! RDF terms, triples, and lazy triple streams.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::vocab;

/// An RDF term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Term {
    /// An absolute IRI.
    Iri(String),
    /// A literal with explicit datatype and optional language tag.
    Literal {
        value: String,
        datatype: String,
        language: Option<String>,
    },
    /// A blank node label.
    Blank(String),
}

impl Term {
    pub fn iri(iri: impl Into<String>) -> Self {
        Term::Iri(iri.into())
    }

    /// A plain `xsd:string` literal.
    pub fn string(value: impl Into<String>) -> Self {
        Term::typed(value, vocab::XSD_STRING)
    }

    pub fn typed(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: datatype.into(),
            language: None,
        }
    }

    /// An `xsd:long` literal.
    pub fn long(value: u64) -> Self {
        Term::typed(value.to_string(), vocab::XSD_LONG)
    }

    pub fn lang_string(value: impl Into<String>, language: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: vocab::RDF_LANG_STRING.to_string(),
            language: Some(language.into()),
        }
    }

    pub fn blank(label: impl Into<String>) -> Self {
        Term::Blank(label.into())
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal { .. })
    }
}

impl fmt::Display for Term {
    /// N-Triples style rendering, for diagnostics.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{iri}>"),
            Term::Blank(label) => write!(f, "_:{label}"),
            Term::Literal {
                value,
                language: Some(lang),
                ..
            } => write!(f, "{value:?}@{lang}"),
            Term::Literal {
                value, datatype, ..
            } => write!(f, "{value:?}^^<{datatype}>"),
        }
    }
}

/// A (subject, predicate, object) statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    /// The same statement about a different subject.
    pub fn with_subject(self, subject: Term) -> Self {
        Self { subject, ..self }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

type BoxedTriples<E> = Box<dyn Iterator<Item = Result<Triple, E>> + Send>;

/// A lazy, single-pass stream of triples about one topic.
///
/// The topic is the stream's "current subject": the node a serializer roots
/// the emitted graph at. Items are fallible so that a mapping step can
/// surface a failure in place instead of producing a malformed element.
pub struct RdfStream<E> {
    topic: Term,
    triples: BoxedTriples<E>,
}

impl<E: 'static> RdfStream<E> {
    pub fn new<I>(topic: Term, triples: I) -> Self
    where
        I: Iterator<Item = Result<Triple, E>> + Send + 'static,
    {
        Self {
            topic,
            triples: Box::new(triples),
        }
    }

    pub fn from_triples(topic: Term, triples: Vec<Triple>) -> Self {
        Self::new(topic, triples.into_iter().map(Ok))
    }

    pub fn empty(topic: Term) -> Self {
        Self::new(topic, std::iter::empty())
    }

    pub fn topic(&self) -> &Term {
        &self.topic
    }

    /// Replace the topic, leaving the triples untouched.
    pub fn with_topic(self, topic: Term) -> Self {
        Self { topic, ..self }
    }

    /// Lazily transform each successful triple.
    pub fn map_triples<F>(self, mut f: F) -> Self
    where
        F: FnMut(Triple) -> Result<Triple, E> + Send + 'static,
    {
        Self {
            topic: self.topic,
            triples: Box::new(self.triples.map(move |item| item.and_then(&mut f))),
        }
    }

    /// Convert the item error type.
    pub fn map_err<E2, F>(self, f: F) -> RdfStream<E2>
    where
        E2: 'static,
        F: FnMut(E) -> E2 + Send + 'static,
    {
        let mut f = f;
        RdfStream {
            topic: self.topic,
            triples: Box::new(self.triples.map(move |item| item.map_err(&mut f))),
        }
    }

    /// Append another stream's triples after this one's.
    pub fn chain(self, other: RdfStream<E>) -> Self {
        Self {
            topic: self.topic,
            triples: Box::new(self.triples.chain(other.triples)),
        }
    }

    /// Drain the stream, stopping at the first failure.
    pub fn collect_triples(self) -> Result<Vec<Triple>, E> {
        self.triples.collect()
    }
}

impl<E> Iterator for RdfStream<E> {
    type Item = Result<Triple, E>;

    fn next(&mut self) -> Option<Self::Item> {
        self.triples.next()
    }
}

impl<E> fmt::Debug for RdfStream<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RdfStream")
            .field("topic", &self.topic)
            .finish_non_exhaustive()
    }
}
