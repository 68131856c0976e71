//! RDF term representations
//!
//! This module defines the core data types for representing RDF terms:
//! - URIs (named nodes)
//! - Literals (with optional datatype or language tag)
//! - Blank nodes (anonymous nodes)
//!
//! An *individual* is any non-literal term. Terms are identity handles only;
//! the facts about them live in a [`crate::store::Store`].

use std::fmt;
use std::sync::Arc;

pub mod uri;
mod literal;
mod blank;

pub use uri::Uri;
pub use literal::{Literal, Datatype};
pub use blank::BlankNode;

/// A term in RDF
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    /// A URI reference (named node)
    Uri(Arc<Uri>),
    /// A literal value
    Literal(Arc<Literal>),
    /// A blank node (anonymous)
    BlankNode(BlankNode),
}

impl Term {
    /// Create a URI term
    pub fn uri(s: impl Into<String>) -> Self {
        Term::Uri(Arc::new(Uri::new(s.into())))
    }

    /// Create a plain literal
    pub fn literal(s: impl Into<String>) -> Self {
        Term::Literal(Arc::new(Literal::plain(s.into())))
    }

    /// Create a typed literal
    pub fn typed_literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Term::Literal(Arc::new(Literal::typed(value.into(), datatype.into())))
    }

    /// Create a language-tagged literal
    pub fn lang_literal(value: impl Into<String>, lang: impl Into<String>) -> Self {
        Term::Literal(Arc::new(Literal::with_language(value.into(), lang.into())))
    }

    /// Create a fresh blank node
    pub fn fresh_blank() -> Self {
        Term::BlankNode(BlankNode::fresh())
    }

    /// Check if this term can stand for an individual (not a literal)
    pub fn is_individual(&self) -> bool {
        !matches!(self, Term::Literal(_))
    }

    /// Check if this term is an anonymous node
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Term::BlankNode(_))
    }

    /// Get the URI if this is a URI term
    pub fn as_uri(&self) -> Option<&Uri> {
        match self {
            Term::Uri(u) => Some(u),
            _ => None,
        }
    }

    /// Get the literal if this is a literal term
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(l) => Some(l),
            _ => None,
        }
    }

    /// Check whether this is the URI `iri`
    pub fn is_uri(&self, iri: &str) -> bool {
        matches!(self, Term::Uri(u) if u.as_str() == iri)
    }

    /// Compact label for explanations: local name for URIs, N-Triples otherwise
    pub fn short_name(&self) -> String {
        match self {
            Term::Uri(u) if !u.local_name().is_empty() => u.local_name().to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Uri(u) => write!(f, "<{}>", u.as_str()),
            Term::Literal(l) => write!(f, "{}", l),
            Term::BlankNode(b) => write!(f, "{}", b),
        }
    }
}

impl From<Uri> for Term {
    fn from(uri: Uri) -> Self {
        Term::Uri(Arc::new(uri))
    }
}

impl From<BlankNode> for Term {
    fn from(blank: BlankNode) -> Self {
        Term::BlankNode(blank)
    }
}

impl From<Literal> for Term {
    fn from(literal: Literal) -> Self {
        Term::Literal(Arc::new(literal))
    }
}

/// A triple (statement) in RDF
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Triple {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Triple { subject, predicate, object }
    }
}

impl fmt::Debug for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}
