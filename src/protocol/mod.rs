//! Protocol documents
//!
//! A protocol document describes one resource. The resource points at one or
//! more graphs (`rdg:hasGraph`), each graph at its subjects
//! (`rdg:hasSubject`), and the objects of a subject are whatever its ordinary
//! properties point at:
//!
//! ```text
//! <resource> a rdg:Resource ; rdg:hasGraph <graph> .
//! <graph> rdg:hasSubject <step> .
//! <step> a ex:Process ; ex:hasInput <data> .
//! ```
//!
//! Template documents use the same shape; alternative graphs of a template
//! are alternative shapes it accepts.

mod orchestrator;

pub use orchestrator::{Outcome, Phase, ProtocolValidator, TranslatedDocument, ValidationOptions};

use std::fmt;

use indexmap::IndexSet;

use crate::core::ns;
use crate::parser::{parse_turtle, ParseError};
use crate::store::Store;
use crate::term::Term;

/// Role of an individual within a protocol document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Resource,
    Graph,
    Subject,
    Object,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Resource => "resource",
            NodeKind::Graph => "graph",
            NodeKind::Subject => "subject",
            NodeKind::Object => "object",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An individual in the role it plays in a document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProtocolNode {
    pub kind: NodeKind,
    pub individual: Term,
}

impl ProtocolNode {
    pub fn new(kind: NodeKind, individual: Term) -> Self {
        ProtocolNode { kind, individual }
    }
}

impl fmt::Display for ProtocolNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.individual)
    }
}

/// Errors locating the resource of a document
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DocumentError {
    #[error("Document declares no resource")]
    NoResource,

    #[error("Document declares {count} resources, expected one")]
    AmbiguousResource { count: usize },

    #[error("Resource {0} is not mentioned by the document")]
    UnknownResource(Term),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// A store together with the resource it describes
#[derive(Debug, Clone)]
pub struct ProtocolDocument {
    store: Store,
    resource: Term,
}

impl ProtocolDocument {
    /// Wrap `store`, naming its resource explicitly
    pub fn new(store: Store, resource: Term) -> Result<Self, DocumentError> {
        if !store.mentions(&resource) {
            return Err(DocumentError::UnknownResource(resource));
        }
        Ok(ProtocolDocument { store, resource })
    }

    /// Wrap `store`, discovering its resource.
    ///
    /// The resource is the only node typed `rdg:Resource`, or failing that
    /// the only subject of `rdg:hasGraph`.
    pub fn discover(store: Store) -> Result<Self, DocumentError> {
        let resource_type = Term::uri(ns::rdg::RESOURCE);
        let typed: IndexSet<Term> = store
            .subjects(ns::rdf::TYPE, &resource_type)
            .cloned()
            .collect();

        let candidates = if typed.is_empty() {
            store
                .iter()
                .filter(|t| t.predicate.is_uri(ns::rdg::HAS_GRAPH))
                .map(|t| t.subject.clone())
                .collect()
        } else {
            typed
        };

        match candidates.len() {
            0 => Err(DocumentError::NoResource),
            1 => {
                let resource = candidates.into_iter().next().ok_or(DocumentError::NoResource)?;
                tracing::trace!(%resource, "discovered resource");
                Ok(ProtocolDocument { store, resource })
            }
            count => Err(DocumentError::AmbiguousResource { count }),
        }
    }

    /// Parse a Turtle document and discover its resource
    pub fn from_turtle(input: &str, base: Option<&str>) -> Result<Self, DocumentError> {
        Self::discover(parse_turtle(input, base)?)
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn into_store(self) -> Store {
        self.store
    }

    pub fn resource(&self) -> ProtocolNode {
        ProtocolNode::new(NodeKind::Resource, self.resource.clone())
    }

    /// Graphs of the resource, in document order
    pub fn graphs(&self) -> Vec<ProtocolNode> {
        self.linked(&self.resource, ns::rdg::HAS_GRAPH, NodeKind::Graph)
    }

    pub fn subjects(&self, graph: &Term) -> Vec<ProtocolNode> {
        self.linked(graph, ns::rdg::HAS_SUBJECT, NodeKind::Subject)
    }

    /// Non-literal targets of the subject's non-reserved properties
    pub fn objects(&self, subject: &Term) -> Vec<ProtocolNode> {
        let objects: IndexSet<&Term> = self
            .store
            .outgoing(subject)
            .filter(|(p, _)| !is_reserved(p))
            .map(|(_, o)| o)
            .filter(|o| o.is_individual())
            .collect();
        objects
            .into_iter()
            .map(|o| ProtocolNode::new(NodeKind::Object, o.clone()))
            .collect()
    }

    fn linked(&self, from: &Term, predicate: &str, kind: NodeKind) -> Vec<ProtocolNode> {
        let targets: IndexSet<&Term> = self.store.objects(from, predicate).collect();
        targets
            .into_iter()
            .map(|t| ProtocolNode::new(kind, t.clone()))
            .collect()
    }
}

pub(crate) fn is_reserved(term: &Term) -> bool {
    term.as_uri().map_or(false, |u| ns::is_reserved(u.as_str()))
}

/// Individuals of a node list, for the matcher
pub(crate) fn individuals(nodes: &[ProtocolNode]) -> Vec<Term> {
    nodes.iter().map(|n| n.individual.clone()).collect()
}
