//! Reasoner seam
//!
//! The matching and translation engine never reads a store directly; every
//! fact about an individual or a class goes through a [`ReasonerFacade`].
//! [`StoreReasoner`] is the bundled implementation.
//!
//! # Example
//!
//! ```ignore
//! use rdg::reasoner::{with_imported_documents, StoreReasoner};
//!
//! let reasoner = StoreReasoner::new(ontology);
//! let ok = with_imported_documents(&reasoner, &[&instance, &template], || {
//!     reasoner.check_consistency().is_ok()
//! });
//! ```

mod structural;

pub use structural::{StoreReasoner, DEFAULT_MAX_DEPTH};

use crate::expression::ClassExpression;
use crate::store::Store;
use crate::term::Term;

/// Errors reported by a reasoner
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReasonerError {
    #[error("Unknown individual: {0}")]
    UnknownIndividual(Term),

    #[error("Inconsistent knowledge base: {0}")]
    Inconsistent(String),
}

/// Handle for one import scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImportTicket(pub u64);

/// Queries the engine needs from a description-logic reasoner
pub trait ReasonerFacade {
    /// Is every member of `sub` a member of `sup`?
    fn is_sub_class_of(&self, sub: &ClassExpression, sup: &ClassExpression) -> bool;

    fn is_equivalent_class(&self, a: &ClassExpression, b: &ClassExpression) -> bool {
        self.is_sub_class_of(a, b) && self.is_sub_class_of(b, a)
    }

    /// Told super-class expressions of a class
    fn asserted_super_classes(&self, class: &Term) -> Vec<ClassExpression>;

    /// Told equivalent-class expressions of a class
    fn asserted_equivalent_classes(&self, class: &Term) -> Vec<ClassExpression>;

    /// Asserted `rdf:type` values of an individual
    fn asserted_types(&self, individual: &Term) -> Result<Vec<Term>, ReasonerError>;

    /// Asserted (property, value) pairs with the individual as subject
    fn asserted_outgoing_edges(&self, individual: &Term) -> Result<Vec<(Term, Term)>, ReasonerError>;

    fn property_ranges(&self, property: &Term) -> Vec<Term>;

    fn property_domains(&self, property: &Term) -> Vec<Term>;

    fn check_consistency(&self) -> Result<(), ReasonerError>;

    /// Add the documents' statements to the knowledge base until released.
    /// Implementations serialize overlapping imports.
    fn import_documents(&self, documents: &[&Store]) -> ImportTicket;

    fn release_documents(&self, ticket: ImportTicket);
}

/// Releases an import when dropped
struct ImportGuard<'r, R: ReasonerFacade + ?Sized> {
    reasoner: &'r R,
    ticket: ImportTicket,
}

impl<R: ReasonerFacade + ?Sized> Drop for ImportGuard<'_, R> {
    fn drop(&mut self) {
        tracing::trace!(ticket = self.ticket.0, "releasing imported documents");
        self.reasoner.release_documents(self.ticket);
    }
}

/// Run `f` with `documents` imported into `reasoner`.
///
/// The import is released on every exit path of `f`, including panics.
pub fn with_imported_documents<R, T>(reasoner: &R, documents: &[&Store], f: impl FnOnce() -> T) -> T
where
    R: ReasonerFacade + ?Sized,
{
    let ticket = reasoner.import_documents(documents);
    tracing::trace!(ticket = ticket.0, documents = documents.len(), "imported documents");
    let _guard = ImportGuard { reasoner, ticket };
    f()
}
