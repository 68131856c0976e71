//! In-memory RDF triple store
//!
//! A store holds a duplicate-free, insertion-ordered set of triples with a
//! subject index. Protocol documents, ontologies and translation results
//! are all stores.

use indexmap::{IndexMap, IndexSet};

use crate::core::ns;
use crate::term::{Term, Triple};

/// A store of RDF triples (a graph)
#[derive(Clone, Default)]
pub struct Store {
    /// The triples in this store
    triples: IndexSet<Triple>,
    /// Index by subject: (predicate, object) pairs in insertion order
    by_subject: IndexMap<Term, IndexSet<(Term, Term)>>,
}

impl Store {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a triple to the store. Returns false if it was already present.
    pub fn add(&mut self, triple: Triple) -> bool {
        if self.triples.contains(&triple) {
            return false;
        }

        self.by_subject
            .entry(triple.subject.clone())
            .or_default()
            .insert((triple.predicate.clone(), triple.object.clone()));
        self.triples.insert(triple)
    }

    /// Add multiple triples
    pub fn add_all(&mut self, triples: impl IntoIterator<Item = Triple>) {
        for triple in triples {
            self.add(triple);
        }
    }

    /// Check if the store contains a triple
    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    /// Remove a triple from the store
    pub fn remove(&mut self, triple: &Triple) -> bool {
        if !self.triples.shift_remove(triple) {
            return false;
        }
        if let Some(edges) = self.by_subject.get_mut(&triple.subject) {
            edges.shift_remove(&(triple.predicate.clone(), triple.object.clone()));
            if edges.is_empty() {
                self.by_subject.shift_remove(&triple.subject);
            }
        }
        true
    }

    /// Get the number of triples
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Iterate over all triples
    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// All (predicate, object) pairs with `subject` as subject
    pub fn outgoing<'a>(&'a self, subject: &Term) -> impl Iterator<Item = &'a (Term, Term)> + 'a {
        self.by_subject.get(subject).into_iter().flat_map(|edges| edges.iter())
    }

    /// Objects of `(subject, predicate, ?)`
    pub fn objects<'a>(&'a self, subject: &Term, predicate: &'a str) -> impl Iterator<Item = &'a Term> + 'a {
        self.outgoing(subject)
            .filter(move |(p, _)| p.is_uri(predicate))
            .map(|(_, o)| o)
    }

    /// First object of `(subject, predicate, ?)`
    pub fn object(&self, subject: &Term, predicate: &str) -> Option<&Term> {
        self.outgoing(subject)
            .find(|(p, _)| p.is_uri(predicate))
            .map(|(_, o)| o)
    }

    /// Subjects of `(?, predicate, object)`
    pub fn subjects<'a>(&'a self, predicate: &'a str, object: &'a Term) -> impl Iterator<Item = &'a Term> + 'a {
        self.triples
            .iter()
            .filter(move |t| t.predicate.is_uri(predicate) && &t.object == object)
            .map(|t| &t.subject)
    }

    /// Asserted `rdf:type` values of `subject`
    pub fn types<'a>(&'a self, subject: &Term) -> impl Iterator<Item = &'a Term> + 'a {
        self.objects(subject, ns::rdf::TYPE)
    }

    /// Whether `term` occurs anywhere in the store
    pub fn mentions(&self, term: &Term) -> bool {
        self.by_subject.contains_key(term)
            || self
                .triples
                .iter()
                .any(|t| &t.object == term || &t.predicate == term)
    }

    /// Read an RDF collection starting at `head`.
    ///
    /// Stops at `rdf:nil`, at a node without `rdf:first`, or when a node is
    /// revisited.
    pub fn list_items(&self, head: &Term) -> Vec<Term> {
        let mut items = Vec::new();
        let mut seen = IndexSet::new();
        let mut current = head.clone();

        while !current.is_uri(ns::rdf::NIL) && seen.insert(current.clone()) {
            match self.object(&current, ns::rdf::FIRST) {
                Some(item) => items.push(item.clone()),
                None => break,
            }
            match self.object(&current, ns::rdf::REST) {
                Some(rest) => current = rest.clone(),
                None => break,
            }
        }

        items
    }

    /// Add every triple of `other` to this store
    pub fn merge(&mut self, other: &Store) {
        self.add_all(other.iter().cloned());
    }

    /// Serialize as N-Triples
    pub fn to_ntriples(&self) -> String {
        let mut out = String::new();
        for triple in &self.triples {
            out.push_str(&triple.to_string());
            out.push('\n');
        }
        out
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Store {{")?;
        for triple in &self.triples {
            writeln!(f, "  {:?}", triple)?;
        }
        write!(f, "}}")
    }
}

impl FromIterator<Triple> for Store {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        let mut store = Store::new();
        store.add_all(iter);
        store
    }
}

impl Extend<Triple> for Store {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        self.add_all(iter);
    }
}
