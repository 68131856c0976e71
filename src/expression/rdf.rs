//! Reading OWL class expressions from their RDF encoding

use indexmap::IndexSet;

use super::ClassExpression;
use crate::core::ns;
use crate::store::Store;
use crate::term::Term;

impl ClassExpression {
    /// Read the class expression denoted by `term` in `store`.
    ///
    /// Named classes are never unfolded. Anonymous nodes are read as
    /// boolean combinations, enumerations or restrictions; an anonymous node
    /// with none of these shapes (or one reached again while it is being
    /// read) is returned as `Class(node)`.
    pub fn from_rdf(store: &Store, term: &Term) -> ClassExpression {
        let mut visiting = IndexSet::new();
        read(store, term, &mut visiting)
    }
}

fn read(store: &Store, term: &Term, visiting: &mut IndexSet<Term>) -> ClassExpression {
    match term {
        Term::Uri(uri) => return ClassExpression::named(uri.as_str()),
        Term::Literal(_) => return ClassExpression::Class(term.clone()),
        Term::BlankNode(_) => {}
    }

    if !visiting.insert(term.clone()) {
        return ClassExpression::Class(term.clone());
    }
    let expr = read_anonymous(store, term, visiting);
    visiting.shift_remove(term);
    expr
}

fn read_list(store: &Store, head: &Term, visiting: &mut IndexSet<Term>) -> Vec<ClassExpression> {
    store
        .list_items(head)
        .iter()
        .map(|item| read(store, item, visiting))
        .collect()
}

fn read_anonymous(store: &Store, node: &Term, visiting: &mut IndexSet<Term>) -> ClassExpression {
    if let Some(head) = store.object(node, ns::owl::INTERSECTION_OF) {
        let head = head.clone();
        return ClassExpression::and(read_list(store, &head, visiting));
    }

    if let Some(head) = store.object(node, ns::owl::UNION_OF) {
        let head = head.clone();
        return ClassExpression::or(read_list(store, &head, visiting));
    }

    if let Some(inner) = store.object(node, ns::owl::COMPLEMENT_OF) {
        let inner = inner.clone();
        return ClassExpression::not(read(store, &inner, visiting));
    }

    if let Some(head) = store.object(node, ns::owl::ONE_OF) {
        let members = store.list_items(head);
        return ClassExpression::or(members.into_iter().map(ClassExpression::Nominal));
    }

    if let Some(property) = store.object(node, ns::owl::ON_PROPERTY) {
        if let Some(expr) = read_restriction(store, node, property.clone(), visiting) {
            return expr;
        }
    }

    ClassExpression::Class(node.clone())
}

fn cardinality(store: &Store, node: &Term, predicates: &[&str]) -> Option<usize> {
    predicates
        .iter()
        .filter_map(|p| store.object(node, p))
        .find_map(|bound| bound.as_literal().and_then(|l| l.as_cardinality()))
}

fn read_restriction(
    store: &Store,
    node: &Term,
    property: Term,
    visiting: &mut IndexSet<Term>,
) -> Option<ClassExpression> {
    if let Some(filler) = store.object(node, ns::owl::SOME_VALUES_FROM) {
        let filler = filler.clone();
        return Some(ClassExpression::some(property, read(store, &filler, visiting)));
    }

    if let Some(filler) = store.object(node, ns::owl::ALL_VALUES_FROM) {
        let filler = filler.clone();
        return Some(ClassExpression::only(property, read(store, &filler, visiting)));
    }

    if let Some(value) = store.object(node, ns::owl::HAS_VALUE) {
        return Some(ClassExpression::HasValue(property, value.clone()));
    }

    if store.object(node, ns::owl::HAS_SELF).is_some() {
        return Some(ClassExpression::HasSelf(property));
    }

    if let Some(n) = cardinality(store, node, &[ns::owl::CARDINALITY, ns::owl::QUALIFIED_CARDINALITY]) {
        return Some(ClassExpression::ExactCardinality(property, n));
    }

    if let Some(n) = cardinality(store, node, &[ns::owl::MIN_CARDINALITY, ns::owl::MIN_QUALIFIED_CARDINALITY]) {
        return Some(ClassExpression::MinCardinality(property, n));
    }

    if let Some(n) = cardinality(store, node, &[ns::owl::MAX_CARDINALITY, ns::owl::MAX_QUALIFIED_CARDINALITY]) {
        return Some(ClassExpression::MaxCardinality(property, n));
    }

    None
}
