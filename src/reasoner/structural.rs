//! Store-backed structural reasoner
//!
//! Answers subsumption by structural comparison over the told class and
//! property hierarchies, unfolding equivalent-class definitions and told
//! super-class expressions of named classes. Sound for the expressions the
//! protocol builds, not complete for OWL 2 DL.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use fnv::FnvHashSet;
use indexmap::IndexSet;

use super::{ImportTicket, ReasonerError, ReasonerFacade};
use crate::core::ns;
use crate::expression::ClassExpression;
use crate::store::Store;
use crate::term::Term;

/// Default bound on nested subsumption checks
pub const DEFAULT_MAX_DEPTH: usize = 32;

struct ImportState {
    /// Ticket of the import currently holding the knowledge base
    active: Option<u64>,
    next_ticket: u64,
    /// Ontology plus imported documents
    view: Arc<Store>,
}

/// Reasoner over a base ontology and at most one imported document set
pub struct StoreReasoner {
    ontology: Arc<Store>,
    max_depth: usize,
    state: Mutex<ImportState>,
    released: Condvar,
}

type InProgress = FnvHashSet<(ClassExpression, ClassExpression)>;

impl StoreReasoner {
    pub fn new(ontology: Store) -> Self {
        let ontology = Arc::new(ontology);
        StoreReasoner {
            ontology: ontology.clone(),
            max_depth: DEFAULT_MAX_DEPTH,
            state: Mutex::new(ImportState {
                active: None,
                next_ticket: 0,
                view: ontology,
            }),
            released: Condvar::new(),
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn lock(&self) -> MutexGuard<'_, ImportState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current knowledge base
    fn view(&self) -> Arc<Store> {
        self.lock().view.clone()
    }

    fn require_known(kb: &Store, individual: &Term) -> Result<(), ReasonerError> {
        if kb.mentions(individual) {
            Ok(())
        } else {
            Err(ReasonerError::UnknownIndividual(individual.clone()))
        }
    }

    /// Named classes reachable from `class` through told subClassOf and
    /// equivalentClass edges, `class` included.
    fn told_supers(kb: &Store, class: &Term) -> IndexSet<Term> {
        let mut seen = IndexSet::new();
        let mut queue = vec![class.clone()];

        while let Some(current) = queue.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            let next = kb
                .objects(&current, ns::rdfs::SUB_CLASS_OF)
                .chain(kb.objects(&current, ns::owl::EQUIVALENT_CLASS))
                .chain(kb.subjects(ns::owl::EQUIVALENT_CLASS, &current))
                .filter(|t| matches!(t, Term::Uri(_)));
            queue.extend(next.cloned());
        }

        seen
    }

    fn is_sub_property(kb: &Store, sub: &Term, sup: &Term) -> bool {
        if sub == sup {
            return true;
        }

        let mut seen = IndexSet::new();
        let mut queue = vec![sub.clone()];
        while let Some(current) = queue.pop() {
            if &current == sup {
                return true;
            }
            if !seen.insert(current.clone()) {
                continue;
            }
            let next = kb
                .objects(&current, ns::rdfs::SUB_PROPERTY_OF)
                .chain(kb.objects(&current, ns::owl::EQUIVALENT_PROPERTY))
                .chain(kb.subjects(ns::owl::EQUIVALENT_PROPERTY, &current));
            queue.extend(next.cloned());
        }

        false
    }

    fn super_expressions(kb: &Store, class: &Term) -> Vec<ClassExpression> {
        kb.objects(class, ns::rdfs::SUB_CLASS_OF)
            .map(|sup| ClassExpression::from_rdf(kb, sup))
            .collect()
    }

    fn equivalent_expressions(kb: &Store, class: &Term) -> Vec<ClassExpression> {
        let mut out: Vec<ClassExpression> = Vec::new();
        let related = kb
            .objects(class, ns::owl::EQUIVALENT_CLASS)
            .chain(kb.subjects(ns::owl::EQUIVALENT_CLASS, class));
        for other in related {
            let expr = ClassExpression::from_rdf(kb, other);
            if !out.contains(&expr) {
                out.push(expr);
            }
        }
        out
    }

    fn entails(
        &self,
        kb: &Store,
        sub: &ClassExpression,
        sup: &ClassExpression,
        depth: usize,
        in_progress: &mut InProgress,
    ) -> bool {
        use ClassExpression as C;

        if sub == sup || sup.is_top() || matches!(sub, C::Bottom) {
            return true;
        }
        if depth > self.max_depth {
            tracing::trace!(%sub, %sup, "subsumption depth bound reached");
            return false;
        }

        let key = (sub.clone(), sup.clone());
        if !in_progress.insert(key.clone()) {
            return false;
        }
        let result = self.entails_step(kb, sub, sup, depth + 1, in_progress);
        in_progress.remove(&key);
        result
    }

    fn entails_step(
        &self,
        kb: &Store,
        sub: &ClassExpression,
        sup: &ClassExpression,
        depth: usize,
        in_progress: &mut InProgress,
    ) -> bool {
        use ClassExpression as C;

        // Decompose the disjunctive sub side and the conjunctive sup side first.
        if let C::Or(branches) = sub {
            return branches.iter().all(|b| self.entails(kb, b, sup, depth, in_progress));
        }
        if let C::And(conjuncts) = sup {
            return conjuncts.iter().all(|c| self.entails(kb, sub, c, depth, in_progress));
        }
        if let C::Or(branches) = sup {
            if branches.iter().any(|b| self.entails(kb, sub, b, depth, in_progress)) {
                return true;
            }
        }

        if self.matches_sup(kb, sub, sup, depth, in_progress) {
            return true;
        }

        match sub {
            C::And(conjuncts) => conjuncts
                .iter()
                .any(|c| self.entails(kb, c, sup, depth, in_progress)),
            C::Class(class) => {
                let mut told = Self::super_expressions(kb, class);
                told.extend(Self::equivalent_expressions(kb, class));
                told.iter().any(|t| self.entails(kb, t, sup, depth, in_progress))
            }
            C::Nominal(individual) => {
                let types: Vec<Term> = kb.types(individual).cloned().collect();
                types
                    .into_iter()
                    .any(|t| self.entails(kb, &C::Class(t), sup, depth, in_progress))
            }
            _ => false,
        }
    }

    /// Structural rules keyed on the form of `sup`
    fn matches_sup(
        &self,
        kb: &Store,
        sub: &ClassExpression,
        sup: &ClassExpression,
        depth: usize,
        in_progress: &mut InProgress,
    ) -> bool {
        use ClassExpression as C;

        match (sup, sub) {
            (C::Class(class), C::Class(other)) if Self::told_supers(kb, other).contains(class) => true,
            (C::Class(class), _) => Self::equivalent_expressions(kb, class)
                .iter()
                .filter(|def| def.class_id().is_none())
                .any(|def| self.entails(kb, sub, def, depth, in_progress)),

            (C::SomeValuesFrom(p, filler), C::SomeValuesFrom(q, other)) => {
                Self::is_sub_property(kb, q, p) && self.entails(kb, other, filler, depth, in_progress)
            }
            (C::SomeValuesFrom(p, filler), C::MinCardinality(q, n) | C::ExactCardinality(q, n)) => {
                *n >= 1 && filler.is_top() && Self::is_sub_property(kb, q, p)
            }
            (C::SomeValuesFrom(p, filler), C::HasValue(q, v)) => {
                Self::is_sub_property(kb, q, p)
                    && self.entails(kb, &C::Nominal(v.clone()), filler, depth, in_progress)
            }
            (C::AllValuesFrom(p, filler), C::AllValuesFrom(q, other)) => {
                Self::is_sub_property(kb, p, q) && self.entails(kb, other, filler, depth, in_progress)
            }
            (C::MinCardinality(_, 0), _) => true,
            (C::MinCardinality(p, n), C::MinCardinality(q, m) | C::ExactCardinality(q, m)) => {
                m >= n && Self::is_sub_property(kb, q, p)
            }
            (C::MinCardinality(p, 1), C::SomeValuesFrom(q, _) | C::HasValue(q, _)) => {
                Self::is_sub_property(kb, q, p)
            }
            (C::MaxCardinality(p, n), C::MaxCardinality(q, m) | C::ExactCardinality(q, m)) => {
                m <= n && Self::is_sub_property(kb, p, q)
            }
            (C::ExactCardinality(p, n), C::ExactCardinality(q, m)) => n == m && p == q,
            (C::HasSelf(p), C::HasSelf(q)) => Self::is_sub_property(kb, q, p),
            (C::HasValue(p, v), C::HasValue(q, w)) => v == w && Self::is_sub_property(kb, q, p),
            (C::HasValue(p, v), C::SomeValuesFrom(q, filler)) => {
                matches!(&**filler, C::Nominal(w) if w == v) && Self::is_sub_property(kb, q, p)
            }
            (C::Not(excluded), C::Not(other)) => self.entails(kb, excluded, other, depth, in_progress),
            (C::Not(excluded), C::Class(class)) => Self::disjoint_named(kb, class, excluded),
            _ => false,
        }
    }

    /// `class` told disjoint with the named `excluded`
    fn disjoint_named(kb: &Store, class: &Term, excluded: &ClassExpression) -> bool {
        let Some(excluded) = excluded.class_id() else {
            return false;
        };
        let supers = Self::told_supers(kb, class);
        let excluded_supers = Self::told_supers(kb, excluded);
        supers.iter().any(|c| {
            kb.objects(c, ns::owl::DISJOINT_WITH)
                .chain(kb.subjects(ns::owl::DISJOINT_WITH, c))
                .any(|d| excluded_supers.contains(d) || d == excluded)
        })
    }

    /// Named-class closure of an individual's asserted types
    fn type_closure(kb: &Store, individual: &Term) -> IndexSet<Term> {
        let mut closure = IndexSet::new();
        for t in kb.types(individual) {
            closure.extend(Self::told_supers(kb, t));
        }
        closure
    }
}

impl ReasonerFacade for StoreReasoner {
    fn is_sub_class_of(&self, sub: &ClassExpression, sup: &ClassExpression) -> bool {
        let kb = self.view();
        let mut in_progress = InProgress::default();
        let result = self.entails(&kb, sub, sup, 0, &mut in_progress);
        tracing::trace!(%sub, %sup, result, "subsumption");
        result
    }

    fn asserted_super_classes(&self, class: &Term) -> Vec<ClassExpression> {
        Self::super_expressions(&self.view(), class)
    }

    fn asserted_equivalent_classes(&self, class: &Term) -> Vec<ClassExpression> {
        Self::equivalent_expressions(&self.view(), class)
    }

    fn asserted_types(&self, individual: &Term) -> Result<Vec<Term>, ReasonerError> {
        let kb = self.view();
        Self::require_known(&kb, individual)?;
        Ok(kb.types(individual).cloned().collect())
    }

    fn asserted_outgoing_edges(&self, individual: &Term) -> Result<Vec<(Term, Term)>, ReasonerError> {
        let kb = self.view();
        Self::require_known(&kb, individual)?;
        Ok(kb.outgoing(individual).cloned().collect())
    }

    fn property_ranges(&self, property: &Term) -> Vec<Term> {
        self.view().objects(property, ns::rdfs::RANGE).cloned().collect()
    }

    fn property_domains(&self, property: &Term) -> Vec<Term> {
        self.view().objects(property, ns::rdfs::DOMAIN).cloned().collect()
    }

    fn check_consistency(&self) -> Result<(), ReasonerError> {
        let kb = self.view();
        let rdf_type = Term::uri(ns::rdf::TYPE);
        let individuals: IndexSet<&Term> = kb
            .iter()
            .filter(|t| t.predicate == rdf_type)
            .map(|t| &t.subject)
            .collect();

        for individual in individuals {
            let closure = Self::type_closure(&kb, individual);

            if closure.iter().any(|c| c.is_uri(ns::owl::NOTHING)) {
                return Err(ReasonerError::Inconsistent(format!(
                    "{} is a member of owl:Nothing",
                    individual
                )));
            }

            for class in &closure {
                if let Some(other) = kb
                    .objects(class, ns::owl::DISJOINT_WITH)
                    .find(|d| closure.contains(*d))
                {
                    return Err(ReasonerError::Inconsistent(format!(
                        "{} is a member of disjoint classes {} and {}",
                        individual, class, other
                    )));
                }
            }
        }

        Ok(())
    }

    fn import_documents(&self, documents: &[&Store]) -> ImportTicket {
        let mut state = self.lock();
        while state.active.is_some() {
            state = self
                .released
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }

        let mut merged = (*self.ontology).clone();
        for document in documents {
            merged.merge(document);
        }

        let ticket = state.next_ticket;
        state.next_ticket += 1;
        state.active = Some(ticket);
        state.view = Arc::new(merged);
        ImportTicket(ticket)
    }

    fn release_documents(&self, ticket: ImportTicket) {
        let mut state = self.lock();
        if state.active != Some(ticket.0) {
            tracing::warn!(ticket = ticket.0, "release of an import that is not active");
            return;
        }
        state.active = None;
        state.view = self.ontology.clone();
        self.released.notify_one();
    }
}
