//! Class expression translation
//!
//! Translating an individual against a class expression checks the
//! expression's restrictions against the individual's asserted edges under a
//! closed-world reading and collects the statements that witness them:
//!
//! - a named class the individual belongs to yields an `rdf:type` statement,
//!   then its told super and equivalent classes are translated in turn
//! - `some`, `only`, cardinality and `Self` restrictions yield the edges they
//!   were satisfied by
//! - `and` needs every argument, `or` needs at least one, `not` needs its
//!   argument to fail
//!
//! Results are memoized per (expression, individual) for the lifetime of a
//! [`Translator`]. A pair met again while still being translated counts as an
//! empty success, which is what makes mutually equivalent classes terminate.

mod cache;

pub use cache::{CacheEntry, CacheStats, ExplanationStack, StatementSet, TranslationCache};

use crate::core::ns;
use crate::expression::ClassExpression;
use crate::failure::{FailureKind, RestrictionKind, Stage, ValidationFailure};
use crate::reasoner::{ReasonerError, ReasonerFacade};
use crate::term::{Term, Triple};

/// Translates individuals against class expressions for one validation pass
pub struct Translator<'r, R: ReasonerFacade + ?Sized> {
    reasoner: &'r R,
    cache: TranslationCache,
    explanations: ExplanationStack,
}

impl<'r, R: ReasonerFacade + ?Sized> Translator<'r, R> {
    pub fn new(reasoner: &'r R) -> Self {
        Translator {
            reasoner,
            cache: TranslationCache::new(),
            explanations: ExplanationStack::new(),
        }
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    pub fn explanations(&self) -> &ExplanationStack {
        &self.explanations
    }

    /// Translate `individual` against `expr`.
    ///
    /// Returns the witnessing statements, or the first failure that made the
    /// expression unsatisfied.
    pub fn translate(
        &mut self,
        expr: &ClassExpression,
        individual: &Term,
    ) -> Result<StatementSet, ValidationFailure> {
        if let Some(entry) = self.cache.get(expr, individual) {
            return match entry {
                CacheEntry::InProgress => {
                    tracing::trace!(%expr, %individual, "translation cycle, assuming success");
                    Ok(StatementSet::new())
                }
                CacheEntry::Success(statements) => Ok(statements.clone()),
                CacheEntry::Failure(failure) => Err(failure.clone()),
            };
        }

        self.cache.mark_in_progress(expr, individual);
        let result = self.dispatch(expr, individual);

        match &result {
            Ok(statements) => {
                tracing::trace!(%expr, %individual, statements = statements.len(), "translated");
                self.cache.store_success(expr, individual, statements.clone());
            }
            Err(failure) => {
                tracing::trace!(%expr, %individual, %failure, "translation failed");
                self.cache.store_failure(expr, individual, failure.clone());
            }
        }
        result
    }

    fn dispatch(&mut self, expr: &ClassExpression, individual: &Term) -> Result<StatementSet, ValidationFailure> {
        use ClassExpression as C;

        match expr {
            C::Top => Ok(StatementSet::new()),
            C::Bottom => Err(self.failure(
                FailureKind::Unsatisfiable,
                individual,
                format!("{} cannot belong to the empty class", individual.short_name()),
            )),
            C::Class(class) => self.translate_class(class, individual),
            C::And(conjuncts) => {
                let mut statements = StatementSet::new();
                for conjunct in conjuncts {
                    statements.extend(self.translate(conjunct, individual)?);
                }
                Ok(statements)
            }
            C::Or(branches) => self.translate_union(branches, individual),
            C::Not(excluded) => match self.translate(excluded, individual) {
                Ok(_) => Err(self.failure(
                    FailureKind::ComplementViolation,
                    individual,
                    format!("{} belongs to {}, which it must not", individual.short_name(), excluded),
                )),
                Err(_) => Ok(StatementSet::new()),
            },
            C::SomeValuesFrom(property, filler) => self.translate_some(property, filler, individual),
            C::AllValuesFrom(property, filler) => self.translate_all(property, filler, individual),
            C::MinCardinality(property, n) => {
                self.translate_cardinality(RestrictionKind::MinCardinality, property, *n, individual)
            }
            C::MaxCardinality(property, n) => {
                self.translate_cardinality(RestrictionKind::MaxCardinality, property, *n, individual)
            }
            C::ExactCardinality(property, n) => {
                self.translate_cardinality(RestrictionKind::ExactCardinality, property, *n, individual)
            }
            C::HasSelf(property) => self.translate_self(property, individual),
            // Left to the reasoner's consistency check
            C::HasValue(..) | C::Nominal(_) => Ok(StatementSet::new()),
        }
    }

    // ========================================================================
    // Named classes and unions
    // ========================================================================

    fn translate_class(&mut self, class: &Term, individual: &Term) -> Result<StatementSet, ValidationFailure> {
        if let Term::Literal(literal) = individual {
            if class.is_uri(ns::rdfs::LITERAL) || class.is_uri(&literal.effective_datatype()) {
                return Ok(StatementSet::new());
            }
            return Err(self
                .failure(
                    FailureKind::NotAMember,
                    individual,
                    format!("literal {} is not a {}", individual, class.short_name()),
                )
                .with_class(Some(class)));
        }

        let types = self
            .reasoner
            .asserted_types(individual)
            .map_err(|err| self.reasoner_failure(err, individual))?;
        let target = ClassExpression::Class(class.clone());
        let member = types.iter().any(|t| {
            t == class || self.reasoner.is_sub_class_of(&type_expression(t), &target)
        });

        let supers = self.reasoner.asserted_super_classes(class);
        let equivalents = self.reasoner.asserted_equivalent_classes(class);

        if !member && equivalents.is_empty() {
            return Err(self
                .failure(
                    FailureKind::NotAMember,
                    individual,
                    format!("{} is not a {}", individual.short_name(), class.short_name()),
                )
                .with_class(Some(class)));
        }

        self.explanations.push(class.clone());
        let result = self.expand_class(class, individual, member, &supers, &equivalents);
        self.explanations.pop();
        result
    }

    fn expand_class(
        &mut self,
        class: &Term,
        individual: &Term,
        member: bool,
        supers: &[ClassExpression],
        equivalents: &[ClassExpression],
    ) -> Result<StatementSet, ValidationFailure> {
        let mut statements = StatementSet::new();
        if member {
            statements.insert(Triple::new(
                individual.clone(),
                Term::uri(ns::rdf::TYPE),
                class.clone(),
            ));
        }

        for definition in supers.iter().chain(equivalents) {
            statements.extend(self.translate(definition, individual)?);
        }
        Ok(statements)
    }

    fn translate_union(
        &mut self,
        branches: &[ClassExpression],
        individual: &Term,
    ) -> Result<StatementSet, ValidationFailure> {
        let mut statements = StatementSet::new();
        let mut failures = Vec::new();
        let mut satisfied = false;

        for branch in branches {
            match self.translate(branch, individual) {
                Ok(found) => {
                    satisfied = true;
                    statements.extend(found);
                }
                Err(failure) => failures.push(failure),
            }
        }

        if satisfied {
            return Ok(statements);
        }

        let reasons = failures
            .iter()
            .map(|f| f.explanation.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        Err(self.failure(
            FailureKind::UnionExhausted { branches: failures },
            individual,
            format!(
                "{} satisfies none of {} alternatives: {}",
                individual.short_name(),
                branches.len(),
                reasons
            ),
        ))
    }

    // ========================================================================
    // Property restrictions
    // ========================================================================

    /// Asserted values of `property` on `individual`.
    ///
    /// Also consults the property's declared domain and range, which are not
    /// enforced.
    fn values(&self, property: &Term, individual: &Term) -> Result<Vec<Term>, ValidationFailure> {
        let domains = self.reasoner.property_domains(property);
        let ranges = self.reasoner.property_ranges(property);
        if !domains.is_empty() || !ranges.is_empty() {
            tracing::trace!(%property, ?domains, ?ranges, "domain and range not enforced");
        }

        if matches!(individual, Term::Literal(_)) {
            return Ok(Vec::new());
        }

        let edges = self
            .reasoner
            .asserted_outgoing_edges(individual)
            .map_err(|err| self.reasoner_failure(err, individual))?;
        Ok(edges
            .into_iter()
            .filter(|(p, _)| p == property)
            .map(|(_, value)| value)
            .collect())
    }

    fn translate_some(
        &mut self,
        property: &Term,
        filler: &ClassExpression,
        individual: &Term,
    ) -> Result<StatementSet, ValidationFailure> {
        let values = self.values(property, individual)?;
        let mut last_failure = None;

        for value in &values {
            match self.translate(filler, value) {
                Ok(found) => {
                    let mut statements = StatementSet::new();
                    statements.insert(Triple::new(individual.clone(), property.clone(), value.clone()));
                    statements.extend(found);
                    return Ok(statements);
                }
                Err(failure) => last_failure = Some(failure),
            }
        }

        let explanation = if values.is_empty() {
            format!("{} has no value for {}", individual.short_name(), property.short_name())
        } else {
            format!(
                "none of the {} values of {} on {} is a {}",
                values.len(),
                property.short_name(),
                individual.short_name(),
                filler
            )
        };
        Err(self.restriction_failure(
            RestrictionKind::SomeValuesFrom,
            property,
            1,
            0,
            last_failure,
            individual,
            explanation,
        ))
    }

    fn translate_all(
        &mut self,
        property: &Term,
        filler: &ClassExpression,
        individual: &Term,
    ) -> Result<StatementSet, ValidationFailure> {
        let values = self.values(property, individual)?;
        let mut statements = StatementSet::new();
        let mut first_failure = None;
        let mut satisfied = 0;

        for value in &values {
            match self.translate(filler, value) {
                Ok(found) => {
                    satisfied += 1;
                    statements.insert(Triple::new(individual.clone(), property.clone(), value.clone()));
                    statements.extend(found);
                }
                Err(failure) => {
                    first_failure.get_or_insert(failure);
                }
            }
        }

        match first_failure {
            None => Ok(statements),
            Some(cause) => Err(self.restriction_failure(
                RestrictionKind::AllValuesFrom,
                property,
                values.len(),
                satisfied,
                Some(cause),
                individual,
                format!(
                    "only {} of {} values of {} on {} are a {}",
                    satisfied,
                    values.len(),
                    property.short_name(),
                    individual.short_name(),
                    filler
                ),
            )),
        }
    }

    /// Counts values only; fillers are not checked. Upper bounds other than
    /// zero are not enforced.
    fn translate_cardinality(
        &mut self,
        restriction: RestrictionKind,
        property: &Term,
        n: usize,
        individual: &Term,
    ) -> Result<StatementSet, ValidationFailure> {
        let values = self.values(property, individual)?;
        let observed = values.len();

        let checks_min = matches!(restriction, RestrictionKind::MinCardinality | RestrictionKind::ExactCardinality);
        let checks_max = matches!(restriction, RestrictionKind::MaxCardinality | RestrictionKind::ExactCardinality);

        if checks_min && observed < n {
            return Err(self.restriction_failure(
                restriction,
                property,
                n,
                observed,
                None,
                individual,
                format!(
                    "{} needs at least {} values for {}, found {}",
                    individual.short_name(),
                    n,
                    property.short_name(),
                    observed
                ),
            ));
        }
        if checks_max && n == 0 && observed > 0 {
            return Err(self.restriction_failure(
                restriction,
                property,
                0,
                observed,
                None,
                individual,
                format!(
                    "{} must have no value for {}, found {}",
                    individual.short_name(),
                    property.short_name(),
                    observed
                ),
            ));
        }

        Ok(values
            .into_iter()
            .map(|value| Triple::new(individual.clone(), property.clone(), value))
            .collect())
    }

    fn translate_self(&mut self, property: &Term, individual: &Term) -> Result<StatementSet, ValidationFailure> {
        let values = self.values(property, individual)?;
        if values.contains(individual) {
            let mut statements = StatementSet::new();
            statements.insert(Triple::new(individual.clone(), property.clone(), individual.clone()));
            return Ok(statements);
        }

        Err(self.restriction_failure(
            RestrictionKind::HasSelf,
            property,
            1,
            0,
            None,
            individual,
            format!("{} is not related to itself by {}", individual.short_name(), property.short_name()),
        ))
    }

    // ========================================================================
    // Failures
    // ========================================================================

    fn failure(&self, kind: FailureKind, individual: &Term, explanation: String) -> ValidationFailure {
        let explanation = match self.explanations.depth() {
            0 => explanation,
            _ => format!("{} (in {})", explanation, self.explanations.render()),
        };
        ValidationFailure::new(Stage::Restriction, kind, explanation)
            .with_individual(individual)
            .with_class(self.explanations.top())
    }

    #[allow(clippy::too_many_arguments)]
    fn restriction_failure(
        &self,
        restriction: RestrictionKind,
        property: &Term,
        expected: usize,
        observed: usize,
        cause: Option<ValidationFailure>,
        individual: &Term,
        explanation: String,
    ) -> ValidationFailure {
        self.failure(
            FailureKind::RestrictionViolation {
                restriction,
                property: property.clone(),
                expected,
                observed,
                cause: cause.map(Box::new),
            },
            individual,
            explanation,
        )
    }

    fn reasoner_failure(&self, err: ReasonerError, individual: &Term) -> ValidationFailure {
        let explanation = err.to_string();
        self.failure(err.into(), individual, explanation)
    }
}

fn type_expression(t: &Term) -> ClassExpression {
    match t {
        Term::Uri(uri) => ClassExpression::named(uri.as_str()),
        other => ClassExpression::Class(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_turtle;
    use crate::reasoner::{ImportTicket, StoreReasoner};
    use crate::store::Store;
    use std::cell::Cell;

    fn ex(local: &str) -> Term {
        Term::uri(format!("http://example.org/{}", local))
    }

    fn class(local: &str) -> ClassExpression {
        ClassExpression::Class(ex(local))
    }

    fn reasoner(ttl: &str) -> StoreReasoner {
        let input = format!("@prefix ex: <http://example.org/> .\n{}", ttl);
        StoreReasoner::new(parse_turtle(&input, None).unwrap())
    }

    fn edge(s: &str, p: &str, o: &str) -> Triple {
        Triple::new(ex(s), ex(p), ex(o))
    }

    /// Counts every query that reaches the wrapped reasoner
    struct CountingReasoner<'a> {
        inner: &'a StoreReasoner,
        calls: Cell<usize>,
    }

    impl CountingReasoner<'_> {
        fn tick(&self) {
            self.calls.set(self.calls.get() + 1);
        }
    }

    impl ReasonerFacade for CountingReasoner<'_> {
        fn is_sub_class_of(&self, sub: &ClassExpression, sup: &ClassExpression) -> bool {
            self.tick();
            self.inner.is_sub_class_of(sub, sup)
        }

        fn asserted_super_classes(&self, class: &Term) -> Vec<ClassExpression> {
            self.tick();
            self.inner.asserted_super_classes(class)
        }

        fn asserted_equivalent_classes(&self, class: &Term) -> Vec<ClassExpression> {
            self.tick();
            self.inner.asserted_equivalent_classes(class)
        }

        fn asserted_types(&self, individual: &Term) -> Result<Vec<Term>, ReasonerError> {
            self.tick();
            self.inner.asserted_types(individual)
        }

        fn asserted_outgoing_edges(&self, individual: &Term) -> Result<Vec<(Term, Term)>, ReasonerError> {
            self.tick();
            self.inner.asserted_outgoing_edges(individual)
        }

        fn property_ranges(&self, property: &Term) -> Vec<Term> {
            self.tick();
            self.inner.property_ranges(property)
        }

        fn property_domains(&self, property: &Term) -> Vec<Term> {
            self.tick();
            self.inner.property_domains(property)
        }

        fn check_consistency(&self) -> Result<(), ReasonerError> {
            self.tick();
            self.inner.check_consistency()
        }

        fn import_documents(&self, documents: &[&Store]) -> ImportTicket {
            self.inner.import_documents(documents)
        }

        fn release_documents(&self, ticket: ImportTicket) {
            self.inner.release_documents(ticket)
        }
    }

    #[test]
    fn test_and_or_duality() {
        let r = reasoner(r#"
            ex:both ex:p ex:x ; ex:q ex:y .
            ex:onlyP ex:p ex:x .
            ex:neither ex:r ex:z .
        "#);
        let branch_p = ClassExpression::And(vec![
            ClassExpression::MinCardinality(ex("p"), 1),
            ClassExpression::MaxCardinality(ex("r"), 0),
        ]);
        let branch_q = ClassExpression::And(vec![
            ClassExpression::MinCardinality(ex("q"), 1),
            ClassExpression::MaxCardinality(ex("r"), 0),
        ]);
        let union = ClassExpression::Or(vec![branch_p.clone(), branch_q.clone()]);
        let intersection = ClassExpression::And(vec![branch_p, branch_q]);

        let mut t = Translator::new(&r);
        assert!(t.translate(&union, &ex("both")).is_ok());
        assert!(t.translate(&intersection, &ex("both")).is_ok());

        assert!(t.translate(&union, &ex("onlyP")).is_ok());
        assert!(t.translate(&intersection, &ex("onlyP")).is_err());

        assert!(t.translate(&union, &ex("neither")).is_err());
        assert!(t.translate(&intersection, &ex("neither")).is_err());
    }

    #[test]
    fn test_max_zero_is_exact() {
        let r = reasoner(r#"
            ex:empty ex:q ex:x .
            ex:one ex:p ex:x .
        "#);
        let expr = ClassExpression::MaxCardinality(ex("p"), 0);
        let mut t = Translator::new(&r);

        assert_eq!(t.translate(&expr, &ex("empty")).unwrap(), StatementSet::new());
        let failure = t.translate(&expr, &ex("one")).unwrap_err();
        assert_eq!(
            failure.kind,
            FailureKind::RestrictionViolation {
                restriction: RestrictionKind::MaxCardinality,
                property: ex("p"),
                expected: 0,
                observed: 1,
                cause: None,
            }
        );
        assert_eq!(failure.stage, Stage::Restriction);
    }

    #[test]
    fn test_max_above_zero_is_not_enforced() {
        let r = reasoner("ex:a ex:p ex:x, ex:y, ex:z .");
        let mut t = Translator::new(&r);
        let statements = t.translate(&ClassExpression::MaxCardinality(ex("p"), 1), &ex("a")).unwrap();
        assert_eq!(statements.len(), 3);
    }

    #[test]
    fn test_min_cardinality_collects_edges() {
        let r = reasoner(r#"
            ex:Process rdfs:subClassOf [ a owl:Restriction ;
                owl:onProperty ex:hasInput ; owl:minCardinality 1 ] .
            ex:s a ex:Process ; ex:hasInput ex:d1, ex:d2 .
            ex:bare a ex:Process .
        "#);
        let mut t = Translator::new(&r);

        let statements = t.translate(&class("Process"), &ex("s")).unwrap();
        assert!(statements.contains(&Triple::new(ex("s"), Term::uri(ns::rdf::TYPE), ex("Process"))));
        assert!(statements.contains(&edge("s", "hasInput", "d1")));
        assert!(statements.contains(&edge("s", "hasInput", "d2")));

        let failure = t.translate(&class("Process"), &ex("bare")).unwrap_err();
        assert_eq!(failure.property(), Some(&ex("hasInput")));
        assert_eq!(failure.class, Some(ex("Process")));
        assert!(failure.explanation.contains("(in Process)"));
        assert!(matches!(
            failure.kind,
            FailureKind::RestrictionViolation { expected: 1, observed: 0, .. }
        ));
    }

    #[test]
    fn test_exact_cardinality() {
        let r = reasoner("ex:a ex:p ex:x .");
        let mut t = Translator::new(&r);
        assert!(t.translate(&ClassExpression::ExactCardinality(ex("p"), 1), &ex("a")).is_ok());
        assert!(t.translate(&ClassExpression::ExactCardinality(ex("p"), 2), &ex("a")).is_err());
        assert!(t.translate(&ClassExpression::ExactCardinality(ex("p"), 0), &ex("a")).is_err());
    }

    #[test]
    fn test_some_and_all_values() {
        let r = reasoner(r#"
            ex:s ex:hasInput ex:raw, ex:clean ; ex:label "step" .
            ex:clean a ex:Data .
            ex:raw a ex:Blob .
        "#);
        let mut t = Translator::new(&r);

        let some = ClassExpression::some(ex("hasInput"), class("Data"));
        let statements = t.translate(&some, &ex("s")).unwrap();
        assert!(statements.contains(&edge("s", "hasInput", "clean")));
        assert!(statements.contains(&Triple::new(ex("clean"), Term::uri(ns::rdf::TYPE), ex("Data"))));
        assert!(!statements.contains(&edge("s", "hasInput", "raw")));

        let only = ClassExpression::only(ex("hasInput"), class("Data"));
        let failure = t.translate(&only, &ex("s")).unwrap_err();
        match failure.kind {
            FailureKind::RestrictionViolation {
                restriction,
                expected,
                observed,
                cause,
                ..
            } => {
                assert_eq!(restriction, RestrictionKind::AllValuesFrom);
                assert_eq!((expected, observed), (2, 1));
                assert_eq!(cause.map(|c| c.kind), Some(FailureKind::NotAMember));
            }
            other => panic!("unexpected failure {:?}", other),
        }

        let label = ClassExpression::some(ex("label"), ClassExpression::named(ns::rdfs::LITERAL));
        assert!(t.translate(&label, &ex("s")).is_ok());
    }

    #[test]
    fn test_has_self_and_complement() {
        let r = reasoner(r#"
            ex:loop ex:next ex:loop .
            ex:line ex:next ex:other .
        "#);
        let mut t = Translator::new(&r);
        let self_loop = ClassExpression::HasSelf(ex("next"));

        assert_eq!(t.translate(&self_loop, &ex("loop")).unwrap().len(), 1);
        assert!(t.translate(&self_loop, &ex("line")).is_err());

        let not_loop = ClassExpression::not(self_loop);
        assert!(t.translate(&not_loop, &ex("line")).unwrap().is_empty());
        assert_eq!(
            t.translate(&not_loop, &ex("loop")).unwrap_err().kind,
            FailureKind::ComplementViolation
        );
    }

    #[test]
    fn test_top_bottom_and_leaves() {
        let r = reasoner("ex:a ex:p ex:b .");
        let mut t = Translator::new(&r);
        assert!(t.translate(&ClassExpression::Top, &ex("a")).unwrap().is_empty());
        assert_eq!(
            t.translate(&ClassExpression::Bottom, &ex("a")).unwrap_err().kind,
            FailureKind::Unsatisfiable
        );
        assert!(t.translate(&ClassExpression::HasValue(ex("p"), ex("z")), &ex("a")).is_ok());
        assert!(t.translate(&ClassExpression::Nominal(ex("z")), &ex("a")).is_ok());
    }

    #[test]
    fn test_unknown_individual() {
        let r = reasoner("ex:a ex:p ex:b .");
        let mut t = Translator::new(&r);
        let failure = t.translate(&ClassExpression::MinCardinality(ex("p"), 1), &ex("ghost")).unwrap_err();
        assert_eq!(failure.kind, FailureKind::UnknownIndividual);
        assert_eq!(failure.individual, Some(ex("ghost")));
    }

    #[test]
    fn test_equivalence_cycle_terminates() {
        let r = reasoner(r#"
            ex:A owl:equivalentClass ex:B .
            ex:B owl:equivalentClass ex:A .
            ex:a a ex:A .
            ex:z ex:p ex:y .
        "#);
        let mut t = Translator::new(&r);

        let statements = t.translate(&class("A"), &ex("a")).unwrap();
        assert!(statements.contains(&Triple::new(ex("a"), Term::uri(ns::rdf::TYPE), ex("A"))));
        assert!(statements.contains(&Triple::new(ex("a"), Term::uri(ns::rdf::TYPE), ex("B"))));

        // No asserted membership: the cycle is a vacuous success with no type.
        assert!(t.translate(&class("B"), &ex("z")).unwrap().is_empty());
        assert!(t.cache().stats().cycles >= 2);
        assert_eq!(t.explanations().depth(), 0);
    }

    #[test]
    fn test_cached_translation_skips_reasoner() {
        let inner = reasoner(r#"
            ex:Process rdfs:subClassOf [ a owl:Restriction ;
                owl:onProperty ex:hasInput ; owl:someValuesFrom ex:Data ] .
            ex:s a ex:Process ; ex:hasInput ex:d .
            ex:d a ex:Data .
        "#);
        let counting = CountingReasoner {
            inner: &inner,
            calls: Cell::new(0),
        };
        let mut t = Translator::new(&counting);

        let first = t.translate(&class("Process"), &ex("s")).unwrap();
        let calls = counting.calls.get();
        assert!(calls > 0);

        let second = t.translate(&class("Process"), &ex("s")).unwrap();
        assert_eq!(first, second);
        assert_eq!(counting.calls.get(), calls);
    }

    #[test]
    fn test_union_fallback_and_exhaustion() {
        let r = reasoner(r#"
            ex:b a ex:TypeB .
            ex:c a ex:TypeC .
        "#);
        let union = ClassExpression::Or(vec![class("TypeA"), class("TypeB")]);
        let mut t = Translator::new(&r);

        let statements = t.translate(&union, &ex("b")).unwrap();
        assert_eq!(
            statements.into_iter().collect::<Vec<_>>(),
            vec![Triple::new(ex("b"), Term::uri(ns::rdf::TYPE), ex("TypeB"))]
        );

        let failure = t.translate(&union, &ex("c")).unwrap_err();
        match &failure.kind {
            FailureKind::UnionExhausted { branches } => {
                assert_eq!(branches.len(), 2);
                assert!(branches.iter().all(|b| b.kind == FailureKind::NotAMember));
                assert_eq!(branches[0].class, Some(ex("TypeA")));
            }
            other => panic!("unexpected failure {:?}", other),
        }
        assert!(failure.explanation.contains("none of 2 alternatives"));
    }

    #[test]
    fn test_subclass_membership() {
        let r = reasoner(r#"
            ex:Dog rdfs:subClassOf ex:Animal .
            ex:rex a ex:Dog .
        "#);
        let mut t = Translator::new(&r);
        let statements = t.translate(&class("Animal"), &ex("rex")).unwrap();
        assert!(statements.contains(&Triple::new(ex("rex"), Term::uri(ns::rdf::TYPE), ex("Animal"))));
    }
}
