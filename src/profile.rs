//! Local profiles
//!
//! The profile of an individual is the class expression built from nothing
//! but its asserted types and outgoing edges:
//!
//! ```text
//! {a} and Process and (hasInput some (Data and (format some string)))
//! ```
//!
//! Comparing two profiles with the reasoner turns "may this individual stand
//! in for that one" into a subsumption query.

use fnv::FnvHashSet;

use crate::core::ns;
use crate::expression::ClassExpression;
use crate::reasoner::{ReasonerError, ReasonerFacade};
use crate::term::{Term, Triple};

/// Builds local profiles through a reasoner
pub struct LocalProfileBuilder<'r, R: ReasonerFacade + ?Sized> {
    reasoner: &'r R,
}

impl<'r, R: ReasonerFacade + ?Sized> LocalProfileBuilder<'r, R> {
    pub fn new(reasoner: &'r R) -> Self {
        LocalProfileBuilder { reasoner }
    }

    /// Profile of `individual`.
    ///
    /// `direct_identity` adds `{individual}` to the top-level conjunction,
    /// `nested_identity` does the same for every individual reached through
    /// an edge. Anonymous nodes never get an identity nominal.
    pub fn build(
        &self,
        individual: &Term,
        direct_identity: bool,
        nested_identity: bool,
    ) -> Result<ClassExpression, ReasonerError> {
        let mut visited = FnvHashSet::default();
        self.profile(individual, direct_identity, nested_identity, &mut visited)
    }

    /// The AND of the individual's non-reserved named types
    pub fn type_profile(&self, individual: &Term) -> Result<ClassExpression, ReasonerError> {
        let types = self.reasoner.asserted_types(individual)?;
        Ok(ClassExpression::and(
            types
                .iter()
                .filter(|t| *t != individual)
                .filter_map(type_expression),
        ))
    }

    fn profile(
        &self,
        individual: &Term,
        identity: bool,
        nested_identity: bool,
        visited: &mut FnvHashSet<Triple>,
    ) -> Result<ClassExpression, ReasonerError> {
        if let Term::Literal(literal) = individual {
            return Ok(ClassExpression::Class(Term::uri(literal.effective_datatype())));
        }

        let mut conjuncts = Vec::new();
        if identity && !individual.is_anonymous() {
            conjuncts.push(ClassExpression::Nominal(individual.clone()));
        }

        for t in self.reasoner.asserted_types(individual)? {
            if &t == individual {
                continue;
            }
            if let Some(expr) = type_expression(&t) {
                conjuncts.push(expr);
            }
        }

        for (property, value) in self.reasoner.asserted_outgoing_edges(individual)? {
            if is_reserved(&property) {
                continue;
            }

            let edge = Triple::new(individual.clone(), property.clone(), value.clone());
            let filler = if visited.insert(edge) {
                self.profile(&value, nested_identity, nested_identity, visited)?
            } else {
                ClassExpression::Top
            };
            conjuncts.push(ClassExpression::some(property, filler));
        }

        Ok(ClassExpression::and(conjuncts))
    }
}

fn is_reserved(term: &Term) -> bool {
    term.as_uri().map_or(false, |u| ns::is_reserved(u.as_str()))
}

/// Class expression for an asserted type, unless it is protocol vocabulary
fn type_expression(t: &Term) -> Option<ClassExpression> {
    match t {
        Term::Uri(uri) if ns::is_reserved(uri.as_str()) => None,
        Term::Uri(uri) => Some(ClassExpression::named(uri.as_str())),
        Term::BlankNode(_) => Some(ClassExpression::Class(t.clone())),
        Term::Literal(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_turtle;
    use crate::reasoner::StoreReasoner;

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

    #[test]
    fn test_profile_of_types_and_edges() {
        let r = reasoner(r#"
            ex:s a ex:Process, owl:NamedIndividual, rdg:Subject ;
                 ex:hasInput ex:d ;
                 ex:label "run" ;
                 rdg:hasGraph ex:g .
            ex:d a ex:Data .
        "#);
        let builder = LocalProfileBuilder::new(&r);

        let profile = builder.build(&ex("s"), true, false).unwrap();
        assert_eq!(
            profile,
            ClassExpression::And(vec![
                ClassExpression::Nominal(ex("s")),
                class("Process"),
                ClassExpression::some(ex("hasInput"), class("Data")),
                ClassExpression::some(
                    ex("label"),
                    ClassExpression::named("http://www.w3.org/2001/XMLSchema#string")
                ),
            ])
        );
    }

    #[test]
    fn test_nested_identity() {
        let r = reasoner("ex:s ex:p ex:o .");
        let builder = LocalProfileBuilder::new(&r);

        let profile = builder.build(&ex("s"), false, true).unwrap();
        assert_eq!(profile, ClassExpression::some(ex("p"), ClassExpression::Nominal(ex("o"))));
    }

    #[test]
    fn test_anonymous_nodes_have_no_identity() {
        let store = parse_turtle("_:b a <http://example.org/A> .", None).unwrap();
        let node = store.iter().next().unwrap().subject.clone();
        let r = StoreReasoner::new(store);
        let builder = LocalProfileBuilder::new(&r);

        assert_eq!(builder.build(&node, true, true).unwrap(), class("A"));
    }

    #[test]
    fn test_cycles_terminate_with_top() {
        let r = reasoner(r#"
            ex:a ex:next ex:b .
            ex:b ex:next ex:a .
        "#);
        let builder = LocalProfileBuilder::new(&r);

        let profile = builder.build(&ex("a"), false, false).unwrap();
        let expected = ClassExpression::some(
            ex("next"),
            ClassExpression::some(ex("next"), ClassExpression::some(ex("next"), ClassExpression::Top)),
        );
        assert_eq!(profile, expected);
    }

    #[test]
    fn test_empty_profile_is_top() {
        let r = reasoner("ex:a a owl:Thing .");
        let builder = LocalProfileBuilder::new(&r);
        assert_eq!(builder.build(&ex("a"), false, false).unwrap(), ClassExpression::Top);
        assert_eq!(builder.type_profile(&ex("a")).unwrap(), ClassExpression::Top);
    }

    #[test]
    fn test_unknown_individual() {
        let r = reasoner("");
        let builder = LocalProfileBuilder::new(&r);
        assert!(matches!(
            builder.build(&ex("ghost"), true, false),
            Err(ReasonerError::UnknownIndividual(_))
        ));
    }
}
