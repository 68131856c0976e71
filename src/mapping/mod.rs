//! Individual mappings
//!
//! - [`MappingKind`] selects the subsumption test used to accept a pairing
//! - [`MappingValidator`] decides whether an instance individual may stand in
//!   for a template individual
//! - [`StructuralMatcher`] pairs whole sets of individuals
//! - [`Mapping`] records the result

mod matcher;

pub use matcher::StructuralMatcher;

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::expression::ClassExpression;
use crate::profile::LocalProfileBuilder;
use crate::reasoner::{ReasonerError, ReasonerFacade};
use crate::term::Term;

/// Direction and strictness of the test that accepts a pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingKind {
    /// Instance profile is subsumed by the template profile
    Sub,
    /// Like `Sub`, but an instance with an empty profile always passes
    SubIfNotTop,
    /// Template profile is subsumed by the instance profile
    Super,
    /// Both profiles are equivalent
    Equivalent,
    /// Always accepted
    Any,
}

impl MappingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MappingKind::Sub => "sub",
            MappingKind::SubIfNotTop => "sub_if_not_top",
            MappingKind::Super => "super",
            MappingKind::Equivalent => "equivalent",
            MappingKind::Any => "any",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "sub" | "subclass" => Some(MappingKind::Sub),
            "sub_if_not_top" => Some(MappingKind::SubIfNotTop),
            "super" | "superclass" => Some(MappingKind::Super),
            "equivalent" | "equiv" | "eq" => Some(MappingKind::Equivalent),
            "any" => Some(MappingKind::Any),
            _ => None,
        }
    }
}

impl fmt::Display for MappingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pairing of instance individuals with template individuals.
///
/// Every instance individual considered by a match has an entry; optional
/// ones may map to nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping {
    pairs: IndexMap<Term, Option<Term>>,
    required: IndexSet<Term>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert_required(&mut self, instance: Term, template: Term) {
        self.required.insert(instance.clone());
        self.pairs.insert(instance, Some(template));
    }

    pub(crate) fn insert_optional(&mut self, instance: Term, template: Option<Term>) {
        self.pairs.insert(instance, template);
    }

    /// Template individual mapped to `instance`, if any
    pub fn get(&self, instance: &Term) -> Option<&Term> {
        self.pairs.get(instance).and_then(|t| t.as_ref())
    }

    pub fn contains(&self, instance: &Term) -> bool {
        self.pairs.contains_key(instance)
    }

    /// Whether `instance` was paired by the required phase
    pub fn is_required(&self, instance: &Term) -> bool {
        self.required.contains(instance)
    }

    /// All entries, unmapped ones included
    pub fn iter(&self) -> impl Iterator<Item = (&Term, Option<&Term>)> {
        self.pairs.iter().map(|(i, t)| (i, t.as_ref()))
    }

    /// Entries with a template individual
    pub fn mapped(&self) -> impl Iterator<Item = (&Term, &Term)> {
        self.pairs.iter().filter_map(|(i, t)| t.as_ref().map(|t| (i, t)))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Decides whether an instance individual may stand in for a template one
pub struct MappingValidator<'r, R: ReasonerFacade + ?Sized> {
    reasoner: &'r R,
    profiles: LocalProfileBuilder<'r, R>,
}

impl<'r, R: ReasonerFacade + ?Sized> MappingValidator<'r, R> {
    pub fn new(reasoner: &'r R) -> Self {
        MappingValidator {
            reasoner,
            profiles: LocalProfileBuilder::new(reasoner),
        }
    }

    /// Unknown individuals are never valid.
    pub fn is_valid(&self, instance: &Term, kind: MappingKind, template: &Term) -> bool {
        if kind == MappingKind::Any {
            return true;
        }

        match self.check(instance, kind, template) {
            Ok(valid) => {
                tracing::trace!(%instance, %template, %kind, valid, "mapping candidate");
                valid
            }
            Err(err) => {
                tracing::trace!(%instance, %template, %kind, error = %err, "mapping candidate unresolved");
                false
            }
        }
    }

    fn check(&self, instance: &Term, kind: MappingKind, template: &Term) -> Result<bool, ReasonerError> {
        let p = self.profiles.build(instance, kind != MappingKind::Super, false)?;
        let t = self.profiles.build(template, false, false)?;

        Ok(match kind {
            MappingKind::Sub => self.reasoner.is_sub_class_of(&p, &t),
            MappingKind::SubIfNotTop => p == ClassExpression::Top || self.reasoner.is_sub_class_of(&p, &t),
            MappingKind::Super => self.reasoner.is_sub_class_of(&t, &p),
            MappingKind::Equivalent => self.reasoner.is_equivalent_class(&p, &t),
            MappingKind::Any => true,
        })
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

    fn reasoner(ttl: &str) -> StoreReasoner {
        let input = format!("@prefix ex: <http://example.org/> .\n{}", ttl);
        StoreReasoner::new(parse_turtle(&input, None).unwrap())
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(MappingKind::from_str("SUB_IF_NOT_TOP"), Some(MappingKind::SubIfNotTop));
        assert_eq!(MappingKind::from_str("sub-if-not-top"), Some(MappingKind::SubIfNotTop));
        assert_eq!(MappingKind::from_str("equivalent"), Some(MappingKind::Equivalent));
        assert_eq!(MappingKind::from_str("sideways"), None);
        assert_eq!(MappingKind::Super.to_string(), "super");
        assert_eq!(serde_json::to_string(&MappingKind::SubIfNotTop).unwrap(), "\"sub_if_not_top\"");
    }

    #[test]
    fn test_validator_kinds() {
        let r = reasoner(r#"
            ex:Dog rdfs:subClassOf ex:Animal .
            ex:rex a ex:Dog .
            ex:tmpl a ex:Animal .
        "#);
        let v = MappingValidator::new(&r);

        assert!(v.is_valid(&ex("rex"), MappingKind::Sub, &ex("tmpl")));
        assert!(!v.is_valid(&ex("tmpl"), MappingKind::Sub, &ex("rex")));
        assert!(v.is_valid(&ex("tmpl"), MappingKind::Super, &ex("rex")));
        assert!(!v.is_valid(&ex("rex"), MappingKind::Equivalent, &ex("tmpl")));
        assert!(v.is_valid(&ex("rex"), MappingKind::Any, &ex("tmpl")));
    }

    #[test]
    fn test_sub_if_not_top_accepts_empty_profiles() {
        let store = parse_turtle(r#"
            @prefix ex: <http://example.org/> .
            ex:tmpl a ex:Animal .
            ex:x ex:p _:o, ex:named .
        "#, None).unwrap();
        let blank = store
            .objects(&ex("x"), "http://example.org/p")
            .find(|t| t.is_anonymous())
            .cloned()
            .unwrap();
        let r = StoreReasoner::new(store);
        let v = MappingValidator::new(&r);

        assert!(v.is_valid(&blank, MappingKind::SubIfNotTop, &ex("tmpl")));
        assert!(!v.is_valid(&blank, MappingKind::Sub, &ex("tmpl")));
        // A named individual always carries its identity, so it is never Top.
        assert!(!v.is_valid(&ex("named"), MappingKind::SubIfNotTop, &ex("tmpl")));
    }

    #[test]
    fn test_unknown_individual_is_invalid() {
        let r = reasoner("ex:tmpl a ex:Animal .");
        let v = MappingValidator::new(&r);
        assert!(!v.is_valid(&ex("ghost"), MappingKind::Sub, &ex("tmpl")));
        assert!(!v.is_valid(&ex("ghost"), MappingKind::SubIfNotTop, &ex("tmpl")));
    }

    #[test]
    fn test_mapping_accessors() {
        let mut mapping = Mapping::new();
        mapping.insert_required(ex("i1"), ex("t1"));
        mapping.insert_optional(ex("i2"), None);
        mapping.insert_optional(ex("i3"), Some(ex("t1")));

        assert_eq!(mapping.len(), 3);
        assert_eq!(mapping.get(&ex("i1")), Some(&ex("t1")));
        assert_eq!(mapping.get(&ex("i2")), None);
        assert!(mapping.contains(&ex("i2")));
        assert!(mapping.is_required(&ex("i1")));
        assert!(!mapping.is_required(&ex("i3")));
        assert_eq!(mapping.mapped().count(), 2);
    }
}
