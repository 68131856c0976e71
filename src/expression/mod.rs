//! Class expressions
//!
//! A [`ClassExpression`] is a structural description of a set of
//! individuals: a named class, a boolean combination, or a restriction on a
//! property. Expressions are read from OWL ontologies ([`ClassExpression::from_rdf`])
//! or synthesized from an individual's local facts ([`crate::profile`]).

use std::fmt;

use crate::core::ns;
use crate::term::Term;

mod rdf;

/// A class expression
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClassExpression {
    /// Top class (owl:Thing) - everything
    Top,
    /// Bottom class (owl:Nothing) - nothing
    Bottom,
    /// Named class, or an anonymous class node with no readable structure
    Class(Term),
    /// Intersection
    And(Vec<ClassExpression>),
    /// Union
    Or(Vec<ClassExpression>),
    /// Complement
    Not(Box<ClassExpression>),
    /// Existential restriction (p some C)
    SomeValuesFrom(Term, Box<ClassExpression>),
    /// Universal restriction (p only C)
    AllValuesFrom(Term, Box<ClassExpression>),
    /// At-least restriction (p min n)
    MinCardinality(Term, usize),
    /// At-most restriction (p max n)
    MaxCardinality(Term, usize),
    /// Exact restriction (p exactly n)
    ExactCardinality(Term, usize),
    /// Local reflexivity (p Self)
    HasSelf(Term),
    /// Value restriction (p value v)
    HasValue(Term, Term),
    /// Singleton class {a}
    Nominal(Term),
}

impl ClassExpression {
    pub fn named(iri: &str) -> Self {
        match iri {
            ns::owl::THING => ClassExpression::Top,
            ns::owl::NOTHING => ClassExpression::Bottom,
            _ => ClassExpression::Class(Term::uri(iri)),
        }
    }

    /// Intersection of `conjuncts`.
    ///
    /// Duplicates and `Top` are removed; no conjuncts left is `Top`, one
    /// conjunct is returned as is.
    pub fn and(conjuncts: impl IntoIterator<Item = ClassExpression>) -> Self {
        let mut kept: Vec<ClassExpression> = Vec::new();
        for c in conjuncts {
            if !c.is_top() && !kept.contains(&c) {
                kept.push(c);
            }
        }

        match kept.len() {
            0 => ClassExpression::Top,
            1 => kept.remove(0),
            _ => ClassExpression::And(kept),
        }
    }

    /// Union of `disjuncts`. No disjuncts is `Bottom`, one is returned as is.
    pub fn or(disjuncts: impl IntoIterator<Item = ClassExpression>) -> Self {
        let mut kept: Vec<ClassExpression> = Vec::new();
        for c in disjuncts {
            if !kept.contains(&c) {
                kept.push(c);
            }
        }

        match kept.len() {
            0 => ClassExpression::Bottom,
            1 => kept.remove(0),
            _ => ClassExpression::Or(kept),
        }
    }

    pub fn not(c: ClassExpression) -> Self {
        ClassExpression::Not(Box::new(c))
    }

    pub fn some(property: Term, filler: ClassExpression) -> Self {
        ClassExpression::SomeValuesFrom(property, Box::new(filler))
    }

    pub fn only(property: Term, filler: ClassExpression) -> Self {
        ClassExpression::AllValuesFrom(property, Box::new(filler))
    }

    pub fn is_top(&self) -> bool {
        matches!(self, ClassExpression::Top)
    }

    /// The class identifier, for named (or bnode-identified) classes
    pub fn class_id(&self) -> Option<&Term> {
        match self {
            ClassExpression::Class(id) => Some(id),
            _ => None,
        }
    }

    /// The restricted property, for restriction variants
    pub fn property(&self) -> Option<&Term> {
        match self {
            ClassExpression::SomeValuesFrom(p, _)
            | ClassExpression::AllValuesFrom(p, _)
            | ClassExpression::MinCardinality(p, _)
            | ClassExpression::MaxCardinality(p, _)
            | ClassExpression::ExactCardinality(p, _)
            | ClassExpression::HasSelf(p)
            | ClassExpression::HasValue(p, _) => Some(p),
            _ => None,
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[ClassExpression], sep: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, " {} ", sep)?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, ")")
}

/// Manchester-like rendering for explanations
impl fmt::Display for ClassExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassExpression::Top => write!(f, "Thing"),
            ClassExpression::Bottom => write!(f, "Nothing"),
            ClassExpression::Class(id) => write!(f, "{}", id.short_name()),
            ClassExpression::And(cs) => write_joined(f, cs, "and"),
            ClassExpression::Or(cs) => write_joined(f, cs, "or"),
            ClassExpression::Not(c) => write!(f, "not {}", c),
            ClassExpression::SomeValuesFrom(p, c) => write!(f, "({} some {})", p.short_name(), c),
            ClassExpression::AllValuesFrom(p, c) => write!(f, "({} only {})", p.short_name(), c),
            ClassExpression::MinCardinality(p, n) => write!(f, "({} min {})", p.short_name(), n),
            ClassExpression::MaxCardinality(p, n) => write!(f, "({} max {})", p.short_name(), n),
            ClassExpression::ExactCardinality(p, n) => write!(f, "({} exactly {})", p.short_name(), n),
            ClassExpression::HasSelf(p) => write!(f, "({} Self)", p.short_name()),
            ClassExpression::HasValue(p, v) => write!(f, "({} value {})", p.short_name(), v.short_name()),
            ClassExpression::Nominal(a) => write!(f, "{{{}}}", a.short_name()),
        }
    }
}
