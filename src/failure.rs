//! Validation failures
//!
//! A failed validation pass is a value, not an abort. [`ValidationFailure`]
//! names the phase that gave up, what went wrong in structured form, and a
//! human-readable explanation assembled while unwinding class definitions.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::reasoner::ReasonerError;
use crate::term::Term;

// ============================================================================
// Stage
// ============================================================================

/// Phase of a validation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    ResourceCheck,
    GraphSelection,
    SubjectMapping,
    ObjectMapping,
    Restriction,
    Consistency,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::ResourceCheck => "resource_check",
            Stage::GraphSelection => "graph_selection",
            Stage::SubjectMapping => "subject_mapping",
            Stage::ObjectMapping => "object_mapping",
            Stage::Restriction => "restriction",
            Stage::Consistency => "consistency",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Failure kinds
// ============================================================================

/// Property restriction that was violated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestrictionKind {
    SomeValuesFrom,
    AllValuesFrom,
    MinCardinality,
    MaxCardinality,
    ExactCardinality,
    HasSelf,
}

impl RestrictionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RestrictionKind::SomeValuesFrom => "some_values_from",
            RestrictionKind::AllValuesFrom => "all_values_from",
            RestrictionKind::MinCardinality => "min_cardinality",
            RestrictionKind::MaxCardinality => "max_cardinality",
            RestrictionKind::ExactCardinality => "exact_cardinality",
            RestrictionKind::HasSelf => "has_self",
        }
    }
}

impl fmt::Display for RestrictionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FailureKind {
    /// No required pairing of individuals exists
    StructuralMapping,
    /// Resource identifiers differ under strict checking, or the resources
    /// do not map
    ResourceMismatch,
    /// A document declares no graph to match
    MissingGraph,
    RestrictionViolation {
        restriction: RestrictionKind,
        property: Term,
        expected: usize,
        observed: usize,
        /// Failure of the filler that made the restriction fail
        cause: Option<Box<ValidationFailure>>,
    },
    /// Every branch of a union failed
    UnionExhausted { branches: Vec<ValidationFailure> },
    /// The individual belongs to a complement's argument
    ComplementViolation,
    /// The individual is not a member of a primitive class
    NotAMember,
    /// Translation against the empty class
    Unsatisfiable,
    UnknownIndividual,
    Inconsistent(String),
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::StructuralMapping => "structural_mapping",
            FailureKind::ResourceMismatch => "resource_mismatch",
            FailureKind::MissingGraph => "missing_graph",
            FailureKind::RestrictionViolation { .. } => "restriction_violation",
            FailureKind::UnionExhausted { .. } => "union_exhausted",
            FailureKind::ComplementViolation => "complement_violation",
            FailureKind::NotAMember => "not_a_member",
            FailureKind::Unsatisfiable => "unsatisfiable",
            FailureKind::UnknownIndividual => "unknown_individual",
            FailureKind::Inconsistent(_) => "inconsistent",
        }
    }
}

impl From<ReasonerError> for FailureKind {
    fn from(err: ReasonerError) -> Self {
        match err {
            ReasonerError::UnknownIndividual(_) => FailureKind::UnknownIndividual,
            ReasonerError::Inconsistent(reason) => FailureKind::Inconsistent(reason),
        }
    }
}

// ============================================================================
// ValidationFailure
// ============================================================================

/// Why a validation pass or a translation was rejected
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{stage} failure: {explanation}")]
pub struct ValidationFailure {
    pub stage: Stage,
    pub kind: FailureKind,
    /// Individual being checked, where one applies
    pub individual: Option<Term>,
    /// Innermost class being expanded when the failure occurred
    pub class: Option<Term>,
    pub explanation: String,
}

impl ValidationFailure {
    pub fn new(stage: Stage, kind: FailureKind, explanation: impl Into<String>) -> Self {
        ValidationFailure {
            stage,
            kind,
            individual: None,
            class: None,
            explanation: explanation.into(),
        }
    }

    /// Failure for a reasoner error met during `stage`
    pub fn reasoner(stage: Stage, err: ReasonerError) -> Self {
        let explanation = err.to_string();
        Self::new(stage, err.into(), explanation)
    }

    pub fn structural_mapping(stage: Stage, explanation: impl Into<String>) -> Self {
        Self::new(stage, FailureKind::StructuralMapping, explanation)
    }

    pub fn with_individual(mut self, individual: &Term) -> Self {
        self.individual = Some(individual.clone());
        self
    }

    pub fn with_class(mut self, class: Option<&Term>) -> Self {
        self.class = class.cloned();
        self
    }

    /// Move the failure to another stage, keeping its detail
    pub fn at_stage(mut self, stage: Stage) -> Self {
        self.stage = stage;
        self
    }

    /// Property named by a restriction violation
    pub fn property(&self) -> Option<&Term> {
        match &self.kind {
            FailureKind::RestrictionViolation { property, .. } => Some(property),
            _ => None,
        }
    }

    /// Structured form, nested causes and branches included
    pub fn to_json(&self) -> Value {
        let mut value = json!({
            "stage": self.stage.as_str(),
            "kind": self.kind.as_str(),
            "explanation": self.explanation,
        });

        if let Some(ref individual) = self.individual {
            value["individual"] = json!(individual.to_string());
        }
        if let Some(ref class) = self.class {
            value["class"] = json!(class.to_string());
        }

        match &self.kind {
            FailureKind::RestrictionViolation {
                restriction,
                property,
                expected,
                observed,
                cause,
            } => {
                value["restriction"] = json!(restriction.as_str());
                value["property"] = json!(property.to_string());
                value["expected"] = json!(expected);
                value["observed"] = json!(observed);
                if let Some(cause) = cause {
                    value["cause"] = cause.to_json();
                }
            }
            FailureKind::UnionExhausted { branches } => {
                value["branches"] = Value::Array(branches.iter().map(|b| b.to_json()).collect());
            }
            FailureKind::Inconsistent(reason) => {
                value["reason"] = json!(reason);
            }
            _ => {}
        }

        value
    }
}
