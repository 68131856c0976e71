//! Validation of an instance document against a template document
//!
//! One pass runs inside a single reasoner import scope holding both
//! documents:
//!
//! 1. consistency of the combined knowledge base
//! 2. resource check: the instance resource maps to the template resource
//! 3. graph selection: the first template graph whose subjects map wins
//! 4. subject mapping and translation
//! 5. object mapping and translation, per mapped subject
//! 6. commit: translated statements are merged into the instance document
//!
//! Translation results are memoized for the whole pass; nothing survives it.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{individuals, is_reserved, ProtocolDocument};
use crate::core::ns;
use crate::expression::ClassExpression;
use crate::failure::{FailureKind, Stage, ValidationFailure};
use crate::mapping::{Mapping, MappingKind, MappingValidator, StructuralMatcher};
use crate::profile::LocalProfileBuilder;
use crate::reasoner::{with_imported_documents, ReasonerError, ReasonerFacade};
use crate::store::Store;
use crate::term::{Term, Triple};
use crate::translate::{StatementSet, Translator};

// ============================================================================
// Options and results
// ============================================================================

/// Per-call switches of a validation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    pub resource_kind: MappingKind,
    pub subject_kind: MappingKind,
    pub object_kind: MappingKind,
    /// Translate mapped subjects and objects into the template vocabulary
    pub translate: bool,
    /// Copy template literal values missing on the instance
    pub closed_world_defaults: bool,
    /// Require identical resource identifiers
    pub strict_resource: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        ValidationOptions {
            resource_kind: MappingKind::SubIfNotTop,
            subject_kind: MappingKind::Sub,
            object_kind: MappingKind::SubIfNotTop,
            translate: true,
            closed_world_defaults: true,
            strict_resource: false,
        }
    }
}

/// Phases of a validation pass, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    ResourceCheck,
    GraphSelection,
    SubjectMapping,
    ObjectMapping,
    TranslationCommit,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::ResourceCheck => "resource_check",
            Phase::GraphSelection => "graph_selection",
            Phase::SubjectMapping => "subject_mapping",
            Phase::ObjectMapping => "object_mapping",
            Phase::TranslationCommit => "translation_commit",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An accepted instance document
#[derive(Debug, Clone)]
pub struct TranslatedDocument {
    /// Instance statements plus back-filled defaults and `translated`
    pub document: Store,
    /// Statements produced by translation and type copy
    pub translated: StatementSet,
    /// Template graph the instance matched
    pub graph: Term,
    pub subject_mapping: Mapping,
    /// Object mapping of every instance subject whose objects validated
    pub object_mappings: IndexMap<Term, Mapping>,
}

/// Terminal state of a validation pass
#[derive(Debug, Clone)]
pub enum Outcome {
    Accepted(TranslatedDocument),
    Rejected(ValidationFailure),
}

impl Outcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted(_))
    }

    pub fn into_result(self) -> Result<TranslatedDocument, ValidationFailure> {
        match self {
            Outcome::Accepted(doc) => Ok(doc),
            Outcome::Rejected(failure) => Err(failure),
        }
    }
}

impl From<Result<TranslatedDocument, ValidationFailure>> for Outcome {
    fn from(result: Result<TranslatedDocument, ValidationFailure>) -> Self {
        match result {
            Ok(doc) => Outcome::Accepted(doc),
            Err(failure) => Outcome::Rejected(failure),
        }
    }
}

// ============================================================================
// Validator
// ============================================================================

/// Validates instance documents against template documents
pub struct ProtocolValidator<'r, R: ReasonerFacade + ?Sized> {
    reasoner: &'r R,
}

/// State owned by one pass
struct Pass<'a, 'r, R: ReasonerFacade + ?Sized> {
    instance: &'a ProtocolDocument,
    template: &'a ProtocolDocument,
    options: &'a ValidationOptions,
    validator: MappingValidator<'r, R>,
    profiles: LocalProfileBuilder<'r, R>,
    translator: Translator<'r, R>,
    defaults: StatementSet,
    translated: StatementSet,
}

impl<'r, R: ReasonerFacade + ?Sized> ProtocolValidator<'r, R> {
    pub fn new(reasoner: &'r R) -> Self {
        ProtocolValidator { reasoner }
    }

    /// Validate `instance` against `template` and translate it into the
    /// template's vocabulary.
    pub fn validate_against_template(
        &self,
        instance: &ProtocolDocument,
        template: &ProtocolDocument,
        options: &ValidationOptions,
    ) -> Result<TranslatedDocument, ValidationFailure> {
        tracing::debug!(
            instance = %instance.resource().individual,
            template = %template.resource().individual,
            ?options,
            "validating against template"
        );

        let documents = [instance.store(), template.store()];
        let result = with_imported_documents(self.reasoner, &documents, || -> Result<_, ValidationFailure> {
            self.reasoner.check_consistency().map_err(|err| ValidationFailure::reasoner(Stage::Consistency, err))?;

            let mut pass = Pass {
                instance,
                template,
                options,
                validator: MappingValidator::new(self.reasoner),
                profiles: LocalProfileBuilder::new(self.reasoner),
                translator: Translator::new(self.reasoner),
                defaults: StatementSet::new(),
                translated: StatementSet::new(),
            };
            pass.run()
        });

        match &result {
            Ok(doc) => tracing::debug!(
                graph = %doc.graph,
                translated = doc.translated.len(),
                "accepted"
            ),
            Err(failure) => tracing::debug!(stage = %failure.stage, %failure, "rejected"),
        }
        result
    }

    /// State-machine view of [`Self::validate_against_template`]
    pub fn validate(
        &self,
        instance: &ProtocolDocument,
        template: &ProtocolDocument,
        options: &ValidationOptions,
    ) -> Outcome {
        self.validate_against_template(instance, template, options).into()
    }
}

impl<'a, 'r, R: ReasonerFacade + ?Sized> Pass<'a, 'r, R> {
    fn run(&mut self) -> Result<TranslatedDocument, ValidationFailure> {
        self.check_resource()?;

        tracing::debug!(phase = %Phase::GraphSelection, "entering phase");
        let instance_graphs = self.instance.graphs();
        let Some(instance_graph) = instance_graphs.first() else {
            return Err(missing_graph("instance declares no graph"));
        };
        if instance_graphs.len() > 1 {
            tracing::warn!(
                graphs = instance_graphs.len(),
                graph = %instance_graph.individual,
                "instance declares several graphs, using the first"
            );
        }

        let template_graphs = self.template.graphs();
        if template_graphs.is_empty() {
            return Err(missing_graph("template declares no graph"));
        }

        let mut last_failure = None;
        for template_graph in &template_graphs {
            let graph = &template_graph.individual;
            let start = (self.defaults.len(), self.translated.len());

            match self.match_subjects(&instance_graph.individual, graph) {
                Ok(subjects) => {
                    tracing::debug!(%graph, "template graph matched");
                    return self.match_objects(graph, subjects);
                }
                Err(failure) => {
                    tracing::debug!(%graph, %failure, "template graph rejected");
                    self.defaults.truncate(start.0);
                    self.translated.truncate(start.1);
                    last_failure = Some(failure);
                }
            }
        }

        Err(last_failure.unwrap_or_else(|| missing_graph("no template graph matched")))
    }

    fn check_resource(&mut self) -> Result<(), ValidationFailure> {
        tracing::debug!(phase = %Phase::ResourceCheck, "entering phase");
        let instance = self.instance.resource().individual;
        let template = self.template.resource().individual;

        if instance != template {
            if self.options.strict_resource {
                return Err(ValidationFailure::new(
                    Stage::ResourceCheck,
                    FailureKind::ResourceMismatch,
                    format!("instance resource {} is not {}", instance, template),
                )
                .with_individual(&instance));
            }
            tracing::warn!(%instance, %template, "resource identifiers differ");
        }

        if !self.validator.is_valid(&instance, self.options.resource_kind, &template) {
            return Err(ValidationFailure::new(
                Stage::ResourceCheck,
                FailureKind::ResourceMismatch,
                format!(
                    "instance resource {} does not map to {} under {}",
                    instance.short_name(),
                    template.short_name(),
                    self.options.resource_kind
                ),
            )
            .with_individual(&instance));
        }

        if self.options.closed_world_defaults {
            self.back_fill(&instance, &template);
        }
        Ok(())
    }

    fn match_subjects(&mut self, instance_graph: &Term, template_graph: &Term) -> Result<Mapping, ValidationFailure> {
        tracing::debug!(phase = %Phase::SubjectMapping, graph = %template_graph, "entering phase");
        let instances = individuals(&self.instance.subjects(instance_graph));
        let templates = individuals(&self.template.subjects(template_graph));

        let kind = self.options.subject_kind;
        let validator = &self.validator;
        let mapping = StructuralMatcher::find_mapping(&instances, &templates, |i, t| validator.is_valid(i, kind, t))
            .ok_or_else(|| {
                ValidationFailure::structural_mapping(
                    Stage::SubjectMapping,
                    format!(
                        "no valid subject mapping from {} instance to {} template subjects under {}",
                        instances.len(),
                        templates.len(),
                        kind
                    ),
                )
            })?;

        let pairs: Vec<(Term, Term)> = mapping.mapped().map(|(i, t)| (i.clone(), t.clone())).collect();
        for (instance, template) in &pairs {
            let checkpoint = self.defaults.len();
            if self.options.closed_world_defaults {
                self.back_fill(instance, template);
            }
            if !self.options.translate {
                continue;
            }

            match self.translate(instance, template) {
                Ok(statements) => self.translated.extend(statements),
                Err(failure) if mapping.is_required(instance) => return Err(failure),
                Err(failure) => {
                    tracing::debug!(%instance, %template, %failure, "optional subject skipped");
                    self.defaults.truncate(checkpoint);
                }
            }
        }

        Ok(mapping)
    }

    fn match_objects(&mut self, graph: &Term, subject_mapping: Mapping) -> Result<TranslatedDocument, ValidationFailure> {
        tracing::debug!(phase = %Phase::ObjectMapping, "entering phase");
        let mut object_mappings = IndexMap::new();
        let mut last_failure = None;

        let pairs: Vec<(Term, Term)> = subject_mapping
            .mapped()
            .map(|(i, t)| (i.clone(), t.clone()))
            .collect();
        for (instance, template) in &pairs {
            let checkpoint = self.defaults.len();
            match self.match_subject_objects(instance, template) {
                Ok((mapping, statements)) => {
                    self.translated.extend(statements);
                    object_mappings.insert(instance.clone(), mapping);
                }
                Err(failure) => {
                    tracing::debug!(subject = %instance, %failure, "object mapping failed");
                    self.defaults.truncate(checkpoint);
                    last_failure = Some(failure);
                }
            }
        }

        if object_mappings.is_empty() {
            if let Some(failure) = last_failure {
                return Err(failure);
            }
        }

        self.commit(graph, subject_mapping, object_mappings)
    }

    /// Object mapping and translation for one subject pair. The returned
    /// statements are committed only if every mapped object passes. Defaults
    /// are back-filled as objects are visited; on failure the caller
    /// truncates them to its checkpoint.
    fn match_subject_objects(
        &mut self,
        subject: &Term,
        template_subject: &Term,
    ) -> Result<(Mapping, StatementSet), ValidationFailure> {
        let instances = individuals(&self.instance.objects(subject));
        let templates = individuals(&self.template.objects(template_subject));

        let kind = self.options.object_kind;
        let validator = &self.validator;
        let mapping = StructuralMatcher::find_mapping(&instances, &templates, |i, t| validator.is_valid(i, kind, t))
            .ok_or_else(|| {
                ValidationFailure::structural_mapping(
                    Stage::ObjectMapping,
                    format!("no valid object mapping for subject {} under {}", subject.short_name(), kind),
                )
                .with_individual(subject)
            })?;

        let mut statements = StatementSet::new();
        let pairs: Vec<(Term, Term)> = mapping.mapped().map(|(i, t)| (i.clone(), t.clone())).collect();
        for (object, template) in &pairs {
            if self.options.closed_world_defaults {
                self.back_fill(object, template);
            }
            if !self.options.translate {
                continue;
            }

            if self.has_concrete_type(object)? {
                statements.extend(self.translate(object, template)?);
            } else {
                statements.extend(self.copy_types(object, template));
            }
        }

        Ok((mapping, statements))
    }

    fn commit(
        &mut self,
        graph: &Term,
        subject_mapping: Mapping,
        object_mappings: IndexMap<Term, Mapping>,
    ) -> Result<TranslatedDocument, ValidationFailure> {
        tracing::debug!(
            phase = %Phase::TranslationCommit,
            defaults = self.defaults.len(),
            translated = self.translated.len(),
            "entering phase"
        );

        let mut document = self.instance.store().clone();
        document.add_all(self.defaults.iter().cloned());
        document.add_all(self.translated.iter().cloned());

        let stats = self.translator.cache().stats();
        tracing::trace!(hits = stats.hits, misses = stats.misses, cycles = stats.cycles, "translation cache");

        Ok(TranslatedDocument {
            document,
            translated: std::mem::take(&mut self.translated),
            graph: graph.clone(),
            subject_mapping,
            object_mappings,
        })
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Translate `instance` against the types asserted for `template`
    fn translate(&mut self, instance: &Term, template: &Term) -> Result<StatementSet, ValidationFailure> {
        let target = self
            .profiles
            .type_profile(template)
            .map_err(|err| reasoner_failure(err, template))?;
        tracing::trace!(%instance, %target, "translating");
        self.translator.translate(&target, instance)
    }

    fn has_concrete_type(&self, individual: &Term) -> Result<bool, ValidationFailure> {
        let profile = self
            .profiles
            .type_profile(individual)
            .map_err(|err| reasoner_failure(err, individual))?;
        Ok(profile != ClassExpression::Top)
    }

    /// Type statements giving `object` the template object's types
    fn copy_types(&self, object: &Term, template: &Term) -> StatementSet {
        let types = self
            .template
            .store()
            .types(template)
            .filter(|t| !is_reserved(t) && *t != template)
            .map(|t| Triple::new(object.clone(), Term::uri(ns::rdf::TYPE), t.clone()))
            .collect::<StatementSet>();
        if !types.is_empty() {
            tracing::trace!(%object, types = types.len(), "copied template types");
        }
        types
    }

    /// Literal values of `template` for properties `instance` has no value for
    fn back_fill(&mut self, instance: &Term, template: &Term) {
        let instance_store = self.instance.store();
        for (property, value) in self.template.store().outgoing(template) {
            if !matches!(value, Term::Literal(_)) || is_reserved(property) {
                continue;
            }
            let Some(p) = property.as_uri() else {
                continue;
            };
            if instance_store.object(instance, p.as_str()).is_some() {
                continue;
            }

            let triple = Triple::new(instance.clone(), property.clone(), value.clone());
            if self.defaults.insert(triple) {
                tracing::trace!(%instance, %property, %value, "default value");
            }
        }
    }
}

fn missing_graph(explanation: &str) -> ValidationFailure {
    ValidationFailure::new(Stage::GraphSelection, FailureKind::MissingGraph, explanation)
}

fn reasoner_failure(err: ReasonerError, individual: &Term) -> ValidationFailure {
    ValidationFailure::reasoner(Stage::Restriction, err).with_individual(individual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::RestrictionKind;
    use crate::reasoner::StoreReasoner;

    const PREFIXES: &str = r#"
        @prefix ex: <http://example.org/> .
        @prefix t: <http://example.org/template/> .
        @prefix i: <http://example.org/instance/> .
    "#;

    fn ex(local: &str) -> Term {
        Term::uri(format!("http://example.org/{}", local))
    }

    fn i(local: &str) -> Term {
        Term::uri(format!("http://example.org/instance/{}", local))
    }

    fn doc(ttl: &str) -> ProtocolDocument {
        ProtocolDocument::from_turtle(&format!("{}{}", PREFIXES, ttl), None).unwrap()
    }

    fn rdf_type(s: Term, class: &str) -> Triple {
        Triple::new(s, Term::uri(ns::rdf::TYPE), ex(class))
    }

    const MIN_INPUT_TEMPLATE: &str = r#"
        ex:Process rdfs:subClassOf [ a owl:Restriction ;
            owl:onProperty ex:hasInput ; owl:minCardinality 1 ] .
        t:resource a rdg:Resource ; rdg:hasGraph t:graph .
        t:graph a rdg:Graph ; rdg:hasSubject t:step .
        t:step a rdg:Subject, ex:Process .
    "#;

    fn validate(instance: &ProtocolDocument, template: &ProtocolDocument, options: &ValidationOptions) -> Outcome {
        let reasoner = StoreReasoner::new(Store::new());
        ProtocolValidator::new(&reasoner).validate(instance, template, options)
    }

    #[test]
    fn test_min_cardinality_accepted() {
        let template = doc(MIN_INPUT_TEMPLATE);
        let instance = doc(r#"
            i:resource a rdg:Resource ; rdg:hasGraph i:graph .
            i:graph rdg:hasSubject i:run .
            i:run a ex:Process ; ex:hasInput i:d1, i:d2 .
        "#);

        let outcome = validate(&instance, &template, &ValidationOptions::default());
        assert!(outcome.is_accepted());
        let translated = outcome.into_result().unwrap();

        let has_input = |d: &str| Triple::new(i("run"), ex("hasInput"), i(d));
        assert!(translated.translated.contains(&has_input("d1")));
        assert!(translated.translated.contains(&has_input("d2")));
        assert!(translated.translated.contains(&rdf_type(i("run"), "Process")));
        assert!(translated.document.contains(&has_input("d1")));
        assert_eq!(translated.graph, Term::uri("http://example.org/template/graph"));
        assert_eq!(
            translated.subject_mapping.get(&i("run")),
            Some(&Term::uri("http://example.org/template/step"))
        );
        assert!(translated.object_mappings.contains_key(&i("run")));
    }

    #[test]
    fn test_min_cardinality_rejected() {
        let template = doc(MIN_INPUT_TEMPLATE);
        let instance = doc(r#"
            i:resource a rdg:Resource ; rdg:hasGraph i:graph .
            i:graph rdg:hasSubject i:run .
            i:run a ex:Process .
        "#);

        let failure = validate(&instance, &template, &ValidationOptions::default())
            .into_result()
            .unwrap_err();
        assert_eq!(failure.stage, Stage::Restriction);
        assert_eq!(
            failure.kind,
            FailureKind::RestrictionViolation {
                restriction: RestrictionKind::MinCardinality,
                property: ex("hasInput"),
                expected: 1,
                observed: 0,
                cause: None,
            }
        );
        assert_eq!(failure.class, Some(ex("Process")));
    }

    #[test]
    fn test_union_fallback() {
        let template = doc(r#"
            ex:Step owl:equivalentClass [ a owl:Class ; owl:unionOf ( ex:TypeA ex:TypeB ) ] .
            t:resource a rdg:Resource ; rdg:hasGraph t:graph .
            t:graph rdg:hasSubject t:step .
            t:step a ex:Step .
        "#);
        let options = ValidationOptions {
            subject_kind: MappingKind::Any,
            ..ValidationOptions::default()
        };

        let accepted = doc(r#"
            i:resource a rdg:Resource ; rdg:hasGraph i:graph .
            i:graph rdg:hasSubject i:run .
            i:run a ex:TypeB .
        "#);
        let translated = validate(&accepted, &template, &options).into_result().unwrap();
        assert!(translated.translated.contains(&rdf_type(i("run"), "Step")));
        assert!(translated.translated.contains(&rdf_type(i("run"), "TypeB")));

        let rejected = doc(r#"
            i:resource a rdg:Resource ; rdg:hasGraph i:graph .
            i:graph rdg:hasSubject i:run .
            i:run a ex:TypeC .
        "#);
        let failure = validate(&rejected, &template, &options).into_result().unwrap_err();
        match &failure.kind {
            FailureKind::UnionExhausted { branches } => {
                assert_eq!(branches.len(), 2);
                assert_eq!(branches[0].class, Some(ex("TypeA")));
                assert_eq!(branches[1].class, Some(ex("TypeB")));
            }
            other => panic!("unexpected failure {:?}", other),
        }
        assert_eq!(failure.class, Some(ex("Step")));
    }

    #[test]
    fn test_resource_checks() {
        let template = doc(r#"
            t:resource a rdg:Resource, ex:Catalog ; rdg:hasGraph t:graph .
            t:graph rdg:hasSubject t:step .
        "#);
        let instance = doc(r#"
            i:resource a rdg:Resource ; rdg:hasGraph i:graph .
            i:graph rdg:hasSubject i:run .
            i:run ex:p i:x .
        "#);

        let strict = ValidationOptions {
            strict_resource: true,
            resource_kind: MappingKind::Any,
            ..ValidationOptions::default()
        };
        let failure = validate(&instance, &template, &strict).into_result().unwrap_err();
        assert_eq!((failure.stage, failure.kind), (Stage::ResourceCheck, FailureKind::ResourceMismatch));

        let failure = validate(&instance, &template, &ValidationOptions::default())
            .into_result()
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::ResourceMismatch);
        assert!(failure.explanation.contains("sub_if_not_top"));
    }

    #[test]
    fn test_missing_graph() {
        let template = doc(MIN_INPUT_TEMPLATE);
        let instance = doc("i:resource a rdg:Resource .");

        let failure = validate(&instance, &template, &ValidationOptions::default())
            .into_result()
            .unwrap_err();
        assert_eq!((failure.stage, failure.kind), (Stage::GraphSelection, FailureKind::MissingGraph));
    }

    #[test]
    fn test_inconsistent_knowledge_base() {
        let template = doc(&format!("ex:Process owl:disjointWith ex:Data .\n{}", MIN_INPUT_TEMPLATE));
        let instance = doc(r#"
            i:resource a rdg:Resource ; rdg:hasGraph i:graph .
            i:graph rdg:hasSubject i:run .
            i:run a ex:Process, ex:Data ; ex:hasInput i:d1 .
        "#);

        let failure = validate(&instance, &template, &ValidationOptions::default())
            .into_result()
            .unwrap_err();
        assert_eq!(failure.stage, Stage::Consistency);
        assert!(matches!(failure.kind, FailureKind::Inconsistent(_)));
    }

    #[test]
    fn test_second_template_graph_matches() {
        let template = doc(r#"
            t:resource a rdg:Resource ; rdg:hasGraph t:strict, t:loose .
            t:strict rdg:hasSubject t:a, t:b .
            t:loose rdg:hasSubject t:c .
            t:c a ex:Process .
        "#);
        let instance = doc(r#"
            i:resource a rdg:Resource ; rdg:hasGraph i:graph .
            i:graph rdg:hasSubject i:run .
            i:run a ex:Process .
        "#);

        let translated = validate(&instance, &template, &ValidationOptions::default())
            .into_result()
            .unwrap();
        assert_eq!(translated.graph, Term::uri("http://example.org/template/loose"));
    }

    #[test]
    fn test_objects_translated_and_typed() {
        let template = doc(r#"
            t:resource a rdg:Resource ; rdg:hasGraph t:graph .
            t:graph rdg:hasSubject t:step .
            t:step a ex:Process ; ex:hasInput t:input .
            t:input a ex:Data ; ex:format "csv" .
        "#);
        let instance = doc(r#"
            i:resource a rdg:Resource ; rdg:hasGraph i:graph .
            i:graph rdg:hasSubject i:run .
            i:run a ex:Process ; ex:hasInput [], i:typed .
            i:typed a ex:Data ; ex:format "tsv" .
        "#);

        let translated = validate(&instance, &template, &ValidationOptions::default())
            .into_result()
            .unwrap();
        let objects = &translated.object_mappings[&i("run")];
        assert_eq!(objects.len(), 2);
        assert!(objects.mapped().all(|(_, t)| *t == Term::uri("http://example.org/template/input")));

        let blank = objects
            .iter()
            .map(|(o, _)| o.clone())
            .find(|o| o.is_anonymous())
            .unwrap();
        // Untyped object: template type copied, default format filled in
        assert!(translated.translated.contains(&rdf_type(blank.clone(), "Data")));
        assert!(translated
            .document
            .contains(&Triple::new(blank.clone(), ex("format"), Term::literal("csv"))));
        // Typed object: translated, own format kept
        assert!(translated.translated.contains(&rdf_type(i("typed"), "Data")));
        assert!(!translated
            .document
            .contains(&Triple::new(i("typed"), ex("format"), Term::literal("csv"))));
    }

    #[test]
    fn test_failed_subject_keeps_no_defaults() {
        let template = doc(r#"
            ex:Report rdfs:subClassOf [ a owl:Restriction ;
                owl:onProperty ex:hasPart ; owl:minCardinality 1 ] .
            t:resource a rdg:Resource ; rdg:hasGraph t:graph .
            t:graph rdg:hasSubject t:step .
            t:step a ex:Process ; ex:hasInput t:input ; ex:hasOutput t:out .
            t:input ex:format "csv" .
            t:out a ex:Report .
        "#);
        let instance = doc(r#"
            i:resource a rdg:Resource ; rdg:hasGraph i:graph .
            i:graph rdg:hasSubject i:run1, i:run2 .
            i:run1 a ex:Process ; ex:hasInput i:in1 ; ex:hasOutput i:r1 .
            i:r1 a ex:Report .
            i:run2 a ex:Process ; ex:hasInput i:in2 ; ex:hasOutput i:r2 .
            i:r2 a ex:Report ; ex:hasPart i:p .
        "#);
        let options = ValidationOptions {
            subject_kind: MappingKind::Any,
            object_kind: MappingKind::Any,
            ..ValidationOptions::default()
        };

        let translated = validate(&instance, &template, &options).into_result().unwrap();
        assert_eq!(translated.subject_mapping.mapped().count(), 2);
        assert!(!translated.object_mappings.contains_key(&i("run1")));
        assert!(translated.object_mappings.contains_key(&i("run2")));

        // run1's output fails, so its input's default is rolled back
        let csv = |object: Term| Triple::new(object, ex("format"), Term::literal("csv"));
        assert!(!translated.document.contains(&csv(i("in1"))));
        assert!(translated.document.contains(&csv(i("in2"))));
    }

    #[test]
    fn test_skipped_optional_subject_keeps_no_defaults() {
        let template = doc(r#"
            t:resource a rdg:Resource ; rdg:hasGraph t:graph .
            t:graph rdg:hasSubject t:step .
            t:step a ex:Process ; ex:label "step" .
        "#);
        let instance = doc(r#"
            i:resource a rdg:Resource ; rdg:hasGraph i:graph .
            i:graph rdg:hasSubject i:run, i:other .
            i:run a ex:Process .
            i:other a ex:Other .
        "#);
        let options = ValidationOptions {
            subject_kind: MappingKind::Any,
            ..ValidationOptions::default()
        };

        let translated = validate(&instance, &template, &options).into_result().unwrap();
        assert!(translated.subject_mapping.is_required(&i("run")));
        assert!(!translated.subject_mapping.is_required(&i("other")));

        let label = |subject: Term| Triple::new(subject, ex("label"), Term::literal("step"));
        assert!(translated.document.contains(&label(i("run"))));
        assert!(!translated.document.contains(&label(i("other"))));
    }

    #[test]
    fn test_failed_objects_of_every_subject_reject() {
        let template = doc(r#"
            t:resource a rdg:Resource ; rdg:hasGraph t:graph .
            t:graph rdg:hasSubject t:step .
            t:step a ex:Process ; ex:hasInput t:input .
            t:input a ex:Data .
        "#);
        let instance = doc(r#"
            i:resource a rdg:Resource ; rdg:hasGraph i:graph .
            i:graph rdg:hasSubject i:run .
            i:run a ex:Process ; ex:hasOutput i:result .
        "#);
        let options = ValidationOptions {
            subject_kind: MappingKind::Any,
            ..ValidationOptions::default()
        };

        let failure = validate(&instance, &template, &options).into_result().unwrap_err();
        assert_eq!((failure.stage, failure.kind), (Stage::ObjectMapping, FailureKind::StructuralMapping));
    }

    #[test]
    fn test_without_translation() {
        let template = doc(MIN_INPUT_TEMPLATE);
        let instance = doc(r#"
            i:resource a rdg:Resource ; rdg:hasGraph i:graph .
            i:graph rdg:hasSubject i:run .
            i:run a ex:Process .
        "#);
        let options = ValidationOptions {
            translate: false,
            ..ValidationOptions::default()
        };

        let translated = validate(&instance, &template, &options).into_result().unwrap();
        assert!(translated.translated.is_empty());
        assert_eq!(translated.document.len(), instance.store().len());
    }

    #[test]
    fn test_reasoner_released_after_pass() {
        let reasoner = StoreReasoner::new(Store::new());
        let template = doc(MIN_INPUT_TEMPLATE);
        let instance = doc("i:resource a rdg:Resource .");
        let validator = ProtocolValidator::new(&reasoner);

        assert!(!validator.validate(&instance, &template, &ValidationOptions::default()).is_accepted());
        assert!(reasoner.asserted_types(&i("resource")).is_err());
        // A second pass would block if the first import were still held.
        assert!(!validator.validate(&instance, &template, &ValidationOptions::default()).is_accepted());
    }

    #[test]
    fn test_options_serde_defaults() {
        let options: ValidationOptions = serde_json::from_str(r#"{"subject_kind": "any"}"#).unwrap();
        assert_eq!(options.subject_kind, MappingKind::Any);
        assert_eq!(options.resource_kind, MappingKind::SubIfNotTop);
        assert!(options.translate);
    }
}
