//! Standard RDF namespace URI constants and the protocol vocabulary
//!
//! These constants provide compile-time verified namespace URIs for
//! use throughout the codebase, eliminating string typos and enabling
//! better refactoring support.

/// Standard namespace URI constants
pub mod ns {
    // W3C Core Vocabularies
    /// RDF namespace
    pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    /// RDF Schema namespace
    pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
    /// XML Schema Datatypes namespace
    pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";
    /// OWL Web Ontology Language namespace
    pub const OWL: &str = "http://www.w3.org/2002/07/owl#";

    /// Protocol vocabulary (resource description graphs)
    pub const RDG: &str = "https://w3id.org/rdg#";

    /// Helper to construct a full URI from namespace and local name
    #[inline]
    pub fn uri(namespace: &str, local: &str) -> String {
        format!("{}{}", namespace, local)
    }

    /// Check if a URI belongs to a namespace
    #[inline]
    pub fn in_namespace(uri: &str, namespace: &str) -> bool {
        uri.starts_with(namespace)
    }

    /// Extract local name from a URI given its namespace
    #[inline]
    pub fn local_name<'a>(uri: &'a str, namespace: &str) -> Option<&'a str> {
        uri.strip_prefix(namespace)
    }

    pub mod rdf {
        pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
        pub const FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";
        pub const REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";
        pub const NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";
    }

    pub mod rdfs {
        pub const SUB_CLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";
        pub const SUB_PROPERTY_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subPropertyOf";
        pub const DOMAIN: &str = "http://www.w3.org/2000/01/rdf-schema#domain";
        pub const RANGE: &str = "http://www.w3.org/2000/01/rdf-schema#range";
        pub const LITERAL: &str = "http://www.w3.org/2000/01/rdf-schema#Literal";
    }

    pub mod owl {
        pub const THING: &str = "http://www.w3.org/2002/07/owl#Thing";
        pub const NOTHING: &str = "http://www.w3.org/2002/07/owl#Nothing";
        pub const NAMED_INDIVIDUAL: &str = "http://www.w3.org/2002/07/owl#NamedIndividual";
        pub const EQUIVALENT_CLASS: &str = "http://www.w3.org/2002/07/owl#equivalentClass";
        pub const EQUIVALENT_PROPERTY: &str = "http://www.w3.org/2002/07/owl#equivalentProperty";
        pub const DISJOINT_WITH: &str = "http://www.w3.org/2002/07/owl#disjointWith";
        pub const INTERSECTION_OF: &str = "http://www.w3.org/2002/07/owl#intersectionOf";
        pub const UNION_OF: &str = "http://www.w3.org/2002/07/owl#unionOf";
        pub const COMPLEMENT_OF: &str = "http://www.w3.org/2002/07/owl#complementOf";
        pub const ONE_OF: &str = "http://www.w3.org/2002/07/owl#oneOf";
        pub const ON_PROPERTY: &str = "http://www.w3.org/2002/07/owl#onProperty";
        pub const SOME_VALUES_FROM: &str = "http://www.w3.org/2002/07/owl#someValuesFrom";
        pub const ALL_VALUES_FROM: &str = "http://www.w3.org/2002/07/owl#allValuesFrom";
        pub const HAS_VALUE: &str = "http://www.w3.org/2002/07/owl#hasValue";
        pub const HAS_SELF: &str = "http://www.w3.org/2002/07/owl#hasSelf";
        pub const MIN_CARDINALITY: &str = "http://www.w3.org/2002/07/owl#minCardinality";
        pub const MAX_CARDINALITY: &str = "http://www.w3.org/2002/07/owl#maxCardinality";
        pub const CARDINALITY: &str = "http://www.w3.org/2002/07/owl#cardinality";
        pub const MIN_QUALIFIED_CARDINALITY: &str = "http://www.w3.org/2002/07/owl#minQualifiedCardinality";
        pub const MAX_QUALIFIED_CARDINALITY: &str = "http://www.w3.org/2002/07/owl#maxQualifiedCardinality";
        pub const QUALIFIED_CARDINALITY: &str = "http://www.w3.org/2002/07/owl#qualifiedCardinality";
    }

    pub mod rdg {
        pub const RESOURCE: &str = "https://w3id.org/rdg#Resource";
        pub const GRAPH: &str = "https://w3id.org/rdg#Graph";
        pub const SUBJECT: &str = "https://w3id.org/rdg#Subject";
        pub const HAS_GRAPH: &str = "https://w3id.org/rdg#hasGraph";
        pub const HAS_SUBJECT: &str = "https://w3id.org/rdg#hasSubject";
    }

    /// Protocol-internal vocabulary that never takes part in profiles or
    /// default back-fill.
    #[inline]
    pub fn is_reserved(uri: &str) -> bool {
        in_namespace(uri, RDG) || uri == rdf::TYPE || uri == owl::NAMED_INDIVIDUAL
    }
}

#[cfg(test)]
mod tests {
    use super::ns;

    #[test]
    fn test_uri_construction() {
        assert_eq!(
            ns::uri(ns::RDF, "type"),
            "http://www.w3.org/1999/02/22-rdf-syntax-ns#type"
        );
        assert_eq!(ns::uri(ns::RDG, "hasGraph"), ns::rdg::HAS_GRAPH);
    }

    #[test]
    fn test_namespace_check() {
        assert!(ns::in_namespace(ns::owl::UNION_OF, ns::OWL));
        assert!(!ns::in_namespace(ns::rdfs::SUB_CLASS_OF, ns::OWL));
    }

    #[test]
    fn test_local_name() {
        assert_eq!(ns::local_name(ns::rdg::HAS_SUBJECT, ns::RDG), Some("hasSubject"));
        assert_eq!(ns::local_name(ns::rdg::HAS_SUBJECT, ns::RDF), None);
    }

    #[test]
    fn test_reserved_vocabulary() {
        assert!(ns::is_reserved(ns::rdg::RESOURCE));
        assert!(ns::is_reserved(ns::rdf::TYPE));
        assert!(ns::is_reserved(ns::owl::NAMED_INDIVIDUAL));
        assert!(!ns::is_reserved("http://example.org/hasInput"));
    }
}
