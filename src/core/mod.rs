//! Common definitions shared across the engine
//!
//! - `namespaces`: RDF/OWL namespace constants and the protocol vocabulary

pub mod namespaces;

pub use namespaces::ns;
