//! RDG - template-driven validation of RDF protocol documents
//!
//! An instance document describing a resource is checked against a template
//! document of the same shape. Individuals of the two documents are paired
//! structurally, each pairing is accepted or rejected by comparing the
//! classes the individuals satisfy, and the instance statements are
//! translated into the template's vocabulary by interpreting OWL class
//! expressions against a reasoner.
//!
//! # Architecture
//!
//! - [`reasoner::ReasonerFacade`] - the only way the engine learns facts
//! - [`profile::LocalProfileBuilder`] - class expression an individual satisfies
//! - [`mapping::MappingValidator`] - accepts or rejects one pairing
//! - [`mapping::StructuralMatcher`] - backtracking search for a full pairing
//! - [`translate::Translator`] - class expression interpreter with memoisation
//! - [`protocol::ProtocolValidator`] - the phase-by-phase validation pass
//!
//! # Example
//!
//! ```rust,ignore
//! use rdg::{ProtocolDocument, ProtocolValidator, StoreReasoner, Store, ValidationOptions};
//!
//! let template = ProtocolDocument::from_turtle(TEMPLATE, None)?;
//! let instance = ProtocolDocument::from_turtle(INSTANCE, None)?;
//! let reasoner = StoreReasoner::new(Store::new());
//!
//! match ProtocolValidator::new(&reasoner).validate(&instance, &template, ValidationOptions::default()) {
//!     Outcome::Accepted(doc) => println!("{}", doc.document.to_ntriples()),
//!     Outcome::Rejected(failure) => eprintln!("{}", failure),
//! }
//! ```

pub mod core;
pub mod config;
pub mod error;
pub mod term;
pub mod parser;
pub mod store;
pub mod expression;
pub mod reasoner;
pub mod profile;
pub mod mapping;
pub mod translate;
pub mod failure;
pub mod protocol;

pub use crate::core::ns;

// Re-export term types
pub use term::{Term, Triple, Uri, Literal, Datatype, BlankNode};

// Re-export parser types
pub use parser::{parse_turtle, ParseError, ParserState, TurtleParser};

pub use store::Store;

pub use expression::ClassExpression;

// Re-export reasoner types
pub use reasoner::{with_imported_documents, ImportTicket, ReasonerError, ReasonerFacade, StoreReasoner};

// Re-export engine types
pub use profile::LocalProfileBuilder;
pub use mapping::{Mapping, MappingKind, MappingValidator, StructuralMatcher};
pub use translate::{ExplanationStack, StatementSet, TranslationCache, Translator};
pub use failure::{FailureKind, RestrictionKind, Stage, ValidationFailure};
pub use protocol::{
    DocumentError, NodeKind, Outcome, Phase, ProtocolDocument, ProtocolNode, ProtocolValidator,
    TranslatedDocument, ValidationOptions,
};

// Re-export configuration types
pub use config::{ConfigError, GeneralConfig, LogLevel, OutputFormat, RdgConfig, ReasonerConfig};

// Re-export error types
pub use error::{ErrorCode, ErrorContext, RdgError, RdgResult};
