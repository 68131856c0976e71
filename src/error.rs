//! Structured error handling for rdg
//!
//! Provides a unified error type with:
//! - Error codes for programmatic handling
//! - A JSON form for reporting rejected documents
//! - Context preserved through error chains
//! - Process exit status mapping
//!
//! # Error Categories
//!
//! - `Parse` - Turtle syntax errors
//! - `Document` - Protocol document shape problems
//! - `Reasoner` - Knowledge base failures
//! - `Validation` - Rejected validation passes
//! - `Config` - Configuration issues
//! - `Io` - Reading inputs and writing outputs
//!
//! Module-local failures keep their own types ([`ParseError`],
//! [`ReasonerError`], [`ValidationFailure`]); [`RdgError`] is what crosses
//! the library boundary into the binary.
//!
//! # Example
//!
//! ```rust,ignore
//! use rdg::error::{RdgError, ErrorCode};
//!
//! let err = RdgError::io("cannot read template")
//!     .with_context("path", "template.ttl")
//!     .with_hint("Pass the template with --template");
//! eprintln!("{}", err.to_json_pretty());
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::failure::{FailureKind, ValidationFailure};
use crate::parser::ParseError;
use crate::protocol::DocumentError;
use crate::reasoner::ReasonerError;

// ============================================================================
// Error Codes
// ============================================================================

/// Unique error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Parse errors (1xxx)
    ParseError = 1000,
    /// Invalid Turtle syntax
    InvalidSyntax = 1001,
    UndefinedPrefix = 1002,
    UnexpectedEof = 1003,

    // Document errors (2xxx)
    DocumentError = 2000,
    /// No resource node found
    NoResource = 2001,
    /// More than one resource node found
    AmbiguousResource = 2002,
    /// Named resource does not occur in the document
    UnknownResource = 2003,

    // Reasoner errors (3xxx)
    ReasonerError = 3000,
    UnknownIndividual = 3001,
    /// Knowledge base is inconsistent
    Inconsistent = 3002,

    // Validation errors (4xxx)
    ValidationFailed = 4000,
    /// No structural mapping between documents
    StructuralMapping = 4001,
    ResourceMismatch = 4002,
    MissingGraph = 4003,
    /// A property restriction does not hold
    RestrictionViolation = 4004,
    /// No alternative of a union holds
    UnionExhausted = 4005,
    ComplementViolation = 4006,
    /// Individual is not a member of a primitive class
    NotAMember = 4007,
    /// Translation against the empty class
    Unsatisfiable = 4008,

    // Config errors (7xxx)
    ConfigError = 7000,
    ConfigNotFound = 7001,
    InvalidConfigSyntax = 7002,
    InvalidConfigValue = 7003,

    // IO errors (8xxx)
    IoError = 8000,
    FileNotFound = 8001,
    FileAccessDenied = 8002,

    // Internal errors (9xxx)
    InternalError = 9000,
}

impl ErrorCode {
    /// Get the numeric code value
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get a short description of the error code
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::ParseError => "Parse error",
            ErrorCode::InvalidSyntax => "Invalid Turtle syntax",
            ErrorCode::UndefinedPrefix => "Undefined prefix",
            ErrorCode::UnexpectedEof => "Unexpected end of input",

            ErrorCode::DocumentError => "Document error",
            ErrorCode::NoResource => "No resource declared",
            ErrorCode::AmbiguousResource => "Ambiguous resource",
            ErrorCode::UnknownResource => "Unknown resource",

            ErrorCode::ReasonerError => "Reasoner error",
            ErrorCode::UnknownIndividual => "Unknown individual",
            ErrorCode::Inconsistent => "Inconsistent knowledge base",

            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::StructuralMapping => "No structural mapping",
            ErrorCode::ResourceMismatch => "Resource mismatch",
            ErrorCode::MissingGraph => "Missing graph",
            ErrorCode::RestrictionViolation => "Restriction violated",
            ErrorCode::UnionExhausted => "No union branch holds",
            ErrorCode::ComplementViolation => "Complement violated",
            ErrorCode::NotAMember => "Not a member",
            ErrorCode::Unsatisfiable => "Unsatisfiable class",

            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::ConfigNotFound => "Configuration file not found",
            ErrorCode::InvalidConfigSyntax => "Invalid configuration syntax",
            ErrorCode::InvalidConfigValue => "Invalid configuration value",

            ErrorCode::IoError => "IO error",
            ErrorCode::FileNotFound => "File not found",
            ErrorCode::FileAccessDenied => "File access denied",

            ErrorCode::InternalError => "Internal error",
        }
    }

    /// Is this a rejection of the documents rather than a failure to run?
    pub fn is_rejection(&self) -> bool {
        (4000..5000).contains(&self.code())
    }

    /// Process exit status for this error
    pub fn exit_status(&self) -> i32 {
        if self.is_rejection() {
            2
        } else {
            1
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl From<&FailureKind> for ErrorCode {
    fn from(kind: &FailureKind) -> Self {
        match kind {
            FailureKind::StructuralMapping => ErrorCode::StructuralMapping,
            FailureKind::ResourceMismatch => ErrorCode::ResourceMismatch,
            FailureKind::MissingGraph => ErrorCode::MissingGraph,
            FailureKind::RestrictionViolation { .. } => ErrorCode::RestrictionViolation,
            FailureKind::UnionExhausted { .. } => ErrorCode::UnionExhausted,
            FailureKind::ComplementViolation => ErrorCode::ComplementViolation,
            FailureKind::NotAMember => ErrorCode::NotAMember,
            FailureKind::Unsatisfiable => ErrorCode::Unsatisfiable,
            FailureKind::UnknownIndividual => ErrorCode::UnknownIndividual,
            FailureKind::Inconsistent(_) => ErrorCode::Inconsistent,
        }
    }
}

// ============================================================================
// Error Context
// ============================================================================

/// Additional context information for an error
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorContext {
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub fields: HashMap<String, String>,
    /// Source location (file:line)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Stack of error causes, outermost first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn cause(mut self, cause: impl Into<String>) -> Self {
        self.causes.push(cause.into());
        self
    }
}

// ============================================================================
// Main Error Type
// ============================================================================

/// The main error type for rdg
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RdgError {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ErrorContext>,
    /// Hint for resolving the error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Structured failure detail of a rejected pass
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<serde_json::Value>,
}

impl RdgError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            hint: None,
            failure: None,
        }
    }

    // ========================================================================
    // Factory methods for common error types
    // ========================================================================

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ParseError, message)
    }

    pub fn document(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DocumentError, message)
    }

    pub fn reasoner(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ReasonerError, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::IoError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = code;
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context = Some(self.context.take().unwrap_or_else(ErrorContext::new).field(key, value));
        self
    }

    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.context = Some(self.context.take().unwrap_or_else(ErrorContext::new).cause(cause));
        self
    }

    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.context = Some(self.context.take().unwrap_or_else(ErrorContext::new).at(location));
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Did a validation pass reject the documents?
    pub fn is_rejection(&self) -> bool {
        self.failure.is_some() || self.code.is_rejection()
    }

    pub fn exit_status(&self) -> i32 {
        if self.is_rejection() {
            2
        } else {
            self.code.exit_status()
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":"INTERNAL_ERROR","message":"{}"}}"#, self.message)
        })
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.to_json())
    }
}

impl fmt::Display for RdgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)?;

        if let Some(ref ctx) = self.context {
            if let Some(ref loc) = ctx.location {
                write!(f, " at {}", loc)?;
            }
            if !ctx.causes.is_empty() {
                write!(f, "\nCaused by:")?;
                for cause in &ctx.causes {
                    write!(f, "\n  - {}", cause)?;
                }
            }
        }

        if let Some(ref hint) = self.hint {
            write!(f, "\nHint: {}", hint)?;
        }

        Ok(())
    }
}

impl std::error::Error for RdgError {}

// ============================================================================
// Conversions from other error types
// ============================================================================

impl From<std::io::Error> for RdgError {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind;
        let code = match err.kind() {
            ErrorKind::NotFound => ErrorCode::FileNotFound,
            ErrorKind::PermissionDenied => ErrorCode::FileAccessDenied,
            _ => ErrorCode::IoError,
        };
        RdgError::new(code, err.to_string())
    }
}

impl From<serde_json::Error> for RdgError {
    fn from(err: serde_json::Error) -> Self {
        RdgError::internal(err.to_string()).with_context("format", "JSON")
    }
}

impl From<toml::de::Error> for RdgError {
    fn from(err: toml::de::Error) -> Self {
        RdgError::config(err.to_string()).with_code(ErrorCode::InvalidConfigSyntax)
    }
}

impl From<ConfigError> for RdgError {
    fn from(err: ConfigError) -> Self {
        let code = match err {
            ConfigError::IoError(..) => ErrorCode::ConfigNotFound,
            ConfigError::ParseError(..) => ErrorCode::InvalidConfigSyntax,
            ConfigError::SerializeError(_) => ErrorCode::ConfigError,
        };
        RdgError::new(code, err.to_string())
    }
}

impl From<ParseError> for RdgError {
    fn from(err: ParseError) -> Self {
        let error = RdgError::parse(err.to_string());
        match err {
            ParseError::Syntax { position, .. } => error
                .with_code(ErrorCode::InvalidSyntax)
                .with_context("position", position.to_string()),
            ParseError::UndefinedPrefix { prefix } => error
                .with_code(ErrorCode::UndefinedPrefix)
                .with_context("prefix", prefix)
                .with_hint("Declare the prefix with @prefix or in the [prefixes] configuration"),
            ParseError::UnexpectedEof => error.with_code(ErrorCode::UnexpectedEof),
        }
    }
}

impl From<DocumentError> for RdgError {
    fn from(err: DocumentError) -> Self {
        let message = err.to_string();
        match err {
            DocumentError::Parse(err) => err.into(),
            DocumentError::NoResource => RdgError::document(message)
                .with_code(ErrorCode::NoResource)
                .with_hint("Type the resource node as rdg:Resource"),
            DocumentError::AmbiguousResource { count } => RdgError::document(message)
                .with_code(ErrorCode::AmbiguousResource)
                .with_context("count", count.to_string()),
            DocumentError::UnknownResource(resource) => RdgError::document(message)
                .with_code(ErrorCode::UnknownResource)
                .with_context("resource", resource.to_string()),
        }
    }
}

impl From<ReasonerError> for RdgError {
    fn from(err: ReasonerError) -> Self {
        let error = RdgError::reasoner(err.to_string());
        match err {
            ReasonerError::UnknownIndividual(individual) => error
                .with_code(ErrorCode::UnknownIndividual)
                .with_context("individual", individual.to_string()),
            ReasonerError::Inconsistent(_) => error.with_code(ErrorCode::Inconsistent),
        }
    }
}

impl From<&ValidationFailure> for RdgError {
    fn from(failure: &ValidationFailure) -> Self {
        let mut error = RdgError::validation(failure.explanation.clone())
            .with_code((&failure.kind).into())
            .with_context("stage", failure.stage.as_str())
            .with_context("kind", failure.kind.as_str());

        if let Some(ref individual) = failure.individual {
            error = error.with_context("individual", individual.to_string());
        }
        if let Some(ref class) = failure.class {
            error = error.with_context("class", class.to_string());
        }

        let mut cause = match &failure.kind {
            FailureKind::RestrictionViolation { cause, .. } => cause.as_deref(),
            _ => None,
        };
        while let Some(inner) = cause {
            error = error.with_cause(inner.explanation.clone());
            cause = match &inner.kind {
                FailureKind::RestrictionViolation { cause, .. } => cause.as_deref(),
                _ => None,
            };
        }

        error.failure = Some(failure.to_json());
        error
    }
}

impl From<ValidationFailure> for RdgError {
    fn from(failure: ValidationFailure) -> Self {
        Self::from(&failure)
    }
}

// ============================================================================
// Result type alias
// ============================================================================

/// A Result type using RdgError
pub type RdgResult<T> = Result<T, RdgError>;

// ============================================================================
// Tests
// ============================================================================
