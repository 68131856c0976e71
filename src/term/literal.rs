//! Literal value representation

use std::fmt;

use crate::core::ns;

/// Datatype for a literal
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Datatype {
    /// Plain literal (no datatype)
    Plain,
    /// Language-tagged literal
    Language(String),
    /// Typed literal with datatype URI
    Typed(String),
}

/// An RDF literal value
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    value: String,
    datatype: Datatype,
}

impl Literal {
    /// Create a plain literal
    pub fn plain(value: String) -> Self {
        Literal {
            value,
            datatype: Datatype::Plain,
        }
    }

    /// Create a typed literal
    pub fn typed(value: String, datatype: String) -> Self {
        Literal {
            value,
            datatype: Datatype::Typed(datatype),
        }
    }

    /// Create a language-tagged literal
    pub fn with_language(value: String, lang: String) -> Self {
        Literal {
            value,
            datatype: Datatype::Language(lang.to_lowercase()),
        }
    }

    /// Get the lexical value
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Get the datatype
    pub fn datatype(&self) -> &Datatype {
        &self.datatype
    }

    /// Check if this is a plain literal
    pub fn is_plain(&self) -> bool {
        matches!(self.datatype, Datatype::Plain)
    }

    /// Get the language tag if present
    pub fn language(&self) -> Option<&str> {
        match &self.datatype {
            Datatype::Language(lang) => Some(lang),
            _ => None,
        }
    }

    /// Get the datatype URI if present
    pub fn datatype_uri(&self) -> Option<&str> {
        match &self.datatype {
            Datatype::Typed(uri) => Some(uri),
            _ => None,
        }
    }

    /// Datatype IRI under RDF 1.1 rules: plain literals are `xsd:string`,
    /// language-tagged ones are `rdf:langString`.
    pub fn effective_datatype(&self) -> String {
        match &self.datatype {
            Datatype::Plain => ns::uri(ns::XSD, "string"),
            Datatype::Language(_) => ns::uri(ns::RDF, "langString"),
            Datatype::Typed(dt) => dt.clone(),
        }
    }

    /// Try to parse as a non-negative integer (cardinality bounds)
    pub fn as_cardinality(&self) -> Option<usize> {
        self.value.trim().parse().ok()
    }
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

impl fmt::Debug for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = escape(&self.value);
        match &self.datatype {
            Datatype::Plain => write!(f, "\"{}\"", value),
            Datatype::Language(lang) => write!(f, "\"{}\"@{}", value, lang),
            Datatype::Typed(dt) => write!(f, "\"{}\"^^<{}>", value, dt),
        }
    }
}
