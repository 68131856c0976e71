//! URI (IRI) representation

use std::fmt;

/// A URI reference
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Uri {
    value: String,
}

impl Uri {
    /// Create a new URI
    pub fn new(value: String) -> Self {
        Uri { value }
    }

    /// Get the URI as a string slice
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Get the namespace (everything up to and including the last # or /)
    pub fn namespace(&self) -> &str {
        match self.split_point() {
            Some(pos) => &self.value[..=pos],
            None => &self.value,
        }
    }

    /// Get the local name (fragment or last path segment)
    pub fn local_name(&self) -> &str {
        match self.split_point() {
            Some(pos) => &self.value[pos + 1..],
            None => &self.value,
        }
    }

    fn split_point(&self) -> Option<usize> {
        self.value.rfind('#').or_else(|| self.value.rfind('/'))
    }

    /// Resolve a relative reference against this base
    pub fn resolve(&self, relative: &str) -> Uri {
        if relative.contains("://") || relative.starts_with("urn:") {
            return Uri::new(relative.to_string());
        }

        if relative.is_empty() {
            return self.clone();
        }

        if relative.starts_with('#') {
            let base = match self.value.find('#') {
                Some(pos) => &self.value[..pos],
                None => &self.value,
            };
            return Uri::new(format!("{}{}", base, relative));
        }

        if relative.starts_with('/') {
            if let Some(scheme_end) = self.value.find("://") {
                let authority_start = scheme_end + 3;
                let authority_end = self.value[authority_start..]
                    .find('/')
                    .map(|p| authority_start + p)
                    .unwrap_or(self.value.len());
                return Uri::new(format!("{}{}", &self.value[..authority_end], relative));
            }
        }

        Uri::new(format!("{}{}", self.namespace(), relative))
    }
}

impl fmt::Debug for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.value)
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.value)
    }
}

impl From<&str> for Uri {
    fn from(s: &str) -> Self {
        Uri::new(s.to_string())
    }
}

impl From<String> for Uri {
    fn from(s: String) -> Self {
        Uri::new(s)
    }
}
