//! Blank node representation

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for generating unique blank node IDs
static BLANK_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A blank node (anonymous node).
///
/// Identity is the process-unique `id`; the label only survives for display.
/// Parsers map each document-local label to one fresh node, so the same label
/// in two documents never aliases.
#[derive(Clone)]
pub struct BlankNode {
    id: u64,
    label: Option<String>,
}

impl BlankNode {
    /// Create a fresh blank node with a unique ID
    pub fn fresh() -> Self {
        BlankNode {
            id: BLANK_COUNTER.fetch_add(1, Ordering::SeqCst),
            label: None,
        }
    }

    /// Create a fresh blank node remembering its source label
    pub fn labeled(label: impl Into<String>) -> Self {
        BlankNode {
            id: BLANK_COUNTER.fetch_add(1, Ordering::SeqCst),
            label: Some(label.into()),
        }
    }

    /// Get the internal ID
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Get the label if present
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl PartialEq for BlankNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for BlankNode {}

impl std::hash::Hash for BlankNode {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for BlankNode {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BlankNode {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Debug for BlankNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "_:{}_{}", label, self.id),
            None => write!(f, "_:b{}", self.id),
        }
    }
}

impl fmt::Display for BlankNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // N-Triples labels must stay unique per node, so the id is always kept.
        fmt::Debug::fmt(self, f)
    }
}
