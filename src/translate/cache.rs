//! Pass-scoped memo table and explanation stack for translation

use fnv::FnvHashMap;
use indexmap::IndexSet;

use crate::expression::ClassExpression;
use crate::failure::ValidationFailure;
use crate::term::{Term, Triple};

/// Statements produced by a translation, in production order
pub type StatementSet = IndexSet<Triple>;

/// Memoized outcome of translating one expression against one individual
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEntry {
    /// Translation of this pair has started and not finished
    InProgress,
    Success(StatementSet),
    Failure(ValidationFailure),
}

/// Hit and miss counters for one pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    /// Hits on a pair that was still being translated
    pub cycles: usize,
}

/// Memo table keyed by (expression, individual).
///
/// Owned by a single validation pass; never shared between passes.
#[derive(Debug, Default)]
pub struct TranslationCache {
    entries: FnvHashMap<(ClassExpression, Term), CacheEntry>,
    stats: CacheStats,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a pair, counting the lookup
    pub fn get(&mut self, expr: &ClassExpression, individual: &Term) -> Option<&CacheEntry> {
        let key = (expr.clone(), individual.clone());
        match self.entries.get(&key) {
            Some(entry) => {
                self.stats.hits += 1;
                if matches!(entry, CacheEntry::InProgress) {
                    self.stats.cycles += 1;
                }
                Some(entry)
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    pub fn mark_in_progress(&mut self, expr: &ClassExpression, individual: &Term) {
        self.entries
            .insert((expr.clone(), individual.clone()), CacheEntry::InProgress);
    }

    pub fn store_success(&mut self, expr: &ClassExpression, individual: &Term, statements: StatementSet) {
        self.entries
            .insert((expr.clone(), individual.clone()), CacheEntry::Success(statements));
    }

    pub fn store_failure(&mut self, expr: &ClassExpression, individual: &Term, failure: ValidationFailure) {
        self.entries
            .insert((expr.clone(), individual.clone()), CacheEntry::Failure(failure));
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats = CacheStats::default();
    }
}

/// Named classes currently being expanded, innermost last.
///
/// Only feeds failure explanations; never changes a translation outcome.
#[derive(Debug, Default, Clone)]
pub struct ExplanationStack {
    classes: Vec<Term>,
}

impl ExplanationStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, class: Term) {
        self.classes.push(class);
    }

    pub fn pop(&mut self) -> Option<Term> {
        self.classes.pop()
    }

    pub fn top(&self) -> Option<&Term> {
        self.classes.last()
    }

    pub fn depth(&self) -> usize {
        self.classes.len()
    }

    /// Outermost to innermost, e.g. `Process > Step`
    pub fn render(&self) -> String {
        self.classes
            .iter()
            .map(|c| c.short_name())
            .collect::<Vec<_>>()
            .join(" > ")
    }
}
