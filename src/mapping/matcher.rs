//! Backtracking matcher between instance and template individuals
//!
//! Phase one pairs every template individual with a distinct instance
//! individual, backtracking over candidates. Phase two gives every instance
//! individual left over the first template individual that accepts it, or
//! nothing. Only phase one can fail.
//!
//! Worst case is exponential in the number of template individuals; protocol
//! templates declare a handful of them.

use fnv::FnvHashMap;
use indexmap::IndexSet;

use super::Mapping;
use crate::term::Term;

/// Caches validator answers for the duration of one match
struct MemoValidator<F> {
    validator: F,
    answers: FnvHashMap<(Term, Term), bool>,
}

impl<F: FnMut(&Term, &Term) -> bool> MemoValidator<F> {
    fn accepts(&mut self, instance: &Term, template: &Term) -> bool {
        let key = (instance.clone(), template.clone());
        if let Some(answer) = self.answers.get(&key) {
            return *answer;
        }
        let answer = (self.validator)(instance, template);
        self.answers.insert(key, answer);
        answer
    }
}

/// Pairs instance individuals with template individuals
pub struct StructuralMatcher;

impl StructuralMatcher {
    /// Compute a mapping from `instances` to `templates`.
    ///
    /// Returns `None` when some template individual cannot be given its own
    /// accepted instance individual. Candidates are tried in input order and
    /// the first complete assignment wins.
    pub fn find_mapping<F>(instances: &[Term], templates: &[Term], validator: F) -> Option<Mapping>
    where
        F: FnMut(&Term, &Term) -> bool,
    {
        let instances: IndexSet<&Term> = instances.iter().collect();
        let templates: IndexSet<&Term> = templates.iter().collect();
        let mut memo = MemoValidator {
            validator,
            answers: FnvHashMap::default(),
        };

        let candidates: Vec<&Term> = instances.iter().copied().collect();
        let wanted: Vec<&Term> = templates.iter().copied().collect();
        let required = match Self::required(&candidates, &wanted, &mut memo) {
            Some(pairs) => pairs,
            None => {
                tracing::debug!(
                    instances = instances.len(),
                    templates = templates.len(),
                    "no required mapping"
                );
                return None;
            }
        };

        let mut mapping = Mapping::new();
        for instance in &instances {
            match required.iter().find(|(i, _)| i == instance) {
                Some((_, template)) => mapping.insert_required((*instance).clone(), (*template).clone()),
                None => {
                    let template = templates
                        .iter()
                        .find(|t| memo.accepts(instance, t))
                        .map(|t| (*t).clone());
                    mapping.insert_optional((*instance).clone(), template);
                }
            }
        }

        tracing::trace!(
            required = required.len(),
            optional = mapping.len() - required.len(),
            "mapping found"
        );
        Some(mapping)
    }

    /// Assign each of `templates` a distinct accepted member of `instances`
    fn required<'t, F>(
        instances: &[&'t Term],
        templates: &[&'t Term],
        memo: &mut MemoValidator<F>,
    ) -> Option<Vec<(&'t Term, &'t Term)>>
    where
        F: FnMut(&Term, &Term) -> bool,
    {
        let Some((template, rest)) = templates.split_first() else {
            return Some(Vec::new());
        };
        if instances.len() < templates.len() {
            return None;
        }

        for (idx, instance) in instances.iter().enumerate() {
            if !memo.accepts(instance, template) {
                continue;
            }

            let remaining: Vec<&Term> = instances
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != idx)
                .map(|(_, i)| *i)
                .collect();
            if let Some(mut pairs) = Self::required(&remaining, rest, memo) {
                pairs.push((*instance, *template));
                return Some(pairs);
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn ind(name: &str) -> Term {
        Term::uri(format!("http://example.org/{}", name))
    }

    fn inds(names: &[&str]) -> Vec<Term> {
        names.iter().map(|n| ind(n)).collect()
    }

    #[test]
    fn test_empty_template_set() {
        let mapping = StructuralMatcher::find_mapping(&inds(&["a"]), &[], |_, _| false).unwrap();
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.get(&ind("a")), None);
    }

    #[test]
    fn test_too_few_instances() {
        let result = StructuralMatcher::find_mapping(&inds(&["a"]), &inds(&["t1", "t2"]), |_, _| true);
        assert!(result.is_none());
    }

    #[test]
    fn test_any_covers_every_template() {
        let instances = inds(&["a", "b", "c", "d"]);
        let templates = inds(&["t1", "t2", "t3"]);
        let mapping = StructuralMatcher::find_mapping(&instances, &templates, |_, _| true).unwrap();

        let covered: IndexSet<&Term> = mapping
            .iter()
            .filter(|(i, _)| mapping.is_required(i))
            .filter_map(|(_, t)| t)
            .collect();
        assert_eq!(covered.len(), 3);
        // The leftover instance still gets an optional pairing
        assert_eq!(mapping.mapped().count(), 4);
    }

    #[test]
    fn test_backtracks_over_first_choice() {
        // a accepts both templates, b only t1: the first pick (a -> t1)
        // must be undone so that b -> t1 and a -> t2.
        let instances = inds(&["a", "b"]);
        let templates = inds(&["t1", "t2"]);
        let accepts = |i: &Term, t: &Term| *i == ind("a") || (*i == ind("b") && *t == ind("t1"));

        let mapping = StructuralMatcher::find_mapping(&instances, &templates, accepts).unwrap();
        assert_eq!(mapping.get(&ind("a")), Some(&ind("t2")));
        assert_eq!(mapping.get(&ind("b")), Some(&ind("t1")));
        assert!(mapping.is_required(&ind("a")) && mapping.is_required(&ind("b")));
    }

    #[test]
    fn test_unsatisfiable_template() {
        let instances = inds(&["a", "b"]);
        let templates = inds(&["t1", "t2"]);
        let result = StructuralMatcher::find_mapping(&instances, &templates, |_, t| *t == ind("t1"));
        assert!(result.is_none());
    }

    #[test]
    fn test_optional_entries_reuse_templates() {
        let instances = inds(&["a", "b", "c"]);
        let templates = inds(&["t1"]);
        let accepts = |i: &Term, _: &Term| *i != ind("c");

        let mapping = StructuralMatcher::find_mapping(&instances, &templates, accepts).unwrap();
        assert!(mapping.is_required(&ind("a")));
        assert!(!mapping.is_required(&ind("b")));
        assert_eq!(mapping.get(&ind("b")), Some(&ind("t1")));
        assert_eq!(mapping.get(&ind("c")), None);
        assert!(mapping.contains(&ind("c")));
    }

    #[test]
    fn test_duplicates_are_ignored_and_answers_memoized() {
        let calls = Cell::new(0);
        let instances = inds(&["a", "a", "b"]);
        let templates = inds(&["t1", "t1"]);
        let accepts = |_: &Term, _: &Term| {
            calls.set(calls.get() + 1);
            false
        };

        assert!(StructuralMatcher::find_mapping(&instances, &templates, accepts).is_none());
        assert_eq!(calls.get(), 2);
    }
}
