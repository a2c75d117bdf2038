//! Ordered / unordered sub-goal tracking
//!
//! One mechanism for every "do these N things" puzzle: keys in any order,
//! candles in a fixed order, candles in date order.

use std::collections::HashSet;
use std::hash::Hash;

/// Result of activating a target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation<T> {
    /// Not part of this puzzle
    Unknown,
    /// Already resolved earlier; nothing changes
    AlreadyResolved,
    /// Right target at the wrong time; state unchanged, the caller decides the
    /// penalty
    OutOfOrder { expected: T },
    Accepted { progress: usize, complete: bool },
}

/// Tracks which targets are resolved and, for ordered puzzles, which comes next
#[derive(Debug, Clone)]
pub struct SequenceValidator<T> {
    /// Every target, in required order when `ordered`
    targets: Vec<T>,
    ordered: bool,
    resolved: HashSet<T>,
    /// Resolution order so far
    history: Vec<T>,
}

impl<T: Clone + Eq + Hash> SequenceValidator<T> {
    /// Targets must be resolved in exactly this order
    pub fn fixed(order: Vec<T>) -> Self {
        Self {
            targets: order,
            ordered: true,
            resolved: HashSet::new(),
            history: Vec::new(),
        }
    }

    /// Order given by sorting on a secondary key (e.g. a date)
    ///
    /// The sort is stable: equal keys keep their listed order.
    pub fn derived<K: Ord>(items: impl IntoIterator<Item = (T, K)>) -> Self {
        let mut items: Vec<(T, K)> = items.into_iter().collect();
        items.sort_by(|a, b| a.1.cmp(&b.1));
        Self::fixed(items.into_iter().map(|(t, _)| t).collect())
    }

    /// Every target, any order
    pub fn unordered(targets: Vec<T>) -> Self {
        Self {
            targets,
            ordered: false,
            resolved: HashSet::new(),
            history: Vec::new(),
        }
    }

    /// Try to resolve `target`
    pub fn activate(&mut self, target: &T) -> Activation<T> {
        if !self.targets.contains(target) {
            return Activation::Unknown;
        }
        if self.resolved.contains(target) {
            return Activation::AlreadyResolved;
        }
        if let Some(expected) = self.expected_next() {
            if expected != target {
                return Activation::OutOfOrder {
                    expected: expected.clone(),
                };
            }
        }

        self.resolved.insert(target.clone());
        self.history.push(target.clone());
        Activation::Accepted {
            progress: self.progress(),
            complete: self.is_complete(),
        }
    }

    /// Clear progress; returns what had been resolved so visuals can be reverted
    pub fn reset(&mut self) -> Vec<T> {
        self.resolved.clear();
        std::mem::take(&mut self.history)
    }

    /// Next required target (ordered puzzles only)
    pub fn expected_next(&self) -> Option<&T> {
        if !self.ordered {
            return None;
        }
        self.targets.get(self.history.len())
    }

    pub fn progress(&self) -> usize {
        self.history.len()
    }

    pub fn required(&self) -> usize {
        self.targets.len()
    }

    pub fn remaining(&self) -> usize {
        self.required() - self.progress()
    }

    pub fn is_complete(&self) -> bool {
        self.progress() == self.required()
    }

    pub fn is_resolved(&self, target: &T) -> bool {
        self.resolved.contains(target)
    }

    /// Required order (or the target list for unordered puzzles)
    pub fn order(&self) -> &[T] {
        &self.targets
    }

    /// Targets resolved so far, oldest first
    pub fn history(&self) -> &[T] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_fixed_order_success() {
        let mut seq = SequenceValidator::fixed(vec![2, 4, 1, 3]);
        for (i, n) in [2, 4, 1, 3].iter().enumerate() {
            let result = seq.activate(n);
            assert_eq!(
                result,
                Activation::Accepted {
                    progress: i + 1,
                    complete: i == 3
                }
            );
        }
        assert_eq!(seq.progress(), 4);
        assert!(seq.is_complete());
    }

    #[test]
    fn test_fixed_order_skip_fails_and_resets() {
        let mut seq = SequenceValidator::fixed(vec![2, 4, 1, 3]);
        seq.activate(&2);
        seq.activate(&4);
        assert_eq!(seq.activate(&3), Activation::OutOfOrder { expected: 1 });
        // Out of order leaves state alone until the caller resets
        assert_eq!(seq.progress(), 2);

        assert_eq!(seq.reset(), vec![2, 4]);
        assert_eq!(seq.progress(), 0);
        assert!(!seq.is_resolved(&2));
        assert_eq!(seq.expected_next(), Some(&2));
    }

    #[test]
    fn test_already_resolved_and_unknown_are_ignored() {
        let mut seq = SequenceValidator::fixed(vec![1, 2]);
        seq.activate(&1);
        assert_eq!(seq.activate(&1), Activation::AlreadyResolved);
        assert_eq!(seq.activate(&9), Activation::Unknown);
        assert_eq!(seq.progress(), 1);
    }

    #[test]
    fn test_date_derived_order() {
        let seq = SequenceValidator::derived([
            (1, date("2020-05-01")),
            (2, date("1999-01-01")),
            (3, date("2021-01-01")),
        ]);
        assert_eq!(seq.order(), &[2, 1, 3]);
    }

    #[test]
    fn test_date_derived_wrong_order_clears_all() {
        let mut seq = SequenceValidator::derived([
            ("a", date("2020-05-01")),
            ("b", date("1999-01-01")),
            ("c", date("2021-01-01")),
        ]);
        assert!(matches!(seq.activate(&"b"), Activation::Accepted { .. }));
        assert!(matches!(seq.activate(&"c"), Activation::OutOfOrder { expected: "a" }));
        seq.reset();
        assert!(["a", "b", "c"].iter().all(|t| !seq.is_resolved(t)));
    }

    #[test]
    fn test_unordered_set_completion() {
        let mut seq = SequenceValidator::unordered(vec!["key1", "key2", "key3"]);
        assert_eq!(seq.expected_next(), None);
        seq.activate(&"key3");
        seq.activate(&"key1");
        assert_eq!(seq.remaining(), 1);
        assert_eq!(
            seq.activate(&"key2"),
            Activation::Accepted {
                progress: 3,
                complete: true
            }
        );
    }

    proptest! {
        #[test]
        fn prop_only_required_order_completes(order in Just(vec![0u8, 1, 2, 3]).prop_shuffle(),
                                              attempt in Just(vec![0u8, 1, 2, 3]).prop_shuffle()) {
            let mut seq = SequenceValidator::fixed(order.clone());
            let mut failed = false;
            for t in &attempt {
                if let Activation::OutOfOrder { .. } = seq.activate(t) {
                    failed = true;
                    seq.reset();
                    break;
                }
            }
            prop_assert_eq!(failed, attempt != order);
            prop_assert_eq!(seq.is_complete(), attempt == order);
            if failed {
                prop_assert_eq!(seq.progress(), 0);
            }
        }
    }
}
