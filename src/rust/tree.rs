// SPDX-FileCopyrightText: 2025 KVPROVE Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! AND/OR obligation trees and their reduction algebra
//!
//! `reduce` only relies on `Success` absorbing `Any` and `Fail` absorbing
//! `All`. It never forces a `Deferred` node.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::core::Obligation;

type Producer = Box<dyn Fn() -> ObligationTree + Send + Sync>;

struct ThunkInner {
    cell: OnceLock<ObligationTree>,
    produce: Producer,
}

/// Lazily computed subtree, evaluated at most once
///
/// Clones share the same cell. Equality is identity.
#[derive(Clone)]
pub struct Thunk {
    inner: Arc<ThunkInner>,
}

impl Thunk {
    pub fn new(produce: impl Fn() -> ObligationTree + Send + Sync + 'static) -> Self {
        Thunk {
            inner: Arc::new(ThunkInner {
                cell: OnceLock::new(),
                produce: Box::new(produce),
            }),
        }
    }

    /// Compute the subtree on first call, return the cached one afterwards
    pub fn force(&self) -> &ObligationTree {
        self.inner.cell.get_or_init(|| (self.inner.produce)())
    }

    pub fn is_forced(&self) -> bool {
        self.inner.cell.get().is_some()
    }
}

impl PartialEq for Thunk {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Thunk {}

impl fmt::Debug for Thunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.cell.get() {
            Some(tree) => f.debug_tuple("Thunk").field(tree).finish(),
            None => f.write_str("Thunk(<unforced>)"),
        }
    }
}

/// Nested conjunction/disjunction of proof obligations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObligationTree {
    /// Unresolved obligation
    Leaf(Obligation),
    /// Subtree computed on demand
    Deferred(Thunk),
    /// Every child must succeed
    All(Vec<ObligationTree>),
    /// One child succeeding is enough
    Any(Vec<ObligationTree>),
    /// Nothing left to prove
    Success,
    /// Known unsolvable. No current phase produces it.
    Fail,
}

impl ObligationTree {
    pub fn leaf(obligation: Obligation) -> Self {
        ObligationTree::Leaf(obligation)
    }

    pub fn deferred(produce: impl Fn() -> ObligationTree + Send + Sync + 'static) -> Self {
        ObligationTree::Deferred(Thunk::new(produce))
    }

    /// Conjunction of independently required obligations
    pub fn all_of(obligations: impl IntoIterator<Item = Obligation>) -> Self {
        ObligationTree::All(obligations.into_iter().map(ObligationTree::Leaf).collect())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ObligationTree::Success)
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, ObligationTree::Fail)
    }

    /// Collapse the tree bottom-up using the absorbing elements
    pub fn reduce(&self) -> ObligationTree {
        match self {
            ObligationTree::All(children) => {
                let reduced: Vec<_> = children.iter().map(ObligationTree::reduce).collect();
                Self::normalize_all(reduced)
            }
            ObligationTree::Any(children) => {
                let reduced: Vec<_> = children.iter().map(ObligationTree::reduce).collect();
                Self::normalize_any(reduced)
            }
            other => other.clone(),
        }
    }

    /// Build a conjunction from already-reduced children
    pub fn normalize_all(children: Vec<ObligationTree>) -> ObligationTree {
        if children.iter().any(ObligationTree::is_fail) {
            return ObligationTree::Fail;
        }
        let mut kept = dedup(children.into_iter().filter(|c| !c.is_success()));
        match kept.len() {
            0 => ObligationTree::Success,
            1 => kept.remove(0),
            _ => ObligationTree::All(kept),
        }
    }

    /// Build a disjunction from already-reduced children
    pub fn normalize_any(children: Vec<ObligationTree>) -> ObligationTree {
        if children.iter().any(ObligationTree::is_success) {
            return ObligationTree::Success;
        }
        let mut kept = dedup(children.into_iter().filter(|c| !c.is_fail()));
        match kept.len() {
            0 => ObligationTree::Fail,
            1 => kept.remove(0),
            _ => ObligationTree::Any(kept),
        }
    }

    /// Obligations still sitting in leaves, in tree order
    ///
    /// Deferred nodes contribute their subtree only if already forced.
    pub fn leaves(&self) -> Vec<&Obligation> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Obligation>) {
        match self {
            ObligationTree::Leaf(o) => out.push(o),
            ObligationTree::Deferred(thunk) => {
                if thunk.is_forced() {
                    thunk.force().collect_leaves(out);
                }
            }
            ObligationTree::All(children) | ObligationTree::Any(children) => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
            ObligationTree::Success | ObligationTree::Fail => {}
        }
    }

    /// Number of nodes, not descending into deferred subtrees
    pub fn node_count(&self) -> usize {
        match self {
            ObligationTree::All(children) | ObligationTree::Any(children) => {
                1 + children.iter().map(ObligationTree::node_count).sum::<usize>()
            }
            _ => 1,
        }
    }
}

/// Drop later duplicates, keeping first occurrences in order
fn dedup(children: impl Iterator<Item = ObligationTree>) -> Vec<ObligationTree> {
    let mut kept: Vec<ObligationTree> = Vec::new();
    for child in children {
        if !kept.contains(&child) {
            kept.push(child);
        }
    }
    kept
}

impl fmt::Display for ObligationTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObligationTree::Leaf(o) if o.name.is_empty() => write!(f, "leaf({})", o.goal),
            ObligationTree::Leaf(o) => write!(f, "leaf[{}]", o.name),
            ObligationTree::Deferred(_) => write!(f, "deferred"),
            ObligationTree::All(children) | ObligationTree::Any(children) => {
                let op = if matches!(self, ObligationTree::All(_)) { "all" } else { "any" };
                write!(f, "{}(", op)?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", child)?;
                }
                write!(f, ")")
            }
            ObligationTree::Success => write!(f, "success"),
            ObligationTree::Fail => write!(f, "fail"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Term;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ob(goal: &str) -> Obligation {
        Obligation::new(goal, vec![], Term::var(goal))
    }

    fn leaf(goal: &str) -> ObligationTree {
        ObligationTree::Leaf(ob(goal))
    }

    #[test]
    fn test_empty_lists() {
        assert_eq!(ObligationTree::All(vec![]).reduce(), ObligationTree::Success);
        assert_eq!(ObligationTree::Any(vec![]).reduce(), ObligationTree::Fail);
    }

    #[test]
    fn test_singletons_unwrap() {
        assert_eq!(ObligationTree::All(vec![leaf("a")]).reduce(), leaf("a"));
        assert_eq!(ObligationTree::Any(vec![leaf("a")]).reduce(), leaf("a"));
    }

    #[test]
    fn test_absorbing_elements() {
        use ObligationTree::*;
        assert_eq!(All(vec![Success, leaf("o")]).reduce(), leaf("o"));
        assert_eq!(All(vec![Fail, leaf("o")]).reduce(), Fail);
        assert_eq!(Any(vec![Fail, leaf("o")]).reduce(), leaf("o"));
        assert_eq!(Any(vec![Success, leaf("o")]).reduce(), Success);
    }

    #[test]
    fn test_dedup_keeps_first_order() {
        use ObligationTree::*;
        let tree = All(vec![leaf("b"), leaf("a"), leaf("b"), Success, leaf("c")]);
        assert_eq!(tree.reduce(), All(vec![leaf("b"), leaf("a"), leaf("c")]));
        assert_eq!(All(vec![leaf("o"), leaf("o")]).reduce(), leaf("o"));
    }

    #[test]
    fn test_nested_collapse() {
        use ObligationTree::*;
        let tree = All(vec![
            Any(vec![Fail, All(vec![Success, Success])]),
            Any(vec![leaf("x"), Fail]),
        ]);
        assert_eq!(tree.reduce(), leaf("x"));
    }

    #[test]
    fn test_structurally_equal_subtrees_dedup() {
        use ObligationTree::*;
        let tree = Any(vec![
            All(vec![leaf("a"), leaf("b")]),
            All(vec![leaf("a"), Success, leaf("b")]),
        ]);
        assert_eq!(tree.reduce(), All(vec![leaf("a"), leaf("b")]));
    }

    #[test]
    fn test_reduce_does_not_force_deferred() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let tree = ObligationTree::All(vec![
            ObligationTree::deferred(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                ObligationTree::Success
            }),
            ObligationTree::Success,
        ]);
        let reduced = tree.reduce();
        assert!(matches!(reduced, ObligationTree::Deferred(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(reduced.reduce(), reduced);
    }

    #[test]
    fn test_thunk_memoizes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let thunk = Thunk::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            leaf("lazy")
        });
        let shared = thunk.clone();
        assert!(!thunk.is_forced());
        assert_eq!(thunk.force(), &leaf("lazy"));
        assert_eq!(shared.force(), &leaf("lazy"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(thunk, shared);
        assert_ne!(thunk, Thunk::new(|| ObligationTree::Success));
    }

    #[test]
    fn test_leaves_in_order() {
        use ObligationTree::*;
        let tree = All(vec![leaf("a"), Any(vec![leaf("b"), Success]), leaf("c")]);
        let names: Vec<_> = tree.leaves().iter().map(|o| o.name.clone()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(tree.node_count(), 6);
    }

    #[test]
    fn test_display() {
        use ObligationTree::*;
        let tree = All(vec![leaf("a"), Any(vec![leaf("b"), Fail])]);
        assert_eq!(tree.to_string(), "all(leaf[a], any(leaf[b], fail))");
    }
}
