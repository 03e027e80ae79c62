// SPDX-License-Identifier: PMPL-1.0-or-later

//! Attempt-and-reduce walk over an obligation tree
//!
//! `All` children are always all attempted, so every unproved obligation
//! stays visible in the result. `Any` children are attempted in order and
//! the walk stops at the first success: later alternatives are usually the
//! expensive ones.

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};

use crate::core::Obligation;
use crate::tree::ObligationTree;

/// Predicate deciding whether a single obligation can be discharged
#[async_trait]
pub trait Attempt: Send + Sync {
    async fn attempt(&self, obligation: &Obligation) -> bool;
}

/// Adapter for synchronous closures
pub struct FnAttempt<F>(pub F);

#[async_trait]
impl<F> Attempt for FnAttempt<F>
where
    F: Fn(&Obligation) -> bool + Send + Sync,
{
    async fn attempt(&self, obligation: &Obligation) -> bool {
        (self.0)(obligation)
    }
}

/// Walks a tree with one predicate
pub struct TreeSearch<'a, P: Attempt + ?Sized> {
    predicate: &'a P,
}

impl<'a, P: Attempt + ?Sized> TreeSearch<'a, P> {
    pub fn new(predicate: &'a P) -> Self {
        TreeSearch { predicate }
    }

    /// Attempt every reachable leaf and return the residual tree
    pub fn run(&self, tree: ObligationTree) -> BoxFuture<'_, ObligationTree> {
        async move {
            match tree {
                ObligationTree::Leaf(obligation) => {
                    if self.predicate.attempt(&obligation).await {
                        ObligationTree::Success
                    } else {
                        ObligationTree::Leaf(obligation)
                    }
                }
                ObligationTree::Deferred(thunk) => {
                    let forced = thunk.force().clone();
                    self.run(forced).await
                }
                ObligationTree::All(children) => {
                    let mut remaining = Vec::with_capacity(children.len());
                    for child in children {
                        let result = self.run(child).await;
                        if !result.is_success() {
                            remaining.push(result);
                        }
                    }
                    ObligationTree::normalize_all(remaining)
                }
                ObligationTree::Any(children) => {
                    let mut failed = Vec::with_capacity(children.len());
                    for child in children {
                        let result = self.run(child).await;
                        if result.is_success() {
                            return ObligationTree::Success;
                        }
                        failed.push(result);
                    }
                    ObligationTree::normalize_any(failed)
                }
                terminal => terminal,
            }
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Term;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    fn ob(name: &str) -> Obligation {
        Obligation::new(name, vec![], Term::var(name))
    }

    fn leaf(name: &str) -> ObligationTree {
        ObligationTree::Leaf(ob(name))
    }

    /// Succeeds on the listed names and records every call
    struct Recorder {
        provable: Vec<&'static str>,
        calls: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn new(provable: Vec<&'static str>) -> Self {
            Recorder {
                provable,
                calls: Mutex::new(vec![]),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Attempt for Recorder {
        async fn attempt(&self, obligation: &Obligation) -> bool {
            self.calls.lock().unwrap().push(obligation.name.clone());
            self.provable.contains(&obligation.name.as_str())
        }
    }

    #[tokio::test]
    async fn test_any_short_circuits_in_order() {
        let recorder = Recorder::new(vec!["a"]);
        let tree = ObligationTree::Any(vec![leaf("a"), leaf("b")]);
        let result = TreeSearch::new(&recorder).run(tree).await;
        assert_eq!(result, ObligationTree::Success);
        assert_eq!(recorder.calls(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_all_tries_every_child() {
        let recorder = Recorder::new(vec!["b"]);
        let tree = ObligationTree::All(vec![leaf("a"), leaf("b")]);
        let result = TreeSearch::new(&recorder).run(tree).await;
        assert_eq!(result, leaf("a"));
        assert_eq!(recorder.calls(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_failed_any_keeps_alternatives() {
        let recorder = Recorder::new(vec![]);
        let tree = ObligationTree::Any(vec![leaf("a"), ObligationTree::Fail, leaf("b")]);
        let result = TreeSearch::new(&recorder).run(tree).await;
        assert_eq!(result, ObligationTree::Any(vec![leaf("a"), leaf("b")]));
    }

    #[tokio::test]
    async fn test_deferred_forced_during_search() {
        let recorder = Recorder::new(vec!["lazy"]);
        let tree = ObligationTree::All(vec![
            ObligationTree::deferred(|| ObligationTree::Leaf(ob("lazy"))),
            leaf("x"),
        ]);
        let result = TreeSearch::new(&recorder).run(tree).await;
        assert_eq!(result, leaf("x"));
        assert_eq!(recorder.calls(), vec!["lazy", "x"]);
    }

    #[tokio::test]
    async fn test_fail_inside_all_absorbs() {
        let recorder = Recorder::new(vec!["a"]);
        let tree = ObligationTree::All(vec![leaf("a"), ObligationTree::Fail, leaf("b")]);
        let result = TreeSearch::new(&recorder).run(tree).await;
        assert_eq!(result, ObligationTree::Fail);
        assert_eq!(recorder.calls(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_fn_attempt() {
        let predicate = FnAttempt(|o: &Obligation| o.name.starts_with('p'));
        let tree = ObligationTree::All(vec![leaf("p1"), leaf("q1"), leaf("p2")]);
        let result = TreeSearch::new(&predicate).run(tree).await;
        assert_eq!(result, leaf("q1"));
    }
}
