// SPDX-FileCopyrightText: 2025 KVPROVE Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Property-based testing generators for KVPROVE types

use kvprove::core::{Obligation, Term};
use kvprove::tree::ObligationTree;
use proptest::prelude::*;

/// Strategy for generating variable names from a small pool, so that
/// duplicates actually occur
pub fn var_name() -> impl Strategy<Value = String> {
    "[a-e]".prop_map(|s| s.to_string())
}

/// Strategy for generating obligations `h |- g` over the small pool
pub fn obligation() -> impl Strategy<Value = Obligation> {
    (prop::option::of(var_name()), var_name()).prop_map(|(hyp, goal)| {
        let hypotheses = hyp.map(Term::var).into_iter().collect();
        Obligation::new(goal.clone(), hypotheses, Term::var(goal))
    })
}

/// Strategy for generating trees without deferred nodes
pub fn tree_with_depth(depth: u32) -> impl Strategy<Value = ObligationTree> {
    let leaf = prop_oneof![
        6 => obligation().prop_map(ObligationTree::Leaf),
        1 => Just(ObligationTree::Success),
        1 => Just(ObligationTree::Fail),
    ];
    leaf.prop_recursive(depth, 64, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(ObligationTree::All),
            prop::collection::vec(inner, 0..5).prop_map(ObligationTree::Any),
        ]
    })
}
