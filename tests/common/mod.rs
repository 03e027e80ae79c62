// SPDX-FileCopyrightText: 2025 KVPROVE Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Common test utilities for the KVPROVE test suite

#![allow(dead_code)]

use kvprove::core::{Obligation, Term};
use kvprove::simplify::Simplifier;
use kvprove::VerifyConfig;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub mod generators;
pub mod mock_prover;

/// Obligation `|- goal` with a variable as goal, named after it
pub fn obligation(goal: &str) -> Obligation {
    Obligation::new(goal, vec![], Term::var(goal))
}

/// Configuration tuned for mocks: fast polling, no grace period
pub fn test_config() -> VerifyConfig {
    VerifyConfig {
        poll_interval_ms: 1,
        kill_grace_ms: 0,
        ..Default::default()
    }
}

/// Run a future with a generous upper bound so a hung race fails the test
pub async fn bounded<F: std::future::Future>(future: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(10), future)
        .await
        .expect("test future timed out")
}

/// Simplifier that leaves obligations alone and whose congruence step
/// always produces one fresh subgoal
#[derive(Default)]
pub struct EndlessCongruence {
    pub congruence_calls: AtomicUsize,
}

impl EndlessCongruence {
    pub fn calls(&self) -> usize {
        self.congruence_calls.load(Ordering::SeqCst)
    }
}

impl Simplifier for EndlessCongruence {
    fn simplify(&self, obligation: &Obligation) -> Vec<Obligation> {
        vec![obligation.clone()]
    }

    fn eliminate_auxiliary(&self, obligation: &Obligation, _symbol: &str) -> Vec<Obligation> {
        vec![obligation.clone()]
    }

    fn congruence(&self, obligation: &Obligation) -> Option<Vec<Obligation>> {
        let n = self.congruence_calls.fetch_add(1, Ordering::SeqCst);
        Some(vec![obligation.derive(
            obligation.hypotheses.clone(),
            Term::app("step", vec![obligation.goal.clone(), Term::Int(n as i64)]),
        )])
    }

    fn weaken_equality(&self, obligation: &Obligation) -> Vec<Obligation> {
        vec![obligation.clone()]
    }
}
