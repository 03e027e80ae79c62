// SPDX-License-Identifier: PMPL-1.0-or-later

//! Multi-phase verification pipeline
//!
//! Phases run in a fixed order, each one narrowing the residual tree left by
//! the previous one:
//!
//! 1. direct: race the provers on each obligation as is
//! 2. auxiliary elimination: drop the helper symbol, re-simplify, prove all
//! 3. congruence: rewrite modulo hypothesis equalities, bounded recursion
//! 4. equality weakening: replace a goal equality by `false`, prove all

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use super::race::ProverRace;
use super::search::{Attempt, TreeSearch};
use crate::config::VerifyConfig;
use crate::core::Obligation;
use crate::error::{VerifyError, VerifyResult};
use crate::provers::ProverLauncher;
use crate::simplify::Simplifier;
use crate::tree::ObligationTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Direct,
    AuxiliaryElimination,
    Congruence,
    EqualityWeakening,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::Direct,
        Phase::AuxiliaryElimination,
        Phase::Congruence,
        Phase::EqualityWeakening,
    ];
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Direct => "direct",
            Phase::AuxiliaryElimination => "auxiliary elimination",
            Phase::Congruence => "congruence",
            Phase::EqualityWeakening => "equality weakening",
        };
        f.write_str(name)
    }
}

/// What one phase left behind
#[derive(Debug, Clone, Serialize)]
pub struct PhaseSummary {
    pub phase: Phase,
    /// Unsolved leaves after the phase
    pub remaining: usize,
    pub elapsed_ms: u64,
}

/// Final outcome of a run
#[derive(Debug, Clone)]
pub struct VerificationReport {
    /// Residual tree; `Success` when everything was proved
    pub residual: ObligationTree,
    pub phases: Vec<PhaseSummary>,
}

impl VerificationReport {
    pub fn is_verified(&self) -> bool {
        self.residual.is_success()
    }

    /// Obligations still unverified
    pub fn unsolved(&self) -> Vec<&Obligation> {
        self.residual.leaves()
    }
}

/// Runs the proof phases over an obligation tree
pub struct VerificationPipeline {
    direct: ProverRace,
    race: ProverRace,
    simplifier: Arc<dyn Simplifier>,
    transformations: bool,
    auxiliary_symbol: String,
    congruence_depth: usize,
    resimplify_after_weakening: bool,
}

impl VerificationPipeline {
    /// Fails with [`VerifyError::NoProvers`] before anything is launched
    pub fn new(
        config: &VerifyConfig,
        launchers: Vec<Arc<dyn ProverLauncher>>,
        simplifier: Arc<dyn Simplifier>,
    ) -> VerifyResult<Self> {
        if launchers.is_empty() {
            return Err(VerifyError::NoProvers);
        }
        let poll = config.poll_interval();
        Ok(VerificationPipeline {
            direct: ProverRace::new(launchers.clone(), config.direct_limits()).with_poll_interval(poll),
            race: ProverRace::new(launchers, config.limits()).with_poll_interval(poll),
            simplifier,
            transformations: config.transformations,
            auxiliary_symbol: config.auxiliary_symbol.clone(),
            congruence_depth: config.congruence_depth,
            resimplify_after_weakening: config.resimplify_after_weakening,
        })
    }

    pub fn phases(&self) -> Vec<Phase> {
        if self.transformations {
            Phase::ALL.to_vec()
        } else {
            vec![Phase::Direct]
        }
    }

    /// Conjunction of all obligations, each one either its simplified
    /// fragments or, failing those, the raw obligation
    pub fn initial_tree(&self, obligations: Vec<Obligation>) -> ObligationTree {
        let children = obligations
            .into_iter()
            .map(|obligation| {
                let fragments = self.simplifier.simplify(&obligation);
                info!(
                    "{}: size {} -> {} fragment(s) of total size {}",
                    obligation.name,
                    obligation.size(),
                    fragments.len(),
                    fragments.iter().map(Obligation::size).sum::<usize>()
                );
                ObligationTree::Any(vec![
                    ObligationTree::all_of(fragments),
                    ObligationTree::Leaf(obligation),
                ])
            })
            .collect();
        ObligationTree::All(children)
    }

    /// Build the initial tree and run every phase on it
    pub async fn verify(&self, obligations: Vec<Obligation>) -> VerificationReport {
        let tree = self.initial_tree(obligations);
        self.run(tree).await
    }

    pub async fn run(&self, tree: ObligationTree) -> VerificationReport {
        let mut tree = tree.reduce();
        let mut phases = Vec::new();

        for phase in self.phases() {
            if tree.is_success() {
                break;
            }
            let started = Instant::now();
            info!("Phase {}: {} obligation(s) open", phase, tree.leaves().len());

            let attempt = PhaseAttempt { pipeline: self, phase };
            tree = TreeSearch::new(&attempt).run(tree).await.reduce();

            let remaining = tree.leaves();
            for obligation in &remaining {
                debug!("  open after {}: {} (size {})", phase, obligation.name, obligation.size());
            }
            phases.push(PhaseSummary {
                phase,
                remaining: remaining.len(),
                elapsed_ms: started.elapsed().as_millis() as u64,
            });
        }

        VerificationReport {
            residual: tree,
            phases,
        }
    }

    /// Every fragment must be proved by the full-budget race
    async fn prove_all(&self, fragments: &[Obligation]) -> bool {
        for fragment in fragments {
            if !self.race.attempt(fragment).await {
                return false;
            }
        }
        true
    }

    async fn attempt_auxiliary(&self, obligation: &Obligation) -> bool {
        let eliminated = self
            .simplifier
            .eliminate_auxiliary(obligation, &self.auxiliary_symbol);
        if eliminated.len() == 1 && eliminated[0] == *obligation {
            return false;
        }
        let fragments: Vec<Obligation> = eliminated
            .iter()
            .flat_map(|o| self.simplifier.simplify(o))
            .collect();
        self.prove_all(&fragments).await
    }

    /// Bounded congruence retry, kept as an explicit worklist
    async fn attempt_congruence(&self, obligation: &Obligation) -> bool {
        let mut work = vec![(obligation.clone(), 0usize)];
        while let Some((current, depth)) = work.pop() {
            if depth >= self.congruence_depth {
                debug!("{}: congruence depth {} exhausted", obligation.name, depth);
                return false;
            }
            let Some(subgoals) = self.simplifier.congruence(&current) else {
                return false;
            };
            for subgoal in subgoals {
                if !self.race.attempt(&subgoal).await {
                    work.push((subgoal, depth + 1));
                }
            }
        }
        true
    }

    async fn attempt_weakening(&self, obligation: &Obligation) -> bool {
        let weakened = self.simplifier.weaken_equality(obligation);
        if weakened.len() == 1 && weakened[0] == *obligation {
            return false;
        }
        let fragments: Vec<Obligation> = if self.resimplify_after_weakening {
            weakened
                .iter()
                .flat_map(|o| self.simplifier.simplify(o))
                .collect()
        } else {
            weakened
        };
        self.prove_all(&fragments).await
    }
}

/// Predicate for one transformation phase
struct PhaseAttempt<'a> {
    pipeline: &'a VerificationPipeline,
    phase: Phase,
}

#[async_trait]
impl Attempt for PhaseAttempt<'_> {
    async fn attempt(&self, obligation: &Obligation) -> bool {
        match self.phase {
            Phase::Direct => self.pipeline.direct.attempt(obligation).await,
            Phase::AuxiliaryElimination => self.pipeline.attempt_auxiliary(obligation).await,
            Phase::Congruence => self.pipeline.attempt_congruence(obligation).await,
            Phase::EqualityWeakening => self.pipeline.attempt_weakening(obligation).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simplify::BasicSimplifier;

    #[test]
    fn test_no_launchers_rejected() {
        let result = VerificationPipeline::new(
            &VerifyConfig::default(),
            vec![],
            Arc::new(BasicSimplifier::new()),
        );
        assert!(matches!(result, Err(VerifyError::NoProvers)));
    }

    #[test]
    fn test_phase_names() {
        assert_eq!(Phase::AuxiliaryElimination.to_string(), "auxiliary elimination");
        assert_eq!(Phase::ALL.len(), 4);
    }
}
