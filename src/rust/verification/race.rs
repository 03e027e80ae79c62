// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prover racing
//!
//! Every configured prover is launched on the same obligation. The running
//! processes are polled at a short interval instead of awaited one by one,
//! because a faster prover may finish first and the rest must then be
//! cancelled. The first valid verdict wins.

use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use super::search::Attempt;
use crate::core::Obligation;
use crate::error::{VerifyError, VerifyResult};
use crate::provers::{ProverLauncher, ProverLimits, ProverProcess, ProverVerdict};

/// Default polling period for running provers
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Races a fixed set of provers under fixed limits
#[derive(Clone)]
pub struct ProverRace {
    launchers: Vec<Arc<dyn ProverLauncher>>,
    limits: ProverLimits,
    poll_interval: Duration,
}

impl ProverRace {
    pub fn new(launchers: Vec<Arc<dyn ProverLauncher>>, limits: ProverLimits) -> Self {
        ProverRace {
            launchers,
            limits,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn limits(&self) -> &ProverLimits {
        &self.limits
    }

    pub fn prover_names(&self) -> Vec<&str> {
        self.launchers.iter().map(|l| l.name()).collect()
    }

    /// Run all provers on `obligation`; `Ok(true)` once any reports valid
    pub async fn race(&self, obligation: &Obligation) -> VerifyResult<bool> {
        if self.launchers.is_empty() {
            return Err(VerifyError::NoProvers);
        }

        let mut running: Vec<Box<dyn ProverProcess>> = Vec::with_capacity(self.launchers.len());
        for launcher in &self.launchers {
            match launcher.launch(obligation, &self.limits).await {
                Ok(process) => running.push(process),
                Err(e) => warn!("Failed to launch {}: {:#}", launcher.name(), e),
            }
        }

        while !running.is_empty() {
            let mut i = 0;
            while i < running.len() {
                match running[i].poll() {
                    Ok(None) => i += 1,
                    Ok(Some(verdict)) => {
                        running.remove(i);
                        self.record(obligation, &verdict);
                        if verdict.is_valid() {
                            self.cancel_all(obligation, running).await;
                            return Ok(true);
                        }
                    }
                    Err(e) => {
                        warn!("Lost track of {}: {:#}", running[i].prover(), e);
                        let mut process = running.remove(i);
                        let verdict = process.cancel().await;
                        self.record(obligation, &verdict);
                    }
                }
            }
            if !running.is_empty() {
                tokio::time::sleep(self.poll_interval).await;
            }
        }

        Ok(false)
    }

    /// Cancel the losers concurrently so one slow exit does not delay the rest
    async fn cancel_all(&self, obligation: &Obligation, mut running: Vec<Box<dyn ProverProcess>>) {
        let verdicts = join_all(running.iter_mut().map(|p| p.cancel())).await;
        for verdict in &verdicts {
            self.record(obligation, verdict);
        }
    }

    fn record(&self, obligation: &Obligation, verdict: &ProverVerdict) {
        debug!(
            "{} on {}: {:?} after {:?}",
            verdict.prover, obligation.name, verdict.status, verdict.elapsed
        );
        if verdict.reports_inconsistency() {
            warn!(
                "{} reports an inconsistent assumption ({:?}) in:\n{}",
                verdict.prover,
                verdict.status,
                obligation.render()
            );
        }
    }
}

#[async_trait]
impl Attempt for ProverRace {
    async fn attempt(&self, obligation: &Obligation) -> bool {
        match self.race(obligation).await {
            Ok(proved) => proved,
            Err(e) => {
                error!("Cannot attempt {}: {}", obligation.name, e);
                false
            }
        }
    }
}
