// SPDX-FileCopyrightText: 2025 KVPROVE Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Mock prover launchers for testing

use async_trait::async_trait;
use kvprove::core::Obligation;
use kvprove::provers::{ProverLauncher, ProverLimits, ProverProcess, ProverVerdict, VerdictStatus};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

type Decide = Arc<dyn Fn(&Obligation) -> VerdictStatus + Send + Sync>;

/// A prover that answers after a fixed delay without spawning anything
#[derive(Clone)]
pub struct MockProver {
    pub name: String,
    pub delay: Duration,
    pub fail_launch: bool,
    pub output: String,
    decide: Decide,
    launches: Arc<Mutex<Vec<String>>>,
    cancellations: Arc<AtomicUsize>,
}

impl MockProver {
    /// Create a mock that answers `status` for every obligation
    pub fn new(name: &str, status: VerdictStatus, delay: Duration) -> Self {
        Self::deciding(name, delay, move |_| status)
    }

    /// Create a mock whose verdict depends on the obligation
    pub fn deciding(
        name: &str,
        delay: Duration,
        decide: impl Fn(&Obligation) -> VerdictStatus + Send + Sync + 'static,
    ) -> Self {
        MockProver {
            name: name.to_string(),
            delay,
            fail_launch: false,
            output: String::new(),
            decide: Arc::new(decide),
            launches: Arc::new(Mutex::new(vec![])),
            cancellations: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Every launch fails operationally
    pub fn broken(name: &str) -> Self {
        let mut prover = Self::new(name, VerdictStatus::Failed, Duration::ZERO);
        prover.fail_launch = true;
        prover
    }

    pub fn with_output(mut self, output: &str) -> Self {
        self.output = output.to_string();
        self
    }

    /// Names of the obligations this prover was launched on, in order
    pub fn launches(&self) -> Vec<String> {
        self.launches.lock().unwrap().clone()
    }

    pub fn launch_count(&self) -> usize {
        self.launches.lock().unwrap().len()
    }

    pub fn cancellations(&self) -> usize {
        self.cancellations.load(Ordering::SeqCst)
    }

    pub fn launcher(&self) -> Arc<dyn ProverLauncher> {
        Arc::new(self.clone())
    }
}

#[async_trait]
impl ProverLauncher for MockProver {
    fn name(&self) -> &str {
        &self.name
    }

    async fn launch(
        &self,
        obligation: &Obligation,
        _limits: &ProverLimits,
    ) -> anyhow::Result<Box<dyn ProverProcess>> {
        self.launches.lock().unwrap().push(obligation.name.clone());
        if self.fail_launch {
            anyhow::bail!("{} is not installed", self.name);
        }
        Ok(Box::new(MockProcess {
            name: self.name.clone(),
            status: (self.decide)(obligation),
            output: self.output.clone(),
            started: Instant::now(),
            delay: self.delay,
            cancellations: self.cancellations.clone(),
        }))
    }
}

struct MockProcess {
    name: String,
    status: VerdictStatus,
    output: String,
    started: Instant,
    delay: Duration,
    cancellations: Arc<AtomicUsize>,
}

#[async_trait]
impl ProverProcess for MockProcess {
    fn prover(&self) -> &str {
        &self.name
    }

    fn poll(&mut self) -> anyhow::Result<Option<ProverVerdict>> {
        let elapsed = self.started.elapsed();
        if elapsed < self.delay {
            return Ok(None);
        }
        Ok(Some(ProverVerdict {
            prover: self.name.clone(),
            status: self.status,
            output: self.output.clone(),
            elapsed,
        }))
    }

    async fn cancel(&mut self) -> ProverVerdict {
        self.cancellations.fetch_add(1, Ordering::SeqCst);
        ProverVerdict {
            prover: self.name.clone(),
            status: VerdictStatus::Cancelled,
            output: String::new(),
            elapsed: self.started.elapsed(),
        }
    }
}
