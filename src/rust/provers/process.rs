// SPDX-License-Identifier: PMPL-1.0-or-later

//! External prover processes
//!
//! The obligation is written to a temporary `.smt2` file and the prover's
//! stdout and stderr go to a second temporary file, so a prover that prints
//! a lot can never stall on a full pipe while nobody is reading. Both files
//! are removed when the process value is dropped.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use super::smtlib::render_obligation;
use super::{ProverKind, ProverLauncher, ProverLimits, ProverProcess, ProverVerdict, VerdictStatus};
use crate::core::Obligation;

/// Launcher for an installed prover binary
#[derive(Debug, Clone)]
pub struct ExternalProver {
    kind: ProverKind,
    name: String,
    executable: PathBuf,
    args: Vec<String>,
    kill_grace: Duration,
}

impl ExternalProver {
    pub fn new(kind: ProverKind, executable: impl Into<PathBuf>) -> Self {
        ExternalProver {
            kind,
            name: kind.to_string(),
            executable: executable.into(),
            args: vec![],
            kill_grace: Duration::from_secs(2),
        }
    }

    /// Extra arguments placed before the generated ones
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// How long to wait for exit after a kill before abandoning the process
    pub fn with_kill_grace(mut self, grace: Duration) -> Self {
        self.kill_grace = grace;
        self
    }

    pub fn kind(&self) -> ProverKind {
        self.kind
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    fn write_input(&self, obligation: &Obligation) -> Result<NamedTempFile> {
        let mut input = tempfile::Builder::new()
            .prefix("kvprove-")
            .suffix(".smt2")
            .tempfile()
            .context("Failed to create prover input file")?;
        input
            .write_all(render_obligation(obligation).as_bytes())
            .context("Failed to write prover input file")?;
        input.flush()?;
        Ok(input)
    }
}

#[async_trait]
impl ProverLauncher for ExternalProver {
    fn name(&self) -> &str {
        &self.name
    }

    async fn launch(
        &self,
        obligation: &Obligation,
        limits: &ProverLimits,
    ) -> Result<Box<dyn ProverProcess>> {
        let input = self.write_input(obligation)?;
        let output = tempfile::Builder::new()
            .prefix("kvprove-")
            .suffix(".out")
            .tempfile()
            .context("Failed to create prover output file")?;
        let stdout = output.reopen().context("Failed to open prover output file")?;
        let stderr = stdout.try_clone()?;

        let input_path = input.path().to_string_lossy().into_owned();
        let mut cmd = Command::new(&self.executable);
        cmd.args(&self.args)
            .args(self.kind.command_args(&input_path, limits))
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .with_context(|| format!("Failed to spawn {}: {:?}", self.name, self.executable))?;
        debug!("Launched {} on {}", self.name, input_path);

        Ok(Box::new(ExternalProcess {
            kind: self.kind,
            name: self.name.clone(),
            child,
            _input: input,
            output,
            started: Instant::now(),
            deadline: limits.time + self.kill_grace,
            kill_grace: self.kill_grace,
        }))
    }
}

/// A running prover child process and its temporary files
pub struct ExternalProcess {
    kind: ProverKind,
    name: String,
    child: Child,
    _input: NamedTempFile,
    output: NamedTempFile,
    started: Instant,
    deadline: Duration,
    kill_grace: Duration,
}

impl ExternalProcess {
    fn read_output(&self) -> String {
        match std::fs::read(self.output.path()) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                warn!("Could not read output of {}: {}", self.name, e);
                String::new()
            }
        }
    }

    fn verdict(&self, status: VerdictStatus, output: String) -> ProverVerdict {
        ProverVerdict {
            prover: self.name.clone(),
            status,
            output,
            elapsed: self.started.elapsed(),
        }
    }

    /// Kill, then wait at most the grace period for the child to exit
    async fn terminate(&mut self) {
        if let Err(e) = self.child.start_kill() {
            debug!("Kill signal to {} not delivered: {}", self.name, e);
        }
        if tokio::time::timeout(self.kill_grace, self.child.wait())
            .await
            .is_err()
        {
            warn!(
                "{} did not exit within {:?} of the kill signal; abandoning it",
                self.name, self.kill_grace
            );
        }
    }
}

#[async_trait]
impl ProverProcess for ExternalProcess {
    fn prover(&self) -> &str {
        &self.name
    }

    fn poll(&mut self) -> Result<Option<ProverVerdict>> {
        let status = self
            .child
            .try_wait()
            .with_context(|| format!("Failed to poll {}", self.name))?;

        match status {
            Some(exit) => {
                let output = self.read_output();
                let mut verdict = self.kind.parse_output(&output);
                if verdict == VerdictStatus::Failed && exit.success() {
                    verdict = VerdictStatus::Unknown;
                }
                Ok(Some(self.verdict(verdict, output)))
            }
            None if self.started.elapsed() > self.deadline => {
                // Ignored its own time limit
                warn!("{} exceeded {:?}; killing it", self.name, self.deadline);
                if let Err(e) = self.child.start_kill() {
                    debug!("Kill signal to {} not delivered: {}", self.name, e);
                }
                let output = self.read_output();
                Ok(Some(self.verdict(VerdictStatus::Timeout, output)))
            }
            None => Ok(None),
        }
    }

    async fn cancel(&mut self) -> ProverVerdict {
        self.terminate().await;
        let output = self.read_output();
        self.verdict(VerdictStatus::Cancelled, output)
    }
}
