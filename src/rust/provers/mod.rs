// SPDX-FileCopyrightText: 2025 KVPROVE Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! External prover backends
//!
//! A [`ProverLauncher`] starts one invocation of a prover against one
//! obligation and hands back a [`ProverProcess`] that can be polled without
//! blocking and cancelled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::core::Obligation;
use crate::error::VerifyError;

pub mod altergo;
pub mod cvc5;
pub mod process;
pub mod smtlib;
pub mod vampire;
pub mod z3;

pub use process::{ExternalProcess, ExternalProver};

/// Supported automated provers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProverKind {
    #[serde(rename = "z3")]
    Z3,
    #[serde(rename = "cvc5")]
    CVC5,
    #[serde(rename = "alt-ergo")]
    AltErgo,
    #[serde(rename = "vampire")]
    Vampire,
}

impl std::str::FromStr for ProverKind {
    type Err = VerifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "z3" => Ok(ProverKind::Z3),
            "cvc5" => Ok(ProverKind::CVC5),
            "altergo" | "alt-ergo" => Ok(ProverKind::AltErgo),
            "vampire" => Ok(ProverKind::Vampire),
            _ => Err(VerifyError::UnknownProver(s.to_string())),
        }
    }
}

impl fmt::Display for ProverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProverKind::Z3 => "z3",
            ProverKind::CVC5 => "cvc5",
            ProverKind::AltErgo => "alt-ergo",
            ProverKind::Vampire => "vampire",
        };
        f.write_str(name)
    }
}

impl ProverKind {
    pub fn all() -> Vec<ProverKind> {
        vec![
            ProverKind::Z3,
            ProverKind::CVC5,
            ProverKind::AltErgo,
            ProverKind::Vampire,
        ]
    }

    /// Executable looked up on PATH when no override is configured
    pub fn default_executable(&self) -> PathBuf {
        PathBuf::from(match self {
            ProverKind::Z3 => "z3",
            ProverKind::CVC5 => "cvc5",
            ProverKind::AltErgo => "alt-ergo",
            ProverKind::Vampire => "vampire",
        })
    }

    /// Command-line arguments for one run on `input`
    pub fn command_args(&self, input: &str, limits: &ProverLimits) -> Vec<String> {
        match self {
            ProverKind::Z3 => z3::command_args(input, limits),
            ProverKind::CVC5 => cvc5::command_args(input, limits),
            ProverKind::AltErgo => altergo::command_args(input, limits),
            ProverKind::Vampire => vampire::command_args(input, limits),
        }
    }

    /// Classify the prover's combined output
    pub fn parse_output(&self, output: &str) -> VerdictStatus {
        match self {
            ProverKind::Z3 => z3::parse_output(output),
            ProverKind::CVC5 => cvc5::parse_output(output),
            ProverKind::AltErgo => altergo::parse_output(output),
            ProverKind::Vampire => vampire::parse_output(output),
        }
    }
}

/// Resource limits for a single prover invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProverLimits {
    /// Wall-clock budget handed to the prover
    pub time: Duration,
    /// Memory budget in megabytes
    pub memory_mb: u64,
}

impl Default for ProverLimits {
    fn default() -> Self {
        ProverLimits {
            time: Duration::from_secs(30),
            memory_mb: 2048,
        }
    }
}

/// Outcome classification of one prover run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerdictStatus {
    /// Obligation proved
    Valid,
    /// Prover found a countermodel
    Invalid,
    /// Prover gave up
    Unknown,
    /// Time limit hit
    Timeout,
    /// Killed because another prover already won
    Cancelled,
    /// Operational failure (crash, unreadable output)
    Failed,
}

/// Verdict of a finished or killed prover process
#[derive(Debug, Clone)]
pub struct ProverVerdict {
    pub prover: String,
    pub status: VerdictStatus,
    /// Raw textual output
    pub output: String,
    pub elapsed: Duration,
}

impl ProverVerdict {
    pub fn is_valid(&self) -> bool {
        self.status == VerdictStatus::Valid
    }

    /// Output mentions an inconsistent assumption set
    pub fn reports_inconsistency(&self) -> bool {
        self.output
            .to_lowercase()
            .contains("inconsistent assumption")
    }
}

/// One running prover invocation
#[async_trait]
pub trait ProverProcess: Send {
    /// Name of the prover behind this process
    fn prover(&self) -> &str;

    /// Non-blocking check. `Ok(None)` while still running.
    fn poll(&mut self) -> anyhow::Result<Option<ProverVerdict>>;

    /// Terminate the process and release its resources
    async fn cancel(&mut self) -> ProverVerdict;
}

/// Starts prover processes for obligations
#[async_trait]
pub trait ProverLauncher: Send + Sync {
    fn name(&self) -> &str;

    async fn launch(
        &self,
        obligation: &Obligation,
        limits: &ProverLimits,
    ) -> anyhow::Result<Box<dyn ProverProcess>>;
}

/// Build launchers for the configured prover set
pub fn launchers_for(
    kinds: &[ProverKind],
    executable: impl Fn(ProverKind) -> PathBuf,
    kill_grace: Duration,
) -> Vec<Arc<dyn ProverLauncher>> {
    kinds
        .iter()
        .map(|&kind| {
            Arc::new(ExternalProver::new(kind, executable(kind)).with_kill_grace(kill_grace))
                as Arc<dyn ProverLauncher>
        })
        .collect()
}

/// Check whether a prover executable answers `--version`
pub fn is_available(executable: &std::path::Path) -> bool {
    std::process::Command::new(executable)
        .arg("--version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prover_kind_parse() {
        assert_eq!("Z3".parse::<ProverKind>().unwrap(), ProverKind::Z3);
        assert_eq!("alt-ergo".parse::<ProverKind>().unwrap(), ProverKind::AltErgo);
        assert!("coq".parse::<ProverKind>().is_err());
    }

    #[test]
    fn test_display_roundtrips_through_parse() {
        for kind in ProverKind::all() {
            assert_eq!(kind.to_string().parse::<ProverKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_inconsistency_flag() {
        let verdict = ProverVerdict {
            prover: "alt-ergo".into(),
            status: VerdictStatus::Valid,
            output: "File \"x\", line 3: Inconsistent assumption\nunsat".into(),
            elapsed: Duration::from_millis(5),
        };
        assert!(verdict.reports_inconsistency());
        assert!(verdict.is_valid());
    }

    #[test]
    fn test_launchers_for_names() {
        let launchers = launchers_for(
            &[ProverKind::Z3, ProverKind::CVC5],
            |k| k.default_executable(),
            Duration::from_millis(100),
        );
        let names: Vec<_> = launchers.iter().map(|l| l.name().to_string()).collect();
        assert_eq!(names, vec!["z3", "cvc5"]);
    }
}
