// SPDX-FileCopyrightText: 2025 KVPROVE Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Run configuration
//!
//! Loaded from TOML, overridden from the command line, then passed
//! explicitly into the pipeline.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{VerifyError, VerifyResult};
use crate::provers::{ProverKind, ProverLimits};

/// Depth bound for repeated congruence closure
pub const DEFAULT_CONGRUENCE_DEPTH: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// Provers raced on every obligation
    pub provers: Vec<ProverKind>,

    /// Executable overrides, keyed by prover name
    pub executables: BTreeMap<String, PathBuf>,

    /// Per-call time limit of the direct phase (seconds)
    pub direct_time_limit_secs: u64,

    /// Per-call time limit of the transformation phases (seconds)
    pub time_limit_secs: u64,

    /// Per-call memory limit (megabytes)
    pub memory_limit_mb: u64,

    /// Recursion bound of the congruence phase
    pub congruence_depth: usize,

    /// Run the transformation phases after the direct phase
    pub transformations: bool,

    /// Helper symbol removed by the auxiliary-elimination phase
    pub auxiliary_symbol: String,

    /// Re-simplify obligations after equality weakening
    pub resimplify_after_weakening: bool,

    /// How often running provers are polled (milliseconds)
    pub poll_interval_ms: u64,

    /// Grace period before a killed prover is abandoned (milliseconds)
    pub kill_grace_ms: u64,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        VerifyConfig {
            provers: vec![ProverKind::Z3, ProverKind::CVC5],
            executables: BTreeMap::new(),
            direct_time_limit_secs: 5,
            time_limit_secs: 30,
            memory_limit_mb: 2048,
            congruence_depth: DEFAULT_CONGRUENCE_DEPTH,
            transformations: true,
            auxiliary_symbol: "aux".to_string(),
            resimplify_after_weakening: true,
            poll_interval_ms: 25,
            kill_grace_ms: 2000,
        }
    }
}

impl VerifyConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config TOML: {}", path.display()))
    }

    /// Reject configurations the pipeline cannot run with
    pub fn validate(&self) -> VerifyResult<()> {
        if self.provers.is_empty() {
            return Err(VerifyError::NoProvers);
        }
        Ok(())
    }

    pub fn executable(&self, kind: ProverKind) -> PathBuf {
        self.executables
            .get(&kind.to_string())
            .cloned()
            .unwrap_or_else(|| kind.default_executable())
    }

    pub fn direct_limits(&self) -> ProverLimits {
        ProverLimits {
            time: Duration::from_secs(self.direct_time_limit_secs),
            memory_mb: self.memory_limit_mb,
        }
    }

    pub fn limits(&self) -> ProverLimits {
        ProverLimits {
            time: Duration::from_secs(self.time_limit_secs),
            memory_mb: self.memory_limit_mb,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn kill_grace(&self) -> Duration {
        Duration::from_millis(self.kill_grace_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = VerifyConfig::default();
        assert_eq!(config.congruence_depth, 10);
        assert!(config.transformations);
        assert!(config.validate().is_ok());
        assert_eq!(config.executable(ProverKind::Z3), PathBuf::from("z3"));
        assert_eq!(config.direct_limits().time, Duration::from_secs(5));
    }

    #[test]
    fn test_empty_provers_rejected() {
        let config = VerifyConfig {
            provers: vec![],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(VerifyError::NoProvers)));
    }

    #[test]
    fn test_partial_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
provers = ["alt-ergo", "vampire"]
time_limit_secs = 60
transformations = false

[executables]
vampire = "/opt/vampire/bin/vampire"
"#
        )
        .unwrap();

        let config = VerifyConfig::from_file(file.path()).unwrap();
        assert_eq!(config.provers, vec![ProverKind::AltErgo, ProverKind::Vampire]);
        assert_eq!(config.limits().time, Duration::from_secs(60));
        assert!(!config.transformations);
        assert_eq!(config.memory_limit_mb, 2048);
        assert_eq!(
            config.executable(ProverKind::Vampire),
            PathBuf::from("/opt/vampire/bin/vampire")
        );
    }
}
