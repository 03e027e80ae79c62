// SPDX-FileCopyrightText: 2025 KVPROVE Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Z3 SMT solver invocation

use super::smtlib::{smt_answer, SmtAnswer};
use super::{ProverLimits, VerdictStatus};

pub fn command_args(input: &str, limits: &ProverLimits) -> Vec<String> {
    vec![
        "-smt2".to_string(),
        format!("-T:{}", limits.time.as_secs().max(1)),
        format!("-memory:{}", limits.memory_mb),
        input.to_string(),
    ]
}

pub fn parse_output(output: &str) -> VerdictStatus {
    match smt_answer(output) {
        Some(SmtAnswer::Unsat) => VerdictStatus::Valid,
        Some(SmtAnswer::Sat) => VerdictStatus::Invalid,
        Some(SmtAnswer::Timeout) => VerdictStatus::Timeout,
        Some(SmtAnswer::Unknown) => VerdictStatus::Unknown,
        // Z3 prints "timeout" to stdout when -T fires
        None if output.contains("timeout") => VerdictStatus::Timeout,
        None => VerdictStatus::Failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_args() {
        let limits = ProverLimits {
            time: Duration::from_secs(7),
            memory_mb: 512,
        };
        assert_eq!(
            command_args("/tmp/q.smt2", &limits),
            vec!["-smt2", "-T:7", "-memory:512", "/tmp/q.smt2"]
        );
    }

    #[test]
    fn test_parse() {
        assert_eq!(parse_output("unsat\n"), VerdictStatus::Valid);
        assert_eq!(parse_output("sat\n"), VerdictStatus::Invalid);
        assert_eq!(parse_output("unknown\n"), VerdictStatus::Unknown);
        assert_eq!(parse_output("timeout\n"), VerdictStatus::Timeout);
        assert_eq!(parse_output("(error \"line 1\")"), VerdictStatus::Failed);
    }
}
