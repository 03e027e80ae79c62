// SPDX-License-Identifier: PMPL-1.0-or-later

//! Vampire invocation in SMT-LIB 2 input mode

use super::smtlib::{smt_answer, SmtAnswer};
use super::{ProverLimits, VerdictStatus};

pub fn command_args(input: &str, limits: &ProverLimits) -> Vec<String> {
    vec![
        "--input_syntax".to_string(),
        "smtlib2".to_string(),
        "-t".to_string(),
        limits.time.as_secs().max(1).to_string(),
        "-m".to_string(),
        limits.memory_mb.to_string(),
        input.to_string(),
    ]
}

pub fn parse_output(output: &str) -> VerdictStatus {
    if output.contains("SZS status Unsatisfiable") || output.contains("SZS status Theorem") {
        return VerdictStatus::Valid;
    }
    if output.contains("SZS status Satisfiable") || output.contains("SZS status CounterSatisfiable") {
        return VerdictStatus::Invalid;
    }
    if output.contains("SZS status Timeout") || output.contains("Time limit reached") {
        return VerdictStatus::Timeout;
    }
    match smt_answer(output) {
        Some(SmtAnswer::Unsat) => VerdictStatus::Valid,
        Some(SmtAnswer::Sat) => VerdictStatus::Invalid,
        Some(SmtAnswer::Timeout) => VerdictStatus::Timeout,
        Some(SmtAnswer::Unknown) => VerdictStatus::Unknown,
        None if output.contains("SZS status") => VerdictStatus::Unknown,
        None => VerdictStatus::Failed,
    }
}
