// SPDX-License-Identifier: PMPL-1.0-or-later

//! Alt-Ergo invocation (SMT-LIB 2 frontend)

use super::smtlib::{smt_answer, SmtAnswer};
use super::{ProverLimits, VerdictStatus};

pub fn command_args(input: &str, limits: &ProverLimits) -> Vec<String> {
    vec![
        "--timelimit".to_string(),
        limits.time.as_secs().max(1).to_string(),
        input.to_string(),
    ]
}

pub fn parse_output(output: &str) -> VerdictStatus {
    match smt_answer(output) {
        Some(SmtAnswer::Unsat) => VerdictStatus::Valid,
        Some(SmtAnswer::Sat) => VerdictStatus::Invalid,
        Some(SmtAnswer::Timeout) => VerdictStatus::Timeout,
        Some(SmtAnswer::Unknown) => VerdictStatus::Unknown,
        None => {
            // native-format answers
            if output.contains("Valid") {
                VerdictStatus::Valid
            } else if output.contains("Timeout") {
                VerdictStatus::Timeout
            } else if output.contains("I don't know") {
                VerdictStatus::Unknown
            } else if output.contains("Invalid") {
                VerdictStatus::Invalid
            } else {
                VerdictStatus::Failed
            }
        }
    }
}
