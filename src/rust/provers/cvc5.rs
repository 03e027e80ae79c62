// SPDX-License-Identifier: PMPL-1.0-or-later

//! CVC5 SMT solver invocation

use super::smtlib::{smt_answer, SmtAnswer};
use super::{ProverLimits, VerdictStatus};

pub fn command_args(input: &str, limits: &ProverLimits) -> Vec<String> {
    // no memory switch in cvc5
    vec![
        "--lang=smt2".to_string(),
        format!("--tlimit={}", limits.time.as_millis().max(1)),
        input.to_string(),
    ]
}

pub fn parse_output(output: &str) -> VerdictStatus {
    match smt_answer(output) {
        Some(SmtAnswer::Unsat) => VerdictStatus::Valid,
        Some(SmtAnswer::Sat) => VerdictStatus::Invalid,
        Some(SmtAnswer::Timeout) => VerdictStatus::Timeout,
        Some(SmtAnswer::Unknown) => VerdictStatus::Unknown,
        None if output.contains("interrupted by timeout") => VerdictStatus::Timeout,
        None => VerdictStatus::Failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_args_use_milliseconds() {
        let limits = ProverLimits {
            time: Duration::from_secs(2),
            memory_mb: 100,
        };
        let args = command_args("q.smt2", &limits);
        assert!(args.contains(&"--tlimit=2000".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("q.smt2"));
    }

    #[test]
    fn test_parse() {
        assert_eq!(parse_output("unsat"), VerdictStatus::Valid);
        assert_eq!(
            parse_output("cvc5 interrupted by timeout."),
            VerdictStatus::Timeout
        );
    }
}
