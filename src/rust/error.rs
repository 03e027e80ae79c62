// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fatal errors of a verification run
//!
//! Proof failures are not errors: they stay in the residual tree. Process
//! failures are contained inside the race that hit them.

use thiserror::Error;

pub type VerifyResult<T> = Result<T, VerifyError>;

#[derive(Debug, Error)]
pub enum VerifyError {
    /// Empty prover set
    #[error("no provers configured")]
    NoProvers,

    /// The obligation source has nothing for the requested property
    #[error("target '{target}' not found (available: {})", available.join(", "))]
    TargetNotFound {
        target: String,
        available: Vec<String>,
    },

    #[error("unknown prover: {0}")]
    UnknownProver(String),

    /// Malformed obligation input
    #[error("invalid obligation source: {0}")]
    Source(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(VerifyError::NoProvers.to_string(), "no provers configured");
        let err = VerifyError::TargetNotFound {
            target: "barrier".into(),
            available: vec!["race".into(), "bounds".into()],
        };
        assert_eq!(
            err.to_string(),
            "target 'barrier' not found (available: race, bounds)"
        );
    }
}
