// SPDX-License-Identifier: PMPL-1.0-or-later

//! Proof search over obligation trees
//!
//! - Tree search: apply an attempt predicate to every leaf with AND/OR
//!   short-circuit semantics
//! - Prover race: run every configured prover on one obligation, first
//!   valid verdict wins
//! - Pipeline: the fixed sequence of proof phases

pub mod pipeline;
pub mod race;
pub mod search;

pub use pipeline::{Phase, PhaseSummary, VerificationPipeline, VerificationReport};
pub use race::ProverRace;
pub use search::{Attempt, FnAttempt, TreeSearch};
