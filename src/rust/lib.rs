// SPDX-FileCopyrightText: 2025 KVPROVE Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! KVPROVE: proof-obligation engine for parallel kernel verification
//!
//! Verification conditions arrive as obligations, are arranged into an
//! AND/OR tree, and are discharged by racing external automated provers
//! through a fixed sequence of proof phases. Whatever remains in the tree
//! afterwards is reported as unverified.

pub mod config;
pub mod core;
pub mod error;
pub mod provers;
pub mod simplify;
pub mod source;
pub mod tree;
pub mod verification;

pub use config::VerifyConfig;
pub use core::{Obligation, Term};
pub use error::{VerifyError, VerifyResult};
pub use provers::{ProverKind, ProverLauncher, ProverLimits, ProverProcess, ProverVerdict, VerdictStatus};
pub use simplify::{BasicSimplifier, Simplifier};
pub use source::{JsonObligationFile, ObligationSource};
pub use tree::ObligationTree;
pub use verification::{ProverRace, TreeSearch, VerificationPipeline, VerificationReport};
