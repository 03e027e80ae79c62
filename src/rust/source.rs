// SPDX-License-Identifier: PMPL-1.0-or-later

//! Obligation sources
//!
//! The verification-condition generator is external. It hands over its
//! obligations per property as JSON:
//!
//! ```json
//! { "properties": { "race_freedom": [ { "name": "...", "hypotheses": [...], "goal": ... } ] } }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::core::Obligation;
use crate::error::{VerifyError, VerifyResult};

/// Produces the obligations establishing one property of a kernel
pub trait ObligationSource {
    fn generate_obligations(&self, target: &str) -> VerifyResult<Vec<Obligation>>;

    /// Properties this source knows about
    fn targets(&self) -> Vec<String>;
}

/// Obligations exported to a JSON file, grouped by property
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonObligationFile {
    pub properties: BTreeMap<String, Vec<Obligation>>,
}

impl JsonObligationFile {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read obligations: {}", path.display()))?;
        Ok(Self::parse(&content)?)
    }

    pub fn parse(content: &str) -> VerifyResult<Self> {
        serde_json::from_str(content).map_err(|e| VerifyError::Source(e.to_string()))
    }
}

impl ObligationSource for JsonObligationFile {
    fn generate_obligations(&self, target: &str) -> VerifyResult<Vec<Obligation>> {
        let obligations = self
            .properties
            .get(target)
            .ok_or_else(|| VerifyError::TargetNotFound {
                target: target.to_string(),
                available: self.targets(),
            })?;

        Ok(obligations
            .iter()
            .enumerate()
            .map(|(i, o)| {
                let mut o = o.clone();
                if o.name.is_empty() {
                    o.name = format!("{}/{}", target, i + 1);
                }
                o
            })
            .collect())
    }

    fn targets(&self) -> Vec<String> {
        self.properties.keys().cloned().collect()
    }
}
