//! Strongly-typed identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Content-addressed identifier of a generated artifact.
///
/// Derived from the shape key hash, so the same shape always receives the
/// same id regardless of which worker synthesized it first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(pub u64);

impl ArtifactId {
    /// Method-style name the host toolchain uses for the generated entry point.
    pub fn method_name(&self) -> String {
        format!("Shape_{:016x}", self.0)
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shape_{:016x}", self.0)
    }
}
