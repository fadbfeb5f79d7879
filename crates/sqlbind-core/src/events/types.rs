//! Event payloads.

use serde::Serialize;

use crate::types::identifiers::ArtifactId;
use crate::types::location::Location;

#[derive(Debug, Clone)]
pub struct AnalysisStartedEvent {
    pub call_sites: usize,
}

/// How one call site ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteOutcome {
    /// Bound to a generated artifact.
    Specialized,
    /// Left on the generic runtime path without a hard error.
    Deferred,
    /// A hard error suppressed specialization.
    Rejected,
    /// The enclosing region opted out.
    OptedOut,
}

#[derive(Debug, Clone)]
pub struct SiteAnalyzedEvent {
    pub location: Location,
    pub outcome: SiteOutcome,
    pub diagnostics: usize,
}

#[derive(Debug, Clone)]
pub struct ArtifactSynthesizedEvent {
    pub artifact_id: ArtifactId,
    pub parameters: usize,
    pub columns: usize,
}

#[derive(Debug, Clone)]
pub struct AnalysisCompleteEvent {
    pub call_sites: usize,
    pub specialized: usize,
    pub artifacts: usize,
    pub diagnostics: usize,
    pub duration_ms: u64,
}
