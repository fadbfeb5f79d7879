//! Event handler trait. Every method defaults to a no-op.

use super::types::*;

pub trait AnalysisEventHandler: Send + Sync {
    fn on_analysis_started(&self, _event: &AnalysisStartedEvent) {}
    fn on_site_analyzed(&self, _event: &SiteAnalyzedEvent) {}
    fn on_artifact_synthesized(&self, _event: &ArtifactSynthesizedEvent) {}
    fn on_analysis_complete(&self, _event: &AnalysisCompleteEvent) {}
}

/// Handler that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventHandler;

impl AnalysisEventHandler for NoOpEventHandler {}
