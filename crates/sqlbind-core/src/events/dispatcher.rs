//! Fan-out dispatcher over several handlers.

use std::sync::Arc;

use super::handler::AnalysisEventHandler;
use super::types::*;

/// Forwards every event to each registered handler in registration order.
#[derive(Default, Clone)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn AnalysisEventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Arc<dyn AnalysisEventHandler>) {
        self.handlers.push(handler);
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl AnalysisEventHandler for EventDispatcher {
    fn on_analysis_started(&self, event: &AnalysisStartedEvent) {
        for h in &self.handlers {
            h.on_analysis_started(event);
        }
    }

    fn on_site_analyzed(&self, event: &SiteAnalyzedEvent) {
        for h in &self.handlers {
            h.on_site_analyzed(event);
        }
    }

    fn on_artifact_synthesized(&self, event: &ArtifactSynthesizedEvent) {
        for h in &self.handlers {
            h.on_artifact_synthesized(event);
        }
    }

    fn on_analysis_complete(&self, event: &AnalysisCompleteEvent) {
        for h in &self.handlers {
            h.on_analysis_complete(event);
        }
    }
}
