//! What a run hands to the host toolchain, and the sink it hands it through.

use std::sync::Arc;

use serde::Serialize;
use sqlbind_core::events::SiteOutcome;
use sqlbind_core::{ArtifactId, Location};

use super::stats::AnalysisStats;
use crate::diagnostics::Diagnostic;
use crate::redirect::RedirectBinding;
use crate::synth::{BackendTag, GeneratedArtifact};

/// Receives generated artifacts, redirections, and diagnostics.
pub trait ArtifactSink {
    fn accept_artifact(&mut self, artifact: &GeneratedArtifact);
    fn accept_binding(&mut self, binding: &RedirectBinding);
    fn accept_diagnostic(&mut self, diagnostic: &Diagnostic);
}

/// Sink that keeps everything in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub artifacts: Vec<GeneratedArtifact>,
    pub bindings: Vec<RedirectBinding>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ArtifactSink for CollectingSink {
    fn accept_artifact(&mut self, artifact: &GeneratedArtifact) {
        self.artifacts.push(artifact.clone());
    }

    fn accept_binding(&mut self, binding: &RedirectBinding) {
        self.bindings.push(binding.clone());
    }

    fn accept_diagnostic(&mut self, diagnostic: &Diagnostic) {
        self.diagnostics.push(diagnostic.clone());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteReport {
    pub location: Location,
    pub outcome: SiteOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<ArtifactId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendTag>,
}

/// Result of one analysis run. Every list is sorted: bindings and site
/// reports by location, artifacts by id, diagnostics by site then code.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutput {
    pub bindings: Vec<RedirectBinding>,
    pub artifacts: Vec<Arc<GeneratedArtifact>>,
    pub diagnostics: Vec<Diagnostic>,
    pub sites: Vec<SiteReport>,
    /// Timing and cache counters; excluded from [`to_json`](Self::to_json).
    #[serde(skip)]
    pub stats: AnalysisStats,
}

impl AnalysisOutput {
    pub fn binding_at(&self, location: &Location) -> Option<&RedirectBinding> {
        self.bindings
            .binary_search_by(|b| b.location.cmp(location))
            .ok()
            .map(|i| &self.bindings[i])
    }

    pub fn artifact(&self, id: ArtifactId) -> Option<&GeneratedArtifact> {
        self.artifacts
            .binary_search_by(|a| a.id.cmp(&id))
            .ok()
            .map(|i| self.artifacts[i].as_ref())
    }

    /// The artifact a call site was redirected to.
    pub fn artifact_for(&self, location: &Location) -> Option<&GeneratedArtifact> {
        self.binding_at(location).and_then(|b| self.artifact(b.artifact))
    }

    /// Outcome of the first site at `location`.
    pub fn outcome_at(&self, location: &Location) -> Option<SiteOutcome> {
        self.sites.iter().find(|s| &s.location == location).map(|s| s.outcome)
    }

    /// Backend resolved for the first site at `location`.
    pub fn backend_at(&self, location: &Location) -> Option<BackendTag> {
        self.sites.iter().find(|s| &s.location == location).and_then(|s| s.backend)
    }

    pub fn diagnostics_at<'a>(&'a self, location: &'a Location) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.diagnostics.iter().filter(move |d| &d.site == location)
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Push everything to `sink`: artifacts, then bindings, then diagnostics.
    pub fn emit(&self, sink: &mut dyn ArtifactSink) {
        for artifact in &self.artifacts {
            sink.accept_artifact(artifact);
        }
        for binding in &self.bindings {
            sink.accept_binding(binding);
        }
        for diagnostic in &self.diagnostics {
            sink.accept_diagnostic(diagnostic);
        }
    }

    /// Stable JSON rendering; identical inputs give identical bytes.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
