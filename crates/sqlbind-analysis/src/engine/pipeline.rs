//! Run driver.
//!
//! Phase 1: duplicate-location pre-scan
//! Phase 2: per-site analysis on the worker pool (resolve, model, classify,
//!          canonicalize, synthesize on cache miss)
//! Phase 3: redirection, sequential and in location order
//! Phase 4: diagnostic filtering, sorting, and the run summary

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

use rayon::prelude::*;
use sqlbind_core::callsite::CallSite;
use sqlbind_core::errors::AnalysisError;
use sqlbind_core::events::{
    AnalysisCompleteEvent, AnalysisEventHandler, AnalysisStartedEvent, ArtifactSynthesizedEvent, NoOpEventHandler,
    SiteAnalyzedEvent, SiteOutcome,
};
use sqlbind_core::{AnalysisConfig, SymbolOracle};

use super::output::{AnalysisOutput, SiteReport};
use super::site::{SiteAnalyzer, SiteResult};
use super::stats::AnalysisStats;
use crate::canonical::ShapeCache;
use crate::diagnostics::classifier::panic_detail;
use crate::diagnostics::{self, Diagnostic, DiagnosticBag, DiagnosticCode, DiagnosticsClassifier};
use crate::redirect::{find_duplicate_locations, CallSiteRedirector};
use crate::sql::SqlTextResolver;
use crate::synth::{ArtifactSynthesizer, HookRegistry};

pub struct AnalysisEngine {
    config: AnalysisConfig,
    resolver: SqlTextResolver,
    classifier: DiagnosticsClassifier,
    synthesizer: ArtifactSynthesizer,
}

impl AnalysisEngine {
    pub fn new(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        let resolver = SqlTextResolver::new(config.effective_command_text_cache_capacity());
        Ok(Self {
            config,
            resolver,
            classifier: DiagnosticsClassifier::with_default_rules(),
            synthesizer: ArtifactSynthesizer::default(),
        })
    }

    /// Replace the backend hook table.
    pub fn with_hooks(mut self, hooks: HookRegistry) -> Self {
        self.synthesizer = ArtifactSynthesizer::new(hooks);
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn classifier_mut(&mut self) -> &mut DiagnosticsClassifier {
        &mut self.classifier
    }

    pub fn analyze(&self, sites: &[CallSite], oracle: &dyn SymbolOracle) -> Result<AnalysisOutput, AnalysisError> {
        self.analyze_with_events(sites, oracle, &NoOpEventHandler)
    }

    /// Analyze every call site. Problems local to a site become diagnostics;
    /// only run-level failures are returned as `Err`.
    pub fn analyze_with_events(
        &self,
        sites: &[CallSite],
        oracle: &dyn SymbolOracle,
        events: &dyn AnalysisEventHandler,
    ) -> Result<AnalysisOutput, AnalysisError> {
        let threads = self.config.effective_threads();
        if threads == 0 {
            return self.run(sites, oracle, events);
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("sqlbind-worker-{i}"))
            .build()
            .map_err(|e| AnalysisError::ThreadPool { message: e.to_string() })?;
        pool.install(|| self.run(sites, oracle, events))
    }

    fn run(
        &self,
        sites: &[CallSite],
        oracle: &dyn SymbolOracle,
        events: &dyn AnalysisEventHandler,
    ) -> Result<AnalysisOutput, AnalysisError> {
        let start = Instant::now();
        events.on_analysis_started(&AnalysisStartedEvent { call_sites: sites.len() });
        let text_hits_before = self.resolver.cache().hit_count();
        let text_misses_before = self.resolver.cache().miss_count();

        // Phase 1
        let duplicates = find_duplicate_locations(sites);
        if !duplicates.is_empty() {
            tracing::debug!(count = duplicates.len(), "duplicate call-site locations");
        }

        // Phase 2
        let cache = ShapeCache::new();
        let analyzer = SiteAnalyzer {
            config: &self.config,
            oracle,
            resolver: &self.resolver,
            classifier: &self.classifier,
            synthesizer: &self.synthesizer,
            cache: &cache,
        };
        let results: Vec<SiteResult> = sites
            .par_iter()
            .map(|site| -> Result<SiteResult, AnalysisError> {
                let duplicate = duplicates.contains(&site.location);
                let result = match catch_unwind(AssertUnwindSafe(|| analyzer.analyze(site, duplicate))) {
                    Ok(result) => result?,
                    Err(payload) => {
                        let detail = panic_detail(payload.as_ref());
                        tracing::warn!(site = %site.location, detail = %detail, "call-site analysis panicked");
                        SiteResult::internal_failure(site.location.clone(), &detail)
                    }
                };
                if let (true, Some(artifact)) = (result.fresh, &result.artifact) {
                    events.on_artifact_synthesized(&ArtifactSynthesizedEvent {
                        artifact_id: artifact.id,
                        parameters: artifact.binder.bindings().len(),
                        columns: artifact.reader.as_ref().map_or(0, |r| r.columns().len()),
                    });
                }
                events.on_site_analyzed(&SiteAnalyzedEvent {
                    location: result.location.clone(),
                    outcome: result.outcome,
                    diagnostics: result.diagnostics.len(),
                });
                Ok(result)
            })
            .collect::<Result<_, AnalysisError>>()?;

        // Phase 3
        let mut order: Vec<(&CallSite, SiteResult)> = sites.iter().zip(results).collect();
        order.sort_by(|a, b| a.0.location.cmp(&b.0.location));

        let mut redirector = CallSiteRedirector::new();
        let mut reports = Vec::with_capacity(order.len());
        let mut collected: Vec<Diagnostic> = Vec::new();
        let mut stats = AnalysisStats::default();

        for (site, mut result) in order {
            if let (SiteOutcome::Specialized, Some(artifact)) = (result.outcome, &result.artifact) {
                if let Err(e) = redirector.bind(site, &result.options, artifact) {
                    // The pre-scan rejects shared locations, so this is a bug.
                    tracing::warn!(site = %site.location, error = %e, "redirection refused");
                    let mut bag = DiagnosticBag::new(site.location.clone());
                    bag.report(DiagnosticCode::DuplicateLocation, e.to_string());
                    result.diagnostics.extend(bag.into_vec());
                    result.outcome = SiteOutcome::Rejected;
                    result.artifact = None;
                }
            }
            stats.record_outcome(result.outcome);
            reports.push(SiteReport {
                location: result.location,
                outcome: result.outcome,
                artifact: result.artifact.as_ref().map(|a| a.id),
                backend: result.backend,
            });
            collected.extend(result.diagnostics);
        }

        // Phase 4
        let mut diagnostics = diagnostics::filter(collected, &self.config);
        diagnostics.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        stats.record_diagnostics(&diagnostics);

        let artifacts = cache.artifacts();
        stats.artifacts = artifacts.len();
        stats.shape_cache_hits = cache.hit_count();
        stats.shape_cache_misses = cache.miss_count();
        stats.text_cache_hits = self.resolver.cache().hit_count().saturating_sub(text_hits_before);
        stats.text_cache_misses = self.resolver.cache().miss_count().saturating_sub(text_misses_before);
        stats.elapsed_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            call_sites = stats.call_sites,
            specialized = stats.specialized,
            deferred = stats.deferred,
            rejected = stats.rejected,
            artifacts = stats.artifacts,
            errors = stats.errors,
            warnings = stats.warnings,
            elapsed_ms = stats.elapsed_ms,
            "analysis complete"
        );
        events.on_analysis_complete(&AnalysisCompleteEvent {
            call_sites: stats.call_sites,
            specialized: stats.specialized,
            artifacts: stats.artifacts,
            diagnostics: diagnostics.len(),
            duration_ms: stats.elapsed_ms,
        });

        Ok(AnalysisOutput {
            bindings: redirector.finish(),
            artifacts,
            diagnostics,
            sites: reports,
            stats,
        })
    }
}
