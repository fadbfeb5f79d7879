//! Analysis of one call site, from option resolution to the shared artifact.

use std::sync::Arc;

use sqlbind_core::callsite::{CallSite, EffectiveOptions, OperationKind};
use sqlbind_core::errors::AnalysisError;
use sqlbind_core::events::SiteOutcome;
use sqlbind_core::{AnalysisConfig, Location, SymbolOracle};

use crate::canonical::{CanonicalShape, ShapeCache};
use crate::diagnostics::{Diagnostic, DiagnosticBag, DiagnosticCode, DiagnosticsClassifier, SiteFacts};
use crate::shapes::{ParameterOutcome, ParameterShapeModeler, ResultOutcome, ResultShapeModeler};
use crate::sql::SqlTextResolver;
use crate::synth::{ArtifactSynthesizer, BackendTag, GeneratedArtifact};

pub(crate) struct SiteResult {
    pub location: Location,
    pub outcome: SiteOutcome,
    pub options: EffectiveOptions,
    /// Resolved backend, once analysis got that far.
    pub backend: Option<BackendTag>,
    pub artifact: Option<Arc<GeneratedArtifact>>,
    /// This site's analysis built the artifact.
    pub fresh: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl SiteResult {
    fn without_artifact(location: Location, outcome: SiteOutcome, options: EffectiveOptions, bag: DiagnosticBag) -> Self {
        Self {
            location,
            outcome,
            options,
            backend: None,
            artifact: None,
            fresh: false,
            diagnostics: bag.into_vec(),
        }
    }

    /// A site whose analysis panicked.
    pub fn internal_failure(location: Location, detail: &str) -> Self {
        let mut bag = DiagnosticBag::new(location.clone());
        bag.report(DiagnosticCode::InternalFailure, format!("analysis failed: {detail}"));
        Self::without_artifact(location, SiteOutcome::Rejected, EffectiveOptions::default(), bag)
    }
}

/// Shared, read-only context for the per-site workers.
pub(crate) struct SiteAnalyzer<'a> {
    pub config: &'a AnalysisConfig,
    pub oracle: &'a dyn SymbolOracle,
    pub resolver: &'a SqlTextResolver,
    pub classifier: &'a DiagnosticsClassifier,
    pub synthesizer: &'a ArtifactSynthesizer,
    pub cache: &'a ShapeCache,
}

impl SiteAnalyzer<'_> {
    /// `Err` only for run-level failures such as cache corruption.
    pub fn analyze(&self, site: &CallSite, duplicate: bool) -> Result<SiteResult, AnalysisError> {
        let location = site.location.clone();
        let scope = site.scope_options.overlay(&self.config.global_options());
        let options = site.local_options.overlay(&scope).resolve();
        let mut bag = DiagnosticBag::new(location.clone());

        if !options.enabled {
            tracing::debug!(site = %location, "opted out");
            return Ok(SiteResult::without_artifact(location, SiteOutcome::OptedOut, options, bag));
        }
        if duplicate {
            bag.report(
                DiagnosticCode::DuplicateLocation,
                format!("several call sites resolve to {location}; none of them is specialized"),
            );
        }
        for message in &site.invalid_markers {
            bag.report(DiagnosticCode::InvalidMarker, message.clone());
        }

        let command = self.resolver.resolve(site, &options);

        let ((parameters, parameter_bag), (result, result_bag)) = rayon::join(
            || {
                let mut bag = DiagnosticBag::new(location.clone());
                let outcome = ParameterShapeModeler::new(self.oracle).model(site, &options, &mut bag);
                (outcome, bag)
            },
            || {
                let mut bag = DiagnosticBag::new(location.clone());
                let outcome = ResultShapeModeler::new(self.oracle).model(site, &options, &mut bag);
                (outcome, bag)
            },
        );
        bag.extend(parameter_bag);
        bag.extend(result_bag);

        let facts = SiteFacts {
            site,
            command: &command,
            options: &options,
            scope: &scope,
            parameters: &parameters,
            legacy_compat: self.config.effective_legacy_compat(),
        };
        self.classifier.classify(&facts, &mut bag);

        let backend = self.backend_for(site, &options, &mut bag);
        let unspecialized = |outcome: SiteOutcome, options: EffectiveOptions, bag: DiagnosticBag| SiteResult {
            backend: Some(backend),
            ..SiteResult::without_artifact(location.clone(), outcome, options, bag)
        };

        let (parameter_shape, result_shape) = match (parameters, result) {
            _ if duplicate || bag.has_errors() => {
                return Ok(unspecialized(SiteOutcome::Rejected, options, bag));
            }
            (ParameterOutcome::Rejected, _) | (_, ResultOutcome::Rejected) => {
                return Ok(unspecialized(SiteOutcome::Rejected, options, bag));
            }
            (ParameterOutcome::Deferred, _) => {
                return Ok(unspecialized(SiteOutcome::Deferred, options, bag));
            }
            (ParameterOutcome::Shape(p), ResultOutcome::Shape(r)) => (p, r),
        };

        let implied_row_hint = match site.operation {
            OperationKind::Query { cardinality } => cardinality.implied_row_hint(),
            _ => None,
        };
        let canonical = CanonicalShape::new(
            &parameter_shape,
            &result_shape,
            &options,
            command.command_type,
            self.synthesizer.hooks_for(backend),
            implied_row_hint,
        );
        let (artifact, fresh) = self
            .cache
            .get_or_synthesize(canonical, |shape, id| self.synthesizer.synthesize(shape, id))?;
        tracing::debug!(site = %location, artifact = %artifact.id, fresh, "specialized");

        Ok(SiteResult {
            location,
            outcome: SiteOutcome::Specialized,
            options,
            backend: Some(backend),
            artifact: Some(artifact),
            fresh,
            diagnostics: bag.into_vec(),
        })
    }

    fn backend_for(&self, site: &CallSite, options: &EffectiveOptions, bag: &mut DiagnosticBag) -> BackendTag {
        if let Some(name) = &options.backend {
            if BackendTag::parse_str(name).is_none() {
                bag.report(
                    DiagnosticCode::InvalidMarker,
                    format!("unknown backend `{name}`; inferring from the connection type"),
                );
            }
        }
        BackendTag::resolve(options.backend.as_deref(), site.connection_type.as_ref())
    }
}
