//! Artifact synthesis: one binder, one reader plan, and the backend hooks
//! per canonical shape.

pub mod artifact;
pub mod binder;
pub mod hooks;
pub mod reader;
pub mod value;

use sqlbind_core::ArtifactId;

pub use artifact::GeneratedArtifact;
pub use binder::{BatchCommand, DbParameter, ParameterBinder, ValueSource, ValueTarget};
pub use hooks::{BackendTag, CommandState, HookKind, HookRegistry};
pub use reader::{ColumnTokens, Materialized, ReadSession, ReaderPlan, ReaderSettings};
pub use value::Value;

use crate::canonical::CanonicalShape;

#[derive(Debug, Clone)]
pub struct ArtifactSynthesizer {
    hooks: HookRegistry,
}

impl ArtifactSynthesizer {
    pub fn new(hooks: HookRegistry) -> Self {
        Self { hooks }
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    /// Hooks a site on `backend` needs. They become part of its shape.
    pub fn hooks_for(&self, backend: BackendTag) -> Vec<HookKind> {
        self.hooks.hooks_for(backend)
    }

    /// Build the artifact for `shape`. Pure: the output depends only on the
    /// shape and the id.
    pub fn synthesize(&self, shape: &CanonicalShape, id: ArtifactId) -> GeneratedArtifact {
        let options = shape.options.clone();
        let settings = ReaderSettings {
            row_limit: options.row_limit,
            capacity_hint: options.row_capacity,
            strict_scalar: options.strict_types,
        };
        let artifact = GeneratedArtifact {
            id,
            method_name: id.method_name(),
            binder: ParameterBinder::new(&shape.parameters, options.batch_size),
            reader: ReaderPlan::from_shape(&shape.result, settings),
            hooks: options.hooks.clone(),
            options,
        };
        tracing::debug!(
            artifact = %id,
            parameters = artifact.binder.bindings().len(),
            columns = shape.result.columns.len(),
            "synthesized artifact"
        );
        artifact
    }
}

impl Default for ArtifactSynthesizer {
    fn default() -> Self {
        Self::new(HookRegistry::with_defaults())
    }
}
