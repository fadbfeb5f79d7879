//! Canonical form of a shape and its content-addressed key.

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlbind_core::callsite::{CommandType, EffectiveOptions};
use sqlbind_core::errors::AnalysisError;
use sqlbind_core::ArtifactId;
use xxhash_rust::xxh3::xxh3_64;

use crate::shapes::{
    BindTarget, ColumnBinding, ColumnMatch, ParameterBinding, ParameterCategory, ParameterShape, ResultKind,
    ResultShape,
};
use crate::synth::hooks::HookKind;

/// Options that change what a generated artifact does.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalOptions {
    pub batch_size: u32,
    pub cache_command: bool,
    pub strict_types: bool,
    /// Hard stop implied by the query cardinality (first, single).
    pub row_limit: Option<u32>,
    /// Expected row count, used to presize buffers. Never truncates.
    pub row_capacity: Option<u32>,
    pub command_type: CommandType,
    /// Backend setup the artifact applies. Backends with the same hook list
    /// share artifacts.
    pub hooks: Vec<HookKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalParameters {
    pub category: ParameterCategory,
    pub bindings: Vec<ParameterBinding>,
}

/// The single representative of every shape that generates the same code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalShape {
    pub parameters: CanonicalParameters,
    pub result: ResultShape,
    pub options: CanonicalOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeKey(pub u64);

impl ShapeKey {
    pub fn artifact_id(&self) -> ArtifactId {
        ArtifactId(self.0)
    }
}

impl fmt::Display for ShapeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl CanonicalShape {
    /// Normalize a modeled shape.
    ///
    /// Parameter order is kept as-is: the binder's add and update paths
    /// both depend on it. By-name member columns are sorted, since the
    /// tokenizer resolves them by name anyway.
    pub fn new(
        parameters: &ParameterShape,
        result: &ResultShape,
        options: &EffectiveOptions,
        command_type: CommandType,
        hooks: Vec<HookKind>,
        implied_row_hint: Option<u32>,
    ) -> Self {
        let batch = parameters.category == ParameterCategory::Batch;
        let bindings = parameters
            .bindings
            .iter()
            .map(|b| ParameterBinding {
                participates_in_batch: batch && b.participates_in_batch,
                converter: b.converter.as_deref().map(str::trim).map(str::to_string),
                ..b.clone()
            })
            .collect();

        let result = canonical_result(result);
        let reads_rows = result.reads_rows();
        let converts = !result.columns.is_empty() || matches!(result.kind, ResultKind::Scalar { kind: Some(_), .. });
        let row_limit = implied_row_hint.filter(|_| reads_rows);
        let row_capacity = options.row_count_hint.or(row_limit).filter(|_| reads_rows);

        Self {
            parameters: CanonicalParameters {
                category: parameters.category,
                bindings,
            },
            result,
            options: CanonicalOptions {
                batch_size: if batch { options.batch_size } else { 0 },
                cache_command: options.cache_command,
                strict_types: converts && options.strict_types,
                row_limit,
                row_capacity,
                command_type,
                hooks,
            },
        }
    }

    /// Hash of the canonical serialization. Field order is fixed by the
    /// type definitions, so equal shapes always hash equally.
    pub fn key(&self) -> Result<ShapeKey, AnalysisError> {
        let bytes = serde_json::to_vec(self).map_err(|e| AnalysisError::InvariantViolation {
            message: format!("canonical shape failed to serialize: {e}"),
        })?;
        Ok(ShapeKey(xxh3_64(&bytes)))
    }
}

fn canonical_result(result: &ResultShape) -> ResultShape {
    let mut columns: Vec<ColumnBinding> = result.columns.clone();
    let matching = match &result.kind {
        ResultKind::NoRows => ColumnMatch::default(),
        ResultKind::Scalar { .. } | ResultKind::UntypedRow => ColumnMatch::ByPosition,
        _ => result.matching,
    };
    if matches!(matching, ColumnMatch::ByName { .. }) {
        // Constructor arguments keep their index order and come first.
        columns.sort_by(|a, b| match (&a.target, &b.target) {
            (BindTarget::ConstructorArg { index: x }, BindTarget::ConstructorArg { index: y }) => x.cmp(y),
            (BindTarget::ConstructorArg { .. }, BindTarget::Member { .. }) => std::cmp::Ordering::Less,
            (BindTarget::Member { .. }, BindTarget::ConstructorArg { .. }) => std::cmp::Ordering::Greater,
            (BindTarget::Member { name: x }, BindTarget::Member { name: y }) => x.cmp(y),
        });
    }
    ResultShape {
        kind: result.kind.clone(),
        matching,
        columns,
    }
}
