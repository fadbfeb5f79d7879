//! Two-phase row reader.
//!
//! The tokenizer resolves every column binding to an ordinal in the reader
//! schema. [`ReadSession`] does that once per distinct schema and reuses the
//! tokens for every row; the materializer then builds one value per row.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use sqlbind_core::errors::BindError;
use xxhash_rust::xxh3::Xxh3;

use super::value::Value;
use crate::shapes::{BindTarget, ColumnBinding, ColumnMatch, ConstructionStrategy, ResultKind, ResultShape};

/// Resolved ordinals for one reader schema, in column-binding order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnTokens {
    ordinals: SmallVec<[Option<u16>; 16]>,
    /// Schema names, kept only for untyped rows.
    names: Vec<String>,
    width: usize,
}

impl ColumnTokens {
    pub fn ordinals(&self) -> &[Option<u16>] {
        &self.ordinals
    }

    pub fn width(&self) -> usize {
        self.width
    }
}

/// One materialized row.
#[derive(Debug, Clone, PartialEq)]
pub enum Materialized {
    Scalar(Value),
    /// Column name and value, in schema order.
    Row(Vec<(String, Value)>),
    Instance {
        type_name: Option<String>,
        strategy: Option<ConstructionStrategy>,
        /// Constructor, factory, or tuple arguments.
        arguments: Vec<Value>,
        /// Members assigned after construction.
        members: Vec<(String, Value)>,
    },
}

/// Per-artifact reader behavior that does not come from the result shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderSettings {
    /// Stop after this many rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_limit: Option<u32>,
    /// Expected row count. Only sizes buffers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity_hint: Option<u32>,
    /// Reject coercions when reading a scalar result.
    #[serde(default)]
    pub strict_scalar: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderPlan {
    kind: ResultKind,
    matching: ColumnMatch,
    columns: Vec<ColumnBinding>,
    #[serde(flatten)]
    settings: ReaderSettings,
}

impl ReaderPlan {
    /// `None` when the shape reads no rows.
    pub fn from_shape(shape: &ResultShape, settings: ReaderSettings) -> Option<Self> {
        shape.reads_rows().then(|| Self {
            kind: shape.kind.clone(),
            matching: shape.matching,
            columns: shape.columns.clone(),
            settings,
        })
    }

    pub fn kind(&self) -> &ResultKind {
        &self.kind
    }

    pub fn matching(&self) -> ColumnMatch {
        self.matching
    }

    pub fn columns(&self) -> &[ColumnBinding] {
        &self.columns
    }

    pub fn row_limit(&self) -> Option<u32> {
        self.settings.row_limit
    }

    pub fn capacity_hint(&self) -> Option<u32> {
        self.settings.capacity_hint
    }

    /// Resolve column bindings against `schema`. Each schema column is
    /// claimed by at most one binding; unmatched bindings get no ordinal.
    pub fn tokenize(&self, schema: &[&str]) -> ColumnTokens {
        let width = schema.len();
        let mut ordinals = SmallVec::new();
        let mut names = Vec::new();

        match (&self.kind, self.matching) {
            (ResultKind::NoRows, _) => {}
            (ResultKind::Scalar { .. }, _) => ordinals.push((width > 0).then_some(0)),
            (ResultKind::UntypedRow, _) => names = schema.iter().map(|s| s.to_string()).collect(),
            (_, ColumnMatch::ByPosition) => {
                for index in 0..self.columns.len() {
                    ordinals.push(if index < width { u16::try_from(index).ok() } else { None });
                }
            }
            (_, ColumnMatch::ByName { underscores }) => {
                let normalized: Vec<String> = schema.iter().map(|s| normalize(s, underscores)).collect();
                let mut claimed = vec![false; width];
                for column in &self.columns {
                    let wanted = normalize(&column.column_name, underscores);
                    let found = (0..width).find(|i| !claimed[*i] && normalized[*i] == wanted);
                    if let Some(i) = found {
                        claimed[i] = true;
                    }
                    ordinals.push(found.and_then(|i| u16::try_from(i).ok()));
                }
            }
        }

        ColumnTokens { ordinals, names, width }
    }

    /// Build one result from a row laid out per the tokenized schema.
    pub fn materialize(&self, tokens: &ColumnTokens, row: &[Value]) -> Result<Materialized, BindError> {
        if row.len() != tokens.width {
            return Err(BindError::RowWidthMismatch {
                expected: tokens.width,
                actual: row.len(),
            });
        }

        match &self.kind {
            ResultKind::NoRows => Err(BindError::NoReader {
                artifact: "no-rows shape".to_string(),
            }),
            ResultKind::Scalar { kind, nullable } => {
                let raw = tokens
                    .ordinals
                    .first()
                    .copied()
                    .flatten()
                    .map_or(Value::Null, |o| row[usize::from(o)].clone());
                Ok(Materialized::Scalar(raw.convert(*kind, *nullable, self.settings.strict_scalar, "0")?))
            }
            ResultKind::UntypedRow => Ok(Materialized::Row(
                tokens.names.iter().cloned().zip(row.iter().cloned()).collect(),
            )),
            ResultKind::Tuple { arity } => {
                let (arguments, members) = self.bind_columns(tokens, row, *arity)?;
                Ok(Materialized::Instance {
                    type_name: None,
                    strategy: None,
                    arguments,
                    members,
                })
            }
            ResultKind::Constructed {
                type_name,
                strategy,
                arity,
                ..
            } => {
                let (arguments, members) = self.bind_columns(tokens, row, *arity)?;
                Ok(Materialized::Instance {
                    type_name: Some(type_name.to_string()),
                    strategy: Some(*strategy),
                    arguments,
                    members,
                })
            }
        }
    }

    fn bind_columns(
        &self,
        tokens: &ColumnTokens,
        row: &[Value],
        arity: usize,
    ) -> Result<(Vec<Value>, Vec<(String, Value)>), BindError> {
        let mut arguments = vec![Value::Null; arity];
        let mut members = Vec::new();

        for (column, ordinal) in self.columns.iter().zip(tokens.ordinals.iter()) {
            let raw = match ordinal {
                Some(o) => row[usize::from(*o)].clone(),
                // Unmatched members keep their initial value.
                None if matches!(column.target, BindTarget::Member { .. }) => continue,
                None => Value::Null,
            };
            let value = if column.converter.is_some() {
                raw
            } else {
                raw.convert(column.value_kind, column.nullable, column.strict, &column.column_name)?
            };
            match &column.target {
                BindTarget::ConstructorArg { index } => {
                    if let Some(slot) = arguments.get_mut(*index) {
                        *slot = value;
                    }
                }
                BindTarget::Member { name } => members.push((name.clone(), value)),
            }
        }
        Ok((arguments, members))
    }

    /// Read a whole result set with one schema, up to the row limit.
    pub fn read_all(&self, schema: &[&str], rows: &[Vec<Value>]) -> Result<Vec<Materialized>, BindError> {
        let expected = self.settings.capacity_hint.map_or(rows.len(), |hint| rows.len().min(hint as usize));
        let mut out = Vec::with_capacity(expected);
        let mut session = self.session();
        for row in rows {
            match session.read_row(schema, row)? {
                Some(value) => out.push(value),
                None => break,
            }
        }
        Ok(out)
    }

    pub fn session(&self) -> ReadSession<'_> {
        ReadSession {
            plan: self,
            schema_hash: None,
            tokens: None,
            tokenizations: 0,
            rows_read: 0,
        }
    }
}

/// Reads rows from one or more result sets, tokenizing once per schema.
pub struct ReadSession<'p> {
    plan: &'p ReaderPlan,
    schema_hash: Option<u64>,
    tokens: Option<ColumnTokens>,
    tokenizations: usize,
    rows_read: u32,
}

impl ReadSession<'_> {
    /// Materialize `row`. Returns `None` once the row limit is reached.
    pub fn read_row(&mut self, schema: &[&str], row: &[Value]) -> Result<Option<Materialized>, BindError> {
        if self.plan.settings.row_limit.is_some_and(|limit| self.rows_read >= limit) {
            return Ok(None);
        }

        let hash = schema_hash(schema);
        if self.schema_hash != Some(hash) {
            self.tokens = None;
            self.schema_hash = Some(hash);
        }
        let plan = self.plan;
        let tokenizations = &mut self.tokenizations;
        let tokens = self.tokens.get_or_insert_with(|| {
            *tokenizations += 1;
            plan.tokenize(schema)
        });

        let value = plan.materialize(tokens, row)?;
        self.rows_read += 1;
        Ok(Some(value))
    }

    /// How many times a schema was tokenized.
    pub fn tokenization_count(&self) -> usize {
        self.tokenizations
    }

    pub fn rows_read(&self) -> u32 {
        self.rows_read
    }
}

fn normalize(name: &str, underscores: bool) -> String {
    name.chars()
        .filter(|c| !(underscores && *c == '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

fn schema_hash(schema: &[&str]) -> u64 {
    let mut hasher = Xxh3::new();
    for name in schema {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }
    hasher.digest()
}
