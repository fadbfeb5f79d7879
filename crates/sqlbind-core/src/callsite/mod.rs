//! Call-site records produced by the host's scanner.
//!
//! A [`CallSite`] is created once per discovered invocation and never
//! mutated afterwards. Its location is its identity.

pub mod expr;
pub mod options;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::symbols::TypeRef;
use crate::types::location::Location;

pub use expr::{ArgExpr, InterpolationPart, LiteralForm, LiteralFragment, TextExpr};
pub use options::{CommandType, EffectiveOptions, OptionSet, TupleBinding};

/// How many rows a query operation consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryCardinality {
    Buffered,
    Unbuffered,
    First,
    FirstOrDefault,
    Single,
    SingleOrDefault,
}

impl QueryCardinality {
    /// Rows worth reading: one for `First*`, two for `Single*` so a second
    /// row can be detected.
    pub fn implied_row_hint(&self) -> Option<u32> {
        match self {
            Self::First | Self::FirstOrDefault => Some(1),
            Self::Single | Self::SingleOrDefault => Some(2),
            Self::Buffered | Self::Unbuffered => None,
        }
    }
}

/// The data-access operation invoked at a call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum OperationKind {
    Execute,
    Query { cardinality: QueryCardinality },
    Scalar,
    QueryMultiple,
}

impl OperationKind {
    pub fn query() -> Self {
        Self::Query {
            cardinality: QueryCardinality::Buffered,
        }
    }

    /// Whether the operation consumes rows from the command.
    pub fn expects_rows(&self) -> bool {
        !matches!(self, Self::Execute)
    }

    /// Whether the operation materializes a typed result per row.
    pub fn reads_typed_rows(&self) -> bool {
        matches!(self, Self::Query { .. } | Self::Scalar)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Execute => "Execute",
            Self::Query { cardinality } => match cardinality {
                QueryCardinality::Buffered => "Query",
                QueryCardinality::Unbuffered => "QueryUnbuffered",
                QueryCardinality::First => "QueryFirst",
                QueryCardinality::FirstOrDefault => "QueryFirstOrDefault",
                QueryCardinality::Single => "QuerySingle",
                QueryCardinality::SingleOrDefault => "QuerySingleOrDefault",
            },
            Self::Scalar => "ExecuteScalar",
            Self::QueryMultiple => "QueryMultiple",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One invocation of a data-access operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallSite {
    pub location: Location,
    pub operation: OperationKind,
    /// Suspending (async) variant of the operation.
    #[serde(default)]
    pub is_async: bool,
    /// Generic type arguments; the first is the requested result type.
    #[serde(default)]
    pub type_arguments: Vec<TypeRef>,
    pub command_text: Option<TextExpr>,
    pub parameters: Option<ArgExpr>,
    /// Named local constants visible at the call site.
    #[serde(default)]
    pub locals: BTreeMap<String, TextExpr>,
    pub connection_type: Option<TypeRef>,
    /// Options inherited from enclosing scopes.
    #[serde(default)]
    pub scope_options: OptionSet,
    /// Options declared on the call itself.
    #[serde(default)]
    pub local_options: OptionSet,
    /// Scope or call markers whose values could not be understood.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invalid_markers: Vec<String>,
}

impl CallSite {
    pub fn new(location: Location, operation: OperationKind) -> Self {
        Self {
            location,
            operation,
            is_async: false,
            type_arguments: Vec::new(),
            command_text: None,
            parameters: None,
            locals: BTreeMap::new(),
            connection_type: None,
            scope_options: OptionSet::default(),
            local_options: OptionSet::default(),
            invalid_markers: Vec::new(),
        }
    }

    pub fn with_text(mut self, text: TextExpr) -> Self {
        self.command_text = Some(text);
        self
    }

    pub fn with_parameters(mut self, arg: ArgExpr) -> Self {
        self.parameters = Some(arg);
        self
    }

    pub fn with_result_type(mut self, ty: impl Into<TypeRef>) -> Self {
        self.type_arguments.insert(0, ty.into());
        self
    }

    pub fn with_local(mut self, name: impl Into<String>, value: TextExpr) -> Self {
        self.locals.insert(name.into(), value);
        self
    }

    pub fn with_connection(mut self, ty: impl Into<TypeRef>) -> Self {
        self.connection_type = Some(ty.into());
        self
    }

    pub fn with_scope_options(mut self, options: OptionSet) -> Self {
        self.scope_options = options;
        self
    }

    pub fn with_local_options(mut self, options: OptionSet) -> Self {
        self.local_options = options;
        self
    }

    pub fn with_invalid_markers(mut self, invalid: impl IntoIterator<Item = String>) -> Self {
        self.invalid_markers.extend(invalid);
        self
    }

    pub fn asynchronous(mut self) -> Self {
        self.is_async = true;
        self
    }

    /// The requested result element type, if the operation is generic.
    pub fn result_type(&self) -> Option<&TypeRef> {
        self.type_arguments.first()
    }

    /// Call-site options layered over the inherited scope options.
    pub fn merged_options(&self) -> OptionSet {
        self.local_options.overlay(&self.scope_options)
    }
}
