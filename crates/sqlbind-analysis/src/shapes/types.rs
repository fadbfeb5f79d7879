//! Parameter and result shape types.

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlbind_core::symbols::{ScalarKind, TypeRef};

/// Provider-neutral database type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DbType {
    AnsiString,
    AnsiStringFixedLength,
    Binary,
    Boolean,
    Byte,
    Currency,
    Date,
    DateTime,
    DateTime2,
    DateTimeOffset,
    Decimal,
    Double,
    Guid,
    Int16,
    Int32,
    Int64,
    Object,
    Single,
    String,
    StringFixedLength,
    Time,
    Xml,
}

impl DbType {
    const NAMES: &'static [(DbType, &'static str)] = &[
        (DbType::AnsiString, "AnsiString"),
        (DbType::AnsiStringFixedLength, "AnsiStringFixedLength"),
        (DbType::Binary, "Binary"),
        (DbType::Boolean, "Boolean"),
        (DbType::Byte, "Byte"),
        (DbType::Currency, "Currency"),
        (DbType::Date, "Date"),
        (DbType::DateTime, "DateTime"),
        (DbType::DateTime2, "DateTime2"),
        (DbType::DateTimeOffset, "DateTimeOffset"),
        (DbType::Decimal, "Decimal"),
        (DbType::Double, "Double"),
        (DbType::Guid, "Guid"),
        (DbType::Int16, "Int16"),
        (DbType::Int32, "Int32"),
        (DbType::Int64, "Int64"),
        (DbType::Object, "Object"),
        (DbType::Single, "Single"),
        (DbType::String, "String"),
        (DbType::StringFixedLength, "StringFixedLength"),
        (DbType::Time, "Time"),
        (DbType::Xml, "Xml"),
    ];

    /// The type a scalar binds as when nothing overrides it.
    pub fn for_scalar(kind: ScalarKind) -> Self {
        match kind {
            ScalarKind::Bool => Self::Boolean,
            ScalarKind::Byte => Self::Byte,
            ScalarKind::Int16 => Self::Int16,
            ScalarKind::Int32 => Self::Int32,
            ScalarKind::Int64 => Self::Int64,
            ScalarKind::Single => Self::Single,
            ScalarKind::Double => Self::Double,
            ScalarKind::Decimal => Self::Decimal,
            ScalarKind::String => Self::String,
            ScalarKind::Char => Self::StringFixedLength,
            ScalarKind::Guid => Self::Guid,
            ScalarKind::DateTime => Self::DateTime,
            ScalarKind::DateTimeOffset => Self::DateTimeOffset,
            ScalarKind::TimeSpan => Self::Time,
            ScalarKind::Binary => Self::Binary,
        }
    }

    pub fn name(&self) -> &'static str {
        Self::NAMES
            .iter()
            .find(|(t, _)| t == self)
            .map_or("Object", |(_, n)| n)
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::NAMES
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(s))
            .map(|(t, _)| *t)
    }
}

impl fmt::Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterDirection {
    #[default]
    Input,
    Output,
    InputOutput,
    ReturnValue,
}

impl ParameterDirection {
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in" | "input" => Some(Self::Input),
            "out" | "output" => Some(Self::Output),
            "inout" | "input_output" | "inputoutput" => Some(Self::InputOutput),
            "return" | "returnvalue" | "return_value" => Some(Self::ReturnValue),
            _ => None,
        }
    }

    /// The binder reads the member value before execution.
    pub fn sends_value(&self) -> bool {
        matches!(self, Self::Input | Self::InputOutput)
    }

    /// The binder writes the parameter value back after execution.
    pub fn receives_value(&self) -> bool {
        !matches!(self, Self::Input)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Input => "in",
            Self::Output => "out",
            Self::InputOutput => "inout",
            Self::ReturnValue => "return",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterBinding {
    /// Parameter name without any prefix.
    pub name: String,
    pub source_member: String,
    pub db_type: DbType,
    pub direction: ParameterDirection,
    pub participates_in_batch: bool,
    /// `None` when a converter owns the value representation.
    pub value_kind: Option<ScalarKind>,
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converter: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterCategory {
    /// One object binds one parameter set.
    #[default]
    Single,
    /// A sequence of objects; one parameter set per element.
    Batch,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterShape {
    pub category: ParameterCategory,
    /// The argument's element type. Not part of the canonical form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<TypeRef>,
    pub bindings: Vec<ParameterBinding>,
}

impl ParameterShape {
    /// No parameter argument at all.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&ParameterBinding> {
        self.bindings.iter().find(|b| b.name.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructionStrategy {
    FactoryMethod,
    SingleOptedConstructor,
    UniqueNonDefaultConstructor,
    DefaultConstructorWithSetters,
    PositionalRecord,
}

impl ConstructionStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FactoryMethod => "factory_method",
            Self::SingleOptedConstructor => "single_opted_constructor",
            Self::UniqueNonDefaultConstructor => "unique_non_default_constructor",
            Self::DefaultConstructorWithSetters => "default_constructor_with_setters",
            Self::PositionalRecord => "positional_record",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum BindTarget {
    /// Argument `index` of the constructor, factory, or tuple.
    ConstructorArg { index: usize },
    /// A settable or init-only member.
    Member { name: String },
}

impl fmt::Display for BindTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConstructorArg { index } => write!(f, "arg{index}"),
            Self::Member { name } => write!(f, ".{name}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnBinding {
    pub column_name: String,
    pub target: BindTarget,
    pub value_kind: Option<ScalarKind>,
    pub nullable: bool,
    pub strict: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converter: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum ColumnMatch {
    ByName { underscores: bool },
    ByPosition,
}

impl Default for ColumnMatch {
    fn default() -> Self {
        Self::ByName { underscores: false }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ResultKind {
    /// The operation reads no typed rows.
    NoRows,
    /// First column of each row. `kind` is `None` for untyped scalars.
    Scalar { kind: Option<ScalarKind>, nullable: bool },
    /// The whole row as a name/value record.
    UntypedRow,
    Tuple { arity: usize },
    Constructed {
        type_name: TypeRef,
        strategy: ConstructionStrategy,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        factory: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        constructor: Option<usize>,
        arity: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultShape {
    pub kind: ResultKind,
    pub matching: ColumnMatch,
    pub columns: Vec<ColumnBinding>,
}

impl ResultShape {
    pub fn none() -> Self {
        Self {
            kind: ResultKind::NoRows,
            matching: ColumnMatch::default(),
            columns: Vec::new(),
        }
    }

    pub fn scalar(kind: Option<ScalarKind>, nullable: bool) -> Self {
        Self {
            kind: ResultKind::Scalar { kind, nullable },
            matching: ColumnMatch::ByPosition,
            columns: Vec::new(),
        }
    }

    pub fn untyped_row() -> Self {
        Self {
            kind: ResultKind::UntypedRow,
            matching: ColumnMatch::ByPosition,
            columns: Vec::new(),
        }
    }

    pub fn reads_rows(&self) -> bool {
        !matches!(self.kind, ResultKind::NoRows)
    }

    pub fn strategy(&self) -> Option<ConstructionStrategy> {
        match &self.kind {
            ResultKind::Constructed { strategy, .. } => Some(*strategy),
            _ => None,
        }
    }
}
