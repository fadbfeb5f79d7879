//! Type and member descriptors.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Fully-qualified type name as the host spells it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeRef(pub Arc<str>);

impl TypeRef {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last dotted segment, e.g. `Customer` for `App.Models.Customer`.
    pub fn short_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeRef {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Primitive values a column or parameter can carry directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    Bool,
    Byte,
    Int16,
    Int32,
    Int64,
    Single,
    Double,
    Decimal,
    String,
    Char,
    Guid,
    DateTime,
    DateTimeOffset,
    TimeSpan,
    Binary,
}

impl ScalarKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Byte => "byte",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Single => "single",
            Self::Double => "double",
            Self::Decimal => "decimal",
            Self::String => "string",
            Self::Char => "char",
            Self::Guid => "guid",
            Self::DateTime => "datetime",
            Self::DateTimeOffset => "datetimeoffset",
            Self::TimeSpan => "timespan",
            Self::Binary => "binary",
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Byte | Self::Int16 | Self::Int32 | Self::Int64)
    }

    pub fn is_floating(&self) -> bool {
        matches!(self, Self::Single | Self::Double | Self::Decimal)
    }

    /// Kinds carried as text in the value model.
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            Self::String
                | Self::Char
                | Self::Guid
                | Self::DateTime
                | Self::DateTimeOffset
                | Self::TimeSpan
        )
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One element of a tuple type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TupleElement {
    pub name: Option<String>,
    pub ty: TypeRef,
}

/// Structural category of a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeKind {
    Scalar { scalar: ScalarKind, nullable: bool },
    Enum { underlying: ScalarKind },
    /// Class or struct exposing members.
    Object,
    Tuple { elements: Vec<TupleElement> },
    /// Homogeneous sequence; as a parameter argument this is a batch.
    Sequence { element: TypeRef },
    /// The library's open-ended parameter bag. Opaque to the engine.
    DynamicBag,
    /// The library's untyped row result.
    UntypedRow,
    /// An unresolved generic type parameter.
    GenericParameter { name: String },
}

impl TypeKind {
    /// The scalar a value of this kind is read/written as, if any.
    pub fn scalar(&self) -> Option<ScalarKind> {
        match self {
            Self::Scalar { scalar, .. } => Some(*scalar),
            Self::Enum { underlying } => Some(*underlying),
            _ => None,
        }
    }
}

/// Declared accessibility, ordered from least to most visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    Private,
    Protected,
    Internal,
    ProtectedInternal,
    Public,
}

impl Accessibility {
    /// Generated code lives in the caller's compilation unit, so internal
    /// is enough; private and protected are not.
    pub fn is_reachable_from_generated(&self) -> bool {
        matches!(self, Self::Internal | Self::ProtectedInternal | Self::Public)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamInfo {
    pub name: String,
    pub ty: TypeRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorInfo {
    pub parameters: Vec<ParamInfo>,
    pub accessibility: Accessibility,
    /// Generated implicitly from a positional/primary declaration.
    #[serde(default)]
    pub is_primary: bool,
}

impl ConstructorInfo {
    pub fn is_parameterless(&self) -> bool {
        self.parameters.is_empty()
    }
}

/// A static factory method returning the declaring type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryInfo {
    pub name: String,
    pub parameters: Vec<ParamInfo>,
    pub accessibility: Accessibility,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Property,
    Field,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteAccess {
    ReadOnly,
    Settable,
    InitOnly,
}

/// A data member, already flattened base-first by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberInfo {
    pub name: String,
    pub ty: TypeRef,
    pub kind: MemberKind,
    pub accessibility: Accessibility,
    #[serde(default = "default_true")]
    pub readable: bool,
    pub write: WriteAccess,
}

fn default_true() -> bool {
    true
}

impl MemberInfo {
    pub fn is_writable(&self) -> bool {
        !matches!(self.write, WriteAccess::ReadOnly)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeInfo {
    pub name: TypeRef,
    #[serde(flatten)]
    pub kind: TypeKind,
    pub accessibility: Accessibility,
    /// Accessibility of each enclosing type, outermost first.
    #[serde(default)]
    pub containing: SmallVec<[Accessibility; 2]>,
    #[serde(default)]
    pub constructors: Vec<ConstructorInfo>,
    #[serde(default)]
    pub factories: Vec<FactoryInfo>,
    #[serde(default)]
    pub is_abstract: bool,
}

impl TypeInfo {
    pub fn new(name: impl Into<TypeRef>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            accessibility: Accessibility::Public,
            containing: SmallVec::new(),
            constructors: Vec::new(),
            factories: Vec::new(),
            is_abstract: false,
        }
    }

    /// The least visible of the type itself and every enclosing type.
    pub fn effective_accessibility(&self) -> Accessibility {
        self.containing
            .iter()
            .copied()
            .fold(self.accessibility, |acc, outer| acc.min(outer))
    }
}
