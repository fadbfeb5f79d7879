//! Declarative configuration markers attached to host symbols.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::types::TypeRef;

/// A symbol a marker can be attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "symbol", rename_all = "snake_case")]
pub enum SymbolRef {
    Type { ty: TypeRef },
    Member { owner: TypeRef, name: String },
    /// Index into [`super::TypeInfo::constructors`].
    Constructor { owner: TypeRef, index: usize },
    Factory { owner: TypeRef, name: String },
    /// An enclosing scope (method, type, module, assembly) by host name.
    Scope { name: String },
}

impl SymbolRef {
    pub fn member(owner: &TypeRef, name: &str) -> Self {
        Self::Member {
            owner: owner.clone(),
            name: name.to_string(),
        }
    }

    pub fn scope(name: impl Into<String>) -> Self {
        Self::Scope { name: name.into() }
    }
}

impl fmt::Display for SymbolRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type { ty } => write!(f, "{ty}"),
            Self::Member { owner, name } | Self::Factory { owner, name } => write!(f, "{owner}.{name}"),
            Self::Constructor { owner, index } => write!(f, "{owner}::ctor#{index}"),
            Self::Scope { name } => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    // Member level.
    BindName,
    DbType,
    Direction,
    Size,
    /// `Flag(true)` forces inclusion, `Flag(false)` excludes the member.
    Include,
    ReturnValue,
    ColumnName,
    ValueConverter,
    // Construction. `Flag(true)` opts in, `Flag(false)` opts out.
    ExplicitConstructor,
    // Scope / call-site level.
    Enabled,
    StrictSql,
    StrictTypes,
    CacheCommand,
    BatchSize,
    RowCountHint,
    CommandType,
    TupleBinding,
    Backend,
    MatchNamesWithUnderscores,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MarkerValue {
    Flag(bool),
    Number(i64),
    Text(String),
}

impl MarkerValue {
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}
