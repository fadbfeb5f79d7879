//! Resolved command types.

use serde::{Deserialize, Serialize};
use sqlbind_core::callsite::CommandType;
use sqlbind_core::Location;

use crate::position::SourceMap;

/// Whether a command produces rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    Query,
    NonQuery,
    /// Cannot be decided from the text (stored procedures, dynamic text).
    Undecidable,
}

/// A placeholder referenced in the command text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterToken {
    /// Name without its prefix.
    pub name: String,
    pub prefix: char,
    /// Byte offset of the prefix in the resolved text.
    pub offset: usize,
}

impl ParameterToken {
    /// The token as written, e.g. `@id`.
    pub fn spelled(&self) -> String {
        format!("{}{}", self.prefix, self.name)
    }
}

/// Lexing result for one distinct text; shared across call sites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextAnalysis {
    /// Distinct placeholders in first-occurrence order.
    pub tokens: Vec<ParameterToken>,
    pub kind: StatementKind,
    /// Bare identifier text, treated as a procedure name.
    pub looks_like_procedure: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DynamicReason {
    /// An expression with no constant value.
    Opaque { description: String },
    /// An interpolation hole or local that names no known constant.
    UnknownLocal { name: String },
    /// Local constants that refer to each other.
    CyclicLocal { name: String },
    /// Null or absent text.
    Null,
}

impl DynamicReason {
    pub fn describe(&self) -> String {
        match self {
            Self::Opaque { description } => format!("`{description}` is not a constant"),
            Self::UnknownLocal { name } => format!("`{name}` is not a known constant"),
            Self::CyclicLocal { name } => format!("constant `{name}` refers to itself"),
            Self::Null => "command text is null".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandText {
    Literal { text: String, map: SourceMap },
    Dynamic { reason: DynamicReason, at: Option<Location> },
}

/// The resolved command of one call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub text: CommandText,
    pub tokens: Vec<ParameterToken>,
    pub kind: StatementKind,
    pub command_type: CommandType,
}

impl CommandSpec {
    pub fn dynamic(reason: DynamicReason, at: Option<Location>, command_type: CommandType) -> Self {
        Self {
            text: CommandText::Dynamic { reason, at },
            tokens: Vec::new(),
            kind: StatementKind::Undecidable,
            command_type,
        }
    }

    pub fn literal_text(&self) -> Option<&str> {
        match &self.text {
            CommandText::Literal { text, .. } => Some(text),
            CommandText::Dynamic { .. } => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.text, CommandText::Literal { .. })
    }

    pub fn is_stored_procedure(&self) -> bool {
        self.command_type == CommandType::StoredProcedure
    }

    /// Original source position of a token, through any folding.
    pub fn token_location(&self, token: &ParameterToken) -> Option<Location> {
        match &self.text {
            CommandText::Literal { map, .. } => map.locate(token.offset),
            CommandText::Dynamic { .. } => None,
        }
    }

    /// Original source position of the first occurrence of `needle`.
    pub fn locate_substring(&self, needle: &str) -> Option<Location> {
        match &self.text {
            CommandText::Literal { text, map } => text.find(needle).and_then(|at| map.locate(at)),
            CommandText::Dynamic { .. } => None,
        }
    }
}
