//! Argument expressions as seen by the SQL text resolver.

use serde::{Deserialize, Serialize};

use crate::types::location::Location;

/// How a literal is spelled in source, which decides how escapes decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteralForm {
    /// Backslash escapes.
    Regular,
    /// Doubled-quote escapes; may span lines.
    Verbatim,
    /// No escapes at all; may span lines.
    Raw,
}

/// A literal exactly as written between its delimiters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiteralFragment {
    /// Source text between the delimiters, escapes not yet decoded.
    pub text: String,
    pub form: LiteralForm,
    /// Position of the first content character.
    pub start: Location,
}

impl LiteralFragment {
    pub fn new(text: impl Into<String>, form: LiteralForm, start: Location) -> Self {
        Self {
            text: text.into(),
            form,
            start,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "part", rename_all = "snake_case")]
pub enum InterpolationPart {
    Text(LiteralFragment),
    Hole { expr: TextExpr },
}

/// The command-text argument expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "expr", rename_all = "snake_case")]
pub enum TextExpr {
    Literal(LiteralFragment),
    /// Integer constant; folds to its decimal text inside holes.
    Number { value: i64, at: Location },
    Concat { parts: Vec<TextExpr> },
    Interpolated { parts: Vec<InterpolationPart> },
    /// Reference to a named local constant.
    Local { name: String, at: Location },
    Null { at: Location },
    /// Anything the scanner could not express as a constant.
    Opaque { description: String, at: Location },
}

impl TextExpr {
    /// A regular literal starting at `start`.
    pub fn literal(text: impl Into<String>, start: Location) -> Self {
        Self::Literal(LiteralFragment::new(text, LiteralForm::Regular, start))
    }

    pub fn verbatim(text: impl Into<String>, start: Location) -> Self {
        Self::Literal(LiteralFragment::new(text, LiteralForm::Verbatim, start))
    }

    pub fn raw(text: impl Into<String>, start: Location) -> Self {
        Self::Literal(LiteralFragment::new(text, LiteralForm::Raw, start))
    }

    pub fn concat(parts: Vec<TextExpr>) -> Self {
        Self::Concat { parts }
    }

    pub fn local(name: impl Into<String>, at: Location) -> Self {
        Self::Local {
            name: name.into(),
            at,
        }
    }

    pub fn opaque(description: impl Into<String>, at: Location) -> Self {
        Self::Opaque {
            description: description.into(),
            at,
        }
    }

    /// Where the expression starts, when the scanner recorded it.
    pub fn location(&self) -> Option<&Location> {
        match self {
            Self::Literal(frag) => Some(&frag.start),
            Self::Number { at, .. }
            | Self::Local { at, .. }
            | Self::Null { at }
            | Self::Opaque { at, .. } => Some(at),
            Self::Concat { parts } => parts.iter().find_map(|p| p.location()),
            Self::Interpolated { parts } => parts.iter().find_map(|p| match p {
                InterpolationPart::Text(frag) => Some(&frag.start),
                InterpolationPart::Hole { expr } => expr.location(),
            }),
        }
    }
}

/// A non-text argument (parameters, options) identified by a scanner key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArgExpr {
    /// Identity the oracle uses for `static_type_of`.
    pub key: String,
    pub at: Location,
}

impl ArgExpr {
    pub fn new(key: impl Into<String>, at: Location) -> Self {
        Self {
            key: key.into(),
            at,
        }
    }
}
