//! Errors raised while executing a generated binder or reader.

use super::error_code::{self, SqlbindErrorCode};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BindError {
    #[error("Expected {expected} existing parameters, found {actual}")]
    ParameterCountMismatch { expected: usize, actual: usize },

    #[error("Parameter {index} is `{actual}`, expected `{expected}`")]
    ParameterOrderMismatch {
        index: usize,
        expected: String,
        actual: String,
    },

    #[error("Column `{column}` holds {actual}, strict typing requires {expected}")]
    StrictTypeMismatch {
        column: String,
        expected: String,
        actual: String,
    },

    #[error("Cannot convert {value} in column `{column}` to {target}")]
    ConversionFailed {
        column: String,
        value: String,
        target: String,
    },

    #[error("Row has {actual} values but the reader schema has {expected} columns")]
    RowWidthMismatch { expected: usize, actual: usize },

    #[error("Artifact {artifact} has no row reader")]
    NoReader { artifact: String },
}

impl SqlbindErrorCode for BindError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ParameterCountMismatch { .. } => error_code::BIND_COUNT_MISMATCH,
            Self::ParameterOrderMismatch { .. } => error_code::BIND_ORDER_MISMATCH,
            Self::StrictTypeMismatch { .. } => error_code::BIND_STRICT_TYPE,
            Self::ConversionFailed { .. } => error_code::BIND_CONVERSION,
            Self::RowWidthMismatch { .. } => error_code::BIND_SCHEMA,
            Self::NoReader { .. } => error_code::BIND_NO_READER,
        }
    }
}
