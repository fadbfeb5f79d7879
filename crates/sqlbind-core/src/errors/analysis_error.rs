//! Run-level analysis errors. Any of these halts the whole run.

use super::error_code::{self, SqlbindErrorCode};
use super::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Two different canonical shapes produced the same cache key, or a
    /// published artifact disagrees with its key.
    #[error("Shape cache corrupted at key {key:016x}: {details}")]
    CacheCorruption { key: u64, details: String },

    #[error("Internal invariant violated: {message}")]
    InvariantViolation { message: String },

    #[error("Failed to build worker pool: {message}")]
    ThreadPool { message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl SqlbindErrorCode for AnalysisError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::CacheCorruption { .. } => error_code::CACHE_CORRUPTION,
            Self::InvariantViolation { .. } => error_code::INVARIANT_VIOLATION,
            Self::ThreadPool { .. } => error_code::THREAD_POOL,
            Self::Config(e) => e.error_code(),
        }
    }
}
