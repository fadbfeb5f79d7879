//! Error types for every subsystem.
//!
//! Per-call-site problems are never errors at this level: they become
//! diagnostics. These types cover run-level failures, configuration, and
//! executing a generated artifact.

pub mod analysis_error;
pub mod bind_error;
pub mod config_error;
pub mod error_code;

pub use analysis_error::AnalysisError;
pub use bind_error::BindError;
pub use config_error::ConfigError;
