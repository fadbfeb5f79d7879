//! # sqlbind-core
//!
//! Foundation crate for the sqlbind call-site specialization engine.
//! Defines locations, identifiers, the symbol model consumed from the host
//! toolchain, call-site input records, errors, config, events, and tracing.
//! The analysis crate depends on this.

pub mod callsite;
pub mod config;
pub mod errors;
pub mod events;
pub mod logging;
pub mod symbols;
pub mod types;

// Re-export the most commonly used types at the crate root.
pub use callsite::{CallSite, OperationKind, OptionSet, TextExpr};
pub use config::AnalysisConfig;
pub use errors::error_code::SqlbindErrorCode;
pub use events::handler::AnalysisEventHandler;
pub use symbols::oracle::SymbolOracle;
pub use types::collections::{FxHashMap, FxHashSet};
pub use types::identifiers::ArtifactId;
pub use types::location::Location;
