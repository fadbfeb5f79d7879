//! Diagnostics: the code table, per-site accumulation, and the cross-stage
//! rule set.

pub mod bag;
pub mod classifier;
pub mod rules;
pub mod types;

pub use bag::DiagnosticBag;
pub use classifier::{filter, DiagnosticsClassifier};
pub use rules::{Rule, SiteFacts};
pub use types::{Diagnostic, DiagnosticCode, Severity};
