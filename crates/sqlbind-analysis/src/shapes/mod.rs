//! Parameter and result shape modeling.
//!
//! Both modelers are pure functions of a call site, its effective options,
//! and the symbol oracle. They report findings into the site's
//! [`DiagnosticBag`](crate::diagnostics::DiagnosticBag) and never share
//! mutable state, so they run side by side.

pub mod members;
pub mod parameters;
pub mod results;
pub mod scalars;
pub mod types;

pub use parameters::{ParameterOutcome, ParameterShapeModeler};
pub use results::{ResultOutcome, ResultShapeModeler};
pub use types::{
    BindTarget, ColumnBinding, ColumnMatch, ConstructionStrategy, DbType, ParameterBinding, ParameterCategory,
    ParameterDirection, ParameterShape, ResultKind, ResultShape,
};
