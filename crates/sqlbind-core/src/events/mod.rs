//! Progress events emitted during an analysis run.

pub mod dispatcher;
pub mod handler;
pub mod types;

pub use dispatcher::EventDispatcher;
pub use handler::{AnalysisEventHandler, NoOpEventHandler};
pub use types::*;
