//! The analysis pipeline and its output.

pub mod output;
pub mod pipeline;
mod site;
pub mod stats;

pub use output::{AnalysisOutput, ArtifactSink, CollectingSink, SiteReport};
pub use pipeline::AnalysisEngine;
pub use stats::AnalysisStats;
