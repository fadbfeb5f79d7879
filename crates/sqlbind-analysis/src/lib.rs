//! # sqlbind-analysis
//!
//! Call-site specialization engine. Resolves command text, models
//! parameter and result shapes, deduplicates them by canonical key,
//! synthesizes reflection-free binders and readers, classifies
//! diagnostics, and records call-site redirections.

pub mod canonical;
pub mod diagnostics;
pub mod engine;
pub mod position;
pub mod redirect;
pub mod shapes;
pub mod sql;
pub mod synth;

pub use engine::output::{AnalysisOutput, ArtifactSink, CollectingSink};
pub use engine::pipeline::AnalysisEngine;
