//! Configuration for an analysis run.

pub mod analysis_config;

pub use analysis_config::AnalysisConfig;
