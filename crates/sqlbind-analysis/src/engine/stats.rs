//! Run summary counters.

use serde::Serialize;
use sqlbind_core::events::SiteOutcome;

use crate::diagnostics::{Diagnostic, Severity};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisStats {
    pub call_sites: usize,
    pub specialized: usize,
    pub deferred: usize,
    pub rejected: usize,
    pub opted_out: usize,
    /// Distinct artifacts after deduplication.
    pub artifacts: usize,
    pub shape_cache_hits: u64,
    pub shape_cache_misses: u64,
    pub text_cache_hits: u64,
    pub text_cache_misses: u64,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    pub elapsed_ms: u64,
}

impl AnalysisStats {
    pub fn record_outcome(&mut self, outcome: SiteOutcome) {
        self.call_sites += 1;
        match outcome {
            SiteOutcome::Specialized => self.specialized += 1,
            SiteOutcome::Deferred => self.deferred += 1,
            SiteOutcome::Rejected => self.rejected += 1,
            SiteOutcome::OptedOut => self.opted_out += 1,
        }
    }

    pub fn record_diagnostics(&mut self, diagnostics: &[Diagnostic]) {
        for d in diagnostics {
            match d.severity {
                Severity::Error => self.errors += 1,
                Severity::Warning => self.warnings += 1,
                Severity::Info => self.infos += 1,
            }
        }
    }

    pub fn diagnostics(&self) -> usize {
        self.errors + self.warnings + self.infos
    }

    /// Share of specialized sites that reused an existing artifact.
    pub fn reuse_rate(&self) -> f64 {
        if self.specialized == 0 {
            0.0
        } else {
            (self.specialized - self.artifacts.min(self.specialized)) as f64 / self.specialized as f64
        }
    }
}
