//! Rule registry: register, disable by id, run with panic isolation.

use std::collections::HashSet;

use sqlbind_core::AnalysisConfig;

use super::bag::DiagnosticBag;
use super::rules::{default_rules, Rule, SiteFacts};
use super::types::{Diagnostic, DiagnosticCode, Severity};

pub struct DiagnosticsClassifier {
    rules: Vec<Box<dyn Rule>>,
    disabled: HashSet<String>,
}

impl DiagnosticsClassifier {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            disabled: HashSet::new(),
        }
    }

    /// Registry with every built-in rule.
    pub fn with_default_rules() -> Self {
        let mut classifier = Self::new();
        for rule in default_rules() {
            classifier.register(rule);
        }
        classifier
    }

    pub fn register(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn disable(&mut self, id: &str) {
        self.disabled.insert(id.to_string());
    }

    pub fn enable(&mut self, id: &str) {
        self.disabled.remove(id);
    }

    /// Run every enabled rule. A panicking rule reports an internal failure
    /// for the site, discards its partial findings, and the rest still run.
    pub fn classify(&self, facts: &SiteFacts<'_>, bag: &mut DiagnosticBag) {
        for rule in self.rules.iter().filter(|r| !self.disabled.contains(r.id())) {
            let mut local = DiagnosticBag::new(bag.site().clone());
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                rule.evaluate(facts, &mut local);
            }));
            match result {
                Ok(()) => bag.extend(local),
                Err(payload) => {
                    let detail = panic_detail(payload.as_ref());
                    tracing::error!(rule_id = rule.id(), site = %facts.site.location, detail = %detail, "rule panicked during evaluation");
                    bag.report(
                        DiagnosticCode::InternalFailure,
                        format!("rule `{}` failed: {detail}", rule.id()),
                    );
                }
            }
        }
    }

    pub fn count(&self) -> usize {
        self.rules.len()
    }

    pub fn enabled_count(&self) -> usize {
        self.rules.iter().filter(|r| !self.disabled.contains(r.id())).count()
    }

    /// Every code an enabled rule can report.
    pub fn active_codes(&self) -> Vec<DiagnosticCode> {
        let mut codes: Vec<DiagnosticCode> = self
            .rules
            .iter()
            .filter(|r| !self.disabled.contains(r.id()))
            .flat_map(|r| r.codes().iter().copied())
            .collect();
        codes.sort();
        codes.dedup();
        codes
    }
}

impl Default for DiagnosticsClassifier {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

pub(crate) fn panic_detail(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Drop suppressed codes and, unless enabled, info-level findings.
pub fn filter(diagnostics: Vec<Diagnostic>, config: &AnalysisConfig) -> Vec<Diagnostic> {
    let report_info = config.effective_report_info();
    diagnostics
        .into_iter()
        .filter(|d| report_info || d.severity != Severity::Info)
        .filter(|d| !config.is_suppressed(d.code.id()))
        .collect()
}
