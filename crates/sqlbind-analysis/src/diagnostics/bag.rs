use sqlbind_core::Location;

use super::types::{Diagnostic, DiagnosticCode, Severity};

/// Findings for one call site, accumulated by every stage that looks at it.
#[derive(Debug, Clone)]
pub struct DiagnosticBag {
    site: Location,
    items: Vec<Diagnostic>,
}

impl DiagnosticBag {
    pub fn new(site: Location) -> Self {
        Self {
            site,
            items: Vec::new(),
        }
    }

    pub fn site(&self) -> &Location {
        &self.site
    }

    pub fn report(&mut self, code: DiagnosticCode, message: impl Into<String>) {
        self.items.push(Diagnostic::new(code, self.site.clone(), message));
    }

    pub fn report_at(&mut self, code: DiagnosticCode, span: Option<Location>, message: impl Into<String>) {
        self.items
            .push(Diagnostic::new(code, self.site.clone(), message).with_span(span));
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn contains(&self, code: DiagnosticCode) -> bool {
        self.items.iter().any(|d| d.code == code)
    }

    pub fn extend(&mut self, other: DiagnosticBag) {
        self.items.extend(other.items);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}
