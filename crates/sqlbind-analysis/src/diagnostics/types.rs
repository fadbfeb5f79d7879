//! Diagnostic vocabulary: severities, stable codes, findings.

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlbind_core::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

macro_rules! diagnostic_codes {
    ($($variant:ident => ($id:literal, $severity:ident, $title:literal),)*) => {
        /// Stable diagnostic identifiers. Ids never change meaning once published.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum DiagnosticCode {
            $(#[serde(rename = $id)] $variant,)*
        }

        impl DiagnosticCode {
            pub const ALL: &'static [DiagnosticCode] = &[$(Self::$variant,)*];

            pub fn id(&self) -> &'static str {
                match self { $(Self::$variant => $id,)* }
            }

            /// Default severity for findings with this code.
            pub fn severity(&self) -> Severity {
                match self { $(Self::$variant => Severity::$severity,)* }
            }

            pub fn title(&self) -> &'static str {
                match self { $(Self::$variant => $title,)* }
            }
        }
    };
}

diagnostic_codes! {
    DynamicCommandText => ("SQB0101", Warning, "command text is not a constant"),
    EmptyCommandText => ("SQB0102", Warning, "command text is empty"),
    UnmatchedSqlParameter => ("SQB0201", Warning, "SQL parameter has no matching member"),
    UnusedParameterMember => ("SQB0202", Warning, "member is not referenced by the SQL"),
    DuplicateBindName => ("SQB0203", Error, "several members bind to one parameter name"),
    InaccessibleParameterType => ("SQB0204", Error, "parameter type is not accessible"),
    UnresolvedParameterType => ("SQB0205", Warning, "parameter type could not be resolved"),
    DynamicParameterBag => ("SQB0206", Info, "dynamic parameter bag is bound at runtime"),
    UnsupportedParameterType => ("SQB0207", Error, "parameter type is not supported"),
    BatchRequiresExecute => ("SQB0208", Error, "sequence parameters require an execute operation"),
    NonWritableOutputMember => ("SQB0209", Error, "output parameter member is not writable"),
    InaccessibleMember => ("SQB0210", Error, "included member is not accessible"),
    InvalidMarker => ("SQB0211", Warning, "marker value is not understood"),
    TupleWithoutOptIn => ("SQB0301", Error, "tuple results need an explicit binding mode"),
    AmbiguousConstruction => ("SQB0302", Error, "construction strategy is ambiguous"),
    NoConstructionStrategy => ("SQB0303", Error, "result type cannot be constructed"),
    FactorySignatureMismatch => ("SQB0304", Error, "factory parameters do not match members"),
    InaccessibleResultType => ("SQB0305", Error, "result type is not accessible"),
    UnresolvedResultType => ("SQB0306", Error, "result type could not be resolved"),
    UnsupportedResultType => ("SQB0307", Error, "result type is not supported"),
    ScalarResultNotScalar => ("SQB0308", Error, "scalar operation with a non-scalar result"),
    DuplicateColumnName => ("SQB0309", Error, "several members read one column"),
    QueryThroughNonQuery => ("SQB0401", Error, "row-producing SQL through a non-query operation"),
    NonQueryThroughQuery => ("SQB0402", Error, "non-query SQL through a row-reading operation"),
    RedundantOption => ("SQB0501", Info, "option repeats the enclosing scope"),
    DuplicateLocation => ("SQB0601", Error, "several call sites share one location"),
    InternalFailure => ("SQB0901", Error, "analysis of this call site failed"),
}

impl DiagnosticCode {
    /// Parse an id such as `SQB0201`, case-insensitively.
    pub fn parse_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.id().eq_ignore_ascii_case(id.trim()))
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// One finding, attributed to a call site and optionally to the exact span
/// inside the call site's arguments that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub site: Location,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Location>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, site: Location, message: impl Into<String>) -> Self {
        Self {
            severity: code.severity(),
            code,
            site,
            span: None,
            message: message.into(),
        }
    }

    pub fn with_span(mut self, span: Option<Location>) -> Self {
        self.span = span;
        self
    }

    /// Where the finding should be shown: the span if known, else the site.
    pub fn primary_location(&self) -> &Location {
        self.span.as_ref().unwrap_or(&self.site)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Total order used for output: site, then code, then span and message.
    pub fn sort_key(&self) -> (&Location, DiagnosticCode, Option<&Location>, &str) {
        (&self.site, self.code, self.span.as_ref(), &self.message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {}: {}",
            self.primary_location(),
            self.severity,
            self.code,
            self.message
        )
    }
}
