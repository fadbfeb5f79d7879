//! Cross-stage rules: findings that need the resolved command text together
//! with the modeled shapes. Stage-local problems (inaccessible types,
//! ambiguous construction, ...) are reported by the modelers themselves.

use sqlbind_core::callsite::{CallSite, EffectiveOptions, OptionSet, OperationKind};

use super::bag::DiagnosticBag;
use super::types::DiagnosticCode;
use crate::shapes::ParameterOutcome;
use crate::sql::{CommandSpec, CommandText, DynamicReason, StatementKind};

/// Everything a rule may look at for one call site.
pub struct SiteFacts<'a> {
    pub site: &'a CallSite,
    pub command: &'a CommandSpec,
    pub options: &'a EffectiveOptions,
    /// The enclosing scope's options, global defaults included.
    pub scope: &'a OptionSet,
    pub parameters: &'a ParameterOutcome,
    /// Legacy-compatible scopes stay silent about dynamic text.
    pub legacy_compat: bool,
}

pub trait Rule: Send + Sync {
    /// Stable identifier, used to disable the rule.
    fn id(&self) -> &'static str;

    /// Codes this rule can report.
    fn codes(&self) -> &'static [DiagnosticCode];

    fn evaluate(&self, facts: &SiteFacts<'_>, bag: &mut DiagnosticBag);
}

pub struct DynamicTextRule;

impl Rule for DynamicTextRule {
    fn id(&self) -> &'static str {
        "dynamic-text"
    }

    fn codes(&self) -> &'static [DiagnosticCode] {
        &[DiagnosticCode::DynamicCommandText]
    }

    fn evaluate(&self, facts: &SiteFacts<'_>, bag: &mut DiagnosticBag) {
        if !facts.options.strict_sql || facts.legacy_compat {
            return;
        }
        if let CommandText::Dynamic { reason, at } = &facts.command.text {
            if *reason == DynamicReason::Null {
                return;
            }
            bag.report_at(
                DiagnosticCode::DynamicCommandText,
                at.clone(),
                format!("{}; the command cannot be checked", reason.describe()),
            );
        }
    }
}

pub struct EmptyTextRule;

impl Rule for EmptyTextRule {
    fn id(&self) -> &'static str {
        "empty-text"
    }

    fn codes(&self) -> &'static [DiagnosticCode] {
        &[DiagnosticCode::EmptyCommandText]
    }

    fn evaluate(&self, facts: &SiteFacts<'_>, bag: &mut DiagnosticBag) {
        let empty = match &facts.command.text {
            CommandText::Literal { text, .. } => text.trim().is_empty(),
            CommandText::Dynamic { reason, .. } => *reason == DynamicReason::Null,
        };
        if empty {
            bag.report(DiagnosticCode::EmptyCommandText, "command text is null or empty");
        }
    }
}

/// Placeholders against bound members, each direction reported on its own.
pub struct ParameterUsageRule;

impl Rule for ParameterUsageRule {
    fn id(&self) -> &'static str {
        "parameter-usage"
    }

    fn codes(&self) -> &'static [DiagnosticCode] {
        &[DiagnosticCode::UnmatchedSqlParameter, DiagnosticCode::UnusedParameterMember]
    }

    fn evaluate(&self, facts: &SiteFacts<'_>, bag: &mut DiagnosticBag) {
        let command = facts.command;
        if !command.is_literal() || command.is_stored_procedure() {
            return;
        }
        let ParameterOutcome::Shape(shape) = facts.parameters else {
            return;
        };
        if facts.site.parameters.is_none() {
            return;
        }

        for token in &command.tokens {
            if !shape.bindings.iter().any(|b| b.name.eq_ignore_ascii_case(&token.name)) {
                bag.report_at(
                    DiagnosticCode::UnmatchedSqlParameter,
                    command.token_location(token),
                    format!("`{}` has no matching parameter member", token.spelled()),
                );
            }
        }

        for binding in &shape.bindings {
            // Output and return values are declared by the provider, not the text.
            if !binding.direction.sends_value() {
                continue;
            }
            if !command.tokens.iter().any(|t| t.name.eq_ignore_ascii_case(&binding.name)) {
                bag.report(
                    DiagnosticCode::UnusedParameterMember,
                    format!("member `{}` is not referenced by the command text", binding.source_member),
                );
            }
        }
    }
}

pub struct OperationKindRule;

impl Rule for OperationKindRule {
    fn id(&self) -> &'static str {
        "operation-kind"
    }

    fn codes(&self) -> &'static [DiagnosticCode] {
        &[DiagnosticCode::QueryThroughNonQuery, DiagnosticCode::NonQueryThroughQuery]
    }

    fn evaluate(&self, facts: &SiteFacts<'_>, bag: &mut DiagnosticBag) {
        let op = facts.site.operation;
        match facts.command.kind {
            StatementKind::Query if op == OperationKind::Execute => bag.report(
                DiagnosticCode::QueryThroughNonQuery,
                format!("the command returns rows but is run through {op}"),
            ),
            StatementKind::NonQuery if op.expects_rows() => bag.report(
                DiagnosticCode::NonQueryThroughQuery,
                format!("the command returns no rows but is run through {op}"),
            ),
            _ => {}
        }
    }
}

pub struct RedundantOptionRule;

impl Rule for RedundantOptionRule {
    fn id(&self) -> &'static str {
        "redundant-option"
    }

    fn codes(&self) -> &'static [DiagnosticCode] {
        &[DiagnosticCode::RedundantOption]
    }

    fn evaluate(&self, facts: &SiteFacts<'_>, bag: &mut DiagnosticBag) {
        for name in facts.site.local_options.redundant_with(facts.scope) {
            bag.report(
                DiagnosticCode::RedundantOption,
                format!("option `{name}` repeats the enclosing scope's value"),
            );
        }
    }
}

/// The built-in rule set, in evaluation order.
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(DynamicTextRule),
        Box::new(EmptyTextRule),
        Box::new(ParameterUsageRule),
        Box::new(OperationKindRule),
        Box::new(RedundantOptionRule),
    ]
}
