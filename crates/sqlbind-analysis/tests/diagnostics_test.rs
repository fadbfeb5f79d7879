//! Diagnostics classification, end to end.

mod support;

use sqlbind_analysis::diagnostics::{Diagnostic, DiagnosticCode, Severity};
use sqlbind_analysis::{AnalysisEngine, AnalysisOutput};
use sqlbind_core::callsite::{CallSite, OperationKind, OptionSet, TextExpr};
use sqlbind_core::events::SiteOutcome;
use sqlbind_core::symbols::{MapOracle, MarkerKind, MarkerValue, SymbolOracle, SymbolRef, TypeRef};
use sqlbind_core::AnalysisConfig;
use support::{class, ctor, execute, loc, oracle, prop, query, strict};

fn run_with(config: AnalysisConfig, sites: &[CallSite], oracle: &dyn SymbolOracle) -> AnalysisOutput {
    AnalysisEngine::new(config)
        .expect("valid config")
        .analyze(sites, oracle)
        .expect("analysis runs")
}

fn run(sites: &[CallSite]) -> AnalysisOutput {
    run_with(AnalysisConfig::default(), sites, &oracle())
}

fn at(output: &AnalysisOutput, line: u32) -> Vec<&Diagnostic> {
    let site = loc(line, 9);
    output.diagnostics.iter().filter(|d| d.site == site).collect()
}

fn codes_at(output: &AnalysisOutput, line: u32) -> Vec<DiagnosticCode> {
    at(output, line).iter().map(|d| d.code).collect()
}

fn pair_oracle() -> MapOracle {
    let mut oracle = MapOracle::new();
    oracle
        .add_type(class("App.Pair", vec![ctor(&[])]), vec![prop("A", "int"), prop("B", "int")])
        .set_expr_type("pair", TypeRef::from("App.Pair"));
    oracle
}

// "update t set a = @a, b = @b": `@b` starts 25 characters into the literal.
const PAIR_SQL: &str = "update t set a = @a, b = @b";

#[test]
fn test_matching_placeholders_are_silent() {
    let output = run_with(AnalysisConfig::default(), &[execute(3, PAIR_SQL, "pair")], &pair_oracle());
    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    assert_eq!(output.outcome_at(&loc(3, 9)), Some(SiteOutcome::Specialized));
}

#[test]
fn test_placeholder_without_member_points_at_token() {
    let mut oracle = pair_oracle();
    oracle.remove_member(&TypeRef::from("App.Pair"), "B");
    let output = run_with(AnalysisConfig::default(), &[execute(4, PAIR_SQL, "pair")], &oracle);

    let found = at(&output, 4);
    assert_eq!(found.len(), 1, "{found:?}");
    assert_eq!(found[0].code, DiagnosticCode::UnmatchedSqlParameter);
    assert_eq!(found[0].severity, Severity::Warning);
    assert!(found[0].message.contains("`@b`"));
    assert_eq!(found[0].span, Some(loc(4, 21 + 25)));
    // Warnings do not block specialization.
    assert_eq!(output.outcome_at(&loc(4, 9)), Some(SiteOutcome::Specialized));
}

#[test]
fn test_member_without_placeholder_is_reported() {
    let output = run_with(
        AnalysisConfig::default(),
        &[execute(5, "update t set a = @a", "pair")],
        &pair_oracle(),
    );
    let found = at(&output, 5);
    assert_eq!(found.len(), 1, "{found:?}");
    assert_eq!(found[0].code, DiagnosticCode::UnusedParameterMember);
    assert!(found[0].message.contains("`B`"));
}

#[test]
fn test_stored_procedure_skips_placeholder_checks() {
    let output = run_with(AnalysisConfig::default(), &[execute(6, "dbo.UpdatePair", "pair")], &pair_oracle());
    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
}

#[test]
fn test_dynamic_text_in_strict_scope() {
    let site = CallSite::new(loc(7, 9), OperationKind::Execute)
        .with_text(TextExpr::opaque("BuildSql()", loc(7, 21)))
        .with_scope_options(strict());
    let output = run(&[site]);
    let found = at(&output, 7);
    assert_eq!(found.len(), 1, "{found:?}");
    assert_eq!(found[0].code, DiagnosticCode::DynamicCommandText);
    assert_eq!(found[0].span, Some(loc(7, 21)));
}

#[test]
fn test_dynamic_text_outside_strict_scope_is_silent() {
    let site = CallSite::new(loc(8, 9), OperationKind::Execute).with_text(TextExpr::opaque("BuildSql()", loc(8, 21)));
    let output = run(&[site]);
    assert!(codes_at(&output, 8).is_empty());
}

#[test]
fn test_legacy_compat_silences_strict_mode() {
    let site = CallSite::new(loc(9, 9), OperationKind::Execute).with_text(TextExpr::opaque("BuildSql()", loc(9, 21)));
    let strict_config = AnalysisConfig {
        strict_mode: Some(true),
        ..AnalysisConfig::default()
    };
    let output = run_with(strict_config.clone(), std::slice::from_ref(&site), &oracle());
    assert_eq!(codes_at(&output, 9), [DiagnosticCode::DynamicCommandText]);

    let legacy = AnalysisConfig {
        legacy_compat: Some(true),
        ..strict_config
    };
    let output = run_with(legacy, &[site], &oracle());
    assert!(codes_at(&output, 9).is_empty());
}

#[test]
fn test_empty_text() {
    let output = run(&[support::site(10, OperationKind::Execute, "   ")]);
    assert_eq!(codes_at(&output, 10), [DiagnosticCode::EmptyCommandText]);
}

#[test]
fn test_select_through_execute_is_an_error() {
    let output = run(&[support::site(11, OperationKind::Execute, "select * from customers")]);
    assert_eq!(codes_at(&output, 11), [DiagnosticCode::QueryThroughNonQuery]);
    assert_eq!(output.outcome_at(&loc(11, 9)), Some(SiteOutcome::Rejected));
    assert!(output.binding_at(&loc(11, 9)).is_none());
}

#[test]
fn test_delete_through_query_is_an_error() {
    let site = support::query(12, "delete from customers", "App.Customer");
    let output = run(&[site]);
    assert_eq!(codes_at(&output, 12), [DiagnosticCode::NonQueryThroughQuery]);
    assert!(output.has_errors());
}

#[test]
fn test_redundant_option_is_info() {
    let site = execute(13, "update customers set name = @Name where id = @Id", "customer")
        .with_scope_options(strict())
        .with_local_options(strict());
    let output = run(&[site.clone()]);
    let found = at(&output, 13);
    assert_eq!(found.len(), 1, "{found:?}");
    assert_eq!(found[0].code, DiagnosticCode::RedundantOption);
    assert_eq!(found[0].severity, Severity::Info);

    let quiet = AnalysisConfig {
        report_info: Some(false),
        ..AnalysisConfig::default()
    };
    let output = run_with(quiet, &[site], &oracle());
    assert!(codes_at(&output, 13).is_empty());
}

#[test]
fn test_suppressed_codes_are_dropped() {
    let config = AnalysisConfig {
        suppress: vec!["sqb0102".to_string()],
        ..AnalysisConfig::default()
    };
    let output = run_with(config, &[support::site(14, OperationKind::Execute, "")], &oracle());
    assert!(output.diagnostics.is_empty());
}

#[test]
fn test_disabled_rule_stays_silent() {
    let mut engine = AnalysisEngine::new(AnalysisConfig::default()).expect("valid config");
    engine.classifier_mut().disable("operation-kind");
    let output = engine
        .analyze(&[support::site(15, OperationKind::Execute, "select 1")], &oracle())
        .expect("analysis runs");
    assert!(codes_at(&output, 15).is_empty());
    assert_eq!(output.outcome_at(&loc(15, 9)), Some(SiteOutcome::Specialized));
}

#[test]
fn test_diagnostics_are_sorted_by_site_then_code() {
    let sites = vec![
        support::site(21, OperationKind::Execute, "select 1"),
        support::site(20, OperationKind::Execute, "  "),
        execute(20, "update t set a = @a", "pair"),
    ];
    // Line 20 holds two sites at one location; both are rejected.
    let output = run_with(AnalysisConfig::default(), &sites, &pair_oracle());
    let keys: Vec<(u32, DiagnosticCode)> = output.diagnostics.iter().map(|d| (d.site.line, d.code)).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
    assert!(keys.contains(&(20, DiagnosticCode::DuplicateLocation)));
    assert!(keys.contains(&(21, DiagnosticCode::QueryThroughNonQuery)));
}

#[test]
fn test_invalid_scope_marker_warns_without_blocking() {
    let mut oracle = oracle();
    let scope = SymbolRef::scope("App.Repo");
    oracle.set_marker(scope.clone(), MarkerKind::BatchSize, MarkerValue::Text("lots".into()));
    let (scope_options, invalid) = OptionSet::from_scope_chain(&oracle, &[scope]);
    let site = query(27, "select Id, Name from customers", "App.Customer")
        .with_scope_options(scope_options)
        .with_invalid_markers(invalid);

    let output = run_with(AnalysisConfig::default(), &[site], &oracle);
    let found = at(&output, 27);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].code, DiagnosticCode::InvalidMarker);
    assert_eq!(found[0].severity, Severity::Warning);
    assert!(found[0].message.contains("App.Repo: BatchSize"));
    assert_eq!(output.outcome_at(&loc(27, 9)), Some(SiteOutcome::Specialized));
}
