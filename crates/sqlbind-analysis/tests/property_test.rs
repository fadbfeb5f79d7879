//! Property tests over generated member and placeholder sets.

mod support;

use std::collections::BTreeSet;

use proptest::prelude::*;
use sqlbind_analysis::diagnostics::DiagnosticCode;
use sqlbind_analysis::sql::analyze_text;
use sqlbind_analysis::AnalysisEngine;
use sqlbind_core::symbols::{MapOracle, TypeRef};
use sqlbind_core::AnalysisConfig;
use support::{class, ctor, execute, loc, prop, query};

const NAMES: &[&str] = &["alpha", "beta", "gamma", "delta", "omega"];

fn subset(mask: u8) -> BTreeSet<&'static str> {
    NAMES
        .iter()
        .enumerate()
        .filter(|(i, _)| mask & (1 << i) != 0)
        .map(|(_, n)| *n)
        .collect()
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    chars
        .next()
        .map(|c| c.to_ascii_uppercase().to_string() + chars.as_str())
        .unwrap_or_default()
}

fn sql_for(tokens: &BTreeSet<&str>) -> String {
    if tokens.is_empty() {
        return "update t set x = 1".to_string();
    }
    let assignments: Vec<String> = tokens.iter().map(|t| format!("{t} = @{t}")).collect();
    format!("update t set {}", assignments.join(", "))
}

fn engine() -> AnalysisEngine {
    AnalysisEngine::new(AnalysisConfig::default()).expect("valid config")
}

proptest! {
    /// A placeholder with no member is reported at the placeholder; a member
    /// with no placeholder is reported by member name. Matching is
    /// case-insensitive and nothing else is reported.
    #[test]
    fn prop_parameter_usage_is_symmetric(member_mask in 0u8..32, token_mask in 0u8..32) {
        let members = subset(member_mask);
        let tokens = subset(token_mask);

        let mut oracle = MapOracle::new();
        oracle
            .add_type(
                class("App.Args", vec![ctor(&[])]),
                members.iter().map(|m| prop(&capitalize(m), "int")).collect(),
            )
            .set_expr_type("args", TypeRef::from("App.Args"));
        let sql = sql_for(&tokens);
        let output = engine().analyze(&[execute(1, &sql, "args")], &oracle).expect("analysis runs");

        let mut unmatched = BTreeSet::new();
        let mut unused = BTreeSet::new();
        for d in &output.diagnostics {
            match d.code {
                DiagnosticCode::UnmatchedSqlParameter => {
                    let span = d.span.clone().expect("placeholder span");
                    let offset = (span.column - 21) as usize;
                    let name: String = sql[offset + 1..].chars().take_while(|c| c.is_ascii_alphabetic()).collect();
                    prop_assert_eq!(&sql[offset..offset + 1], "@");
                    let quoted = format!("`@{name}`");
                    prop_assert!(d.message.contains(&quoted));
                    unmatched.insert(name);
                }
                DiagnosticCode::UnusedParameterMember => {
                    let name = members
                        .iter()
                        .find(|m| d.message.contains(&format!("`{}`", capitalize(m))))
                        .expect("message names the member");
                    unused.insert(name.to_string());
                }
                other => prop_assert!(false, "unexpected diagnostic {other:?}"),
            }
        }

        let expected_unmatched: BTreeSet<String> = tokens.difference(&members).map(|s| s.to_string()).collect();
        let expected_unused: BTreeSet<String> = members.difference(&tokens).map(|s| s.to_string()).collect();
        prop_assert_eq!(unmatched, expected_unmatched);
        prop_assert_eq!(unused, expected_unused);
        prop_assert_eq!(output.bindings.len(), 1);
    }

    /// Result types with the same member layout but different names never
    /// share an artifact; repeated sites of one type always do.
    #[test]
    fn prop_one_artifact_per_result_type(copies in 1usize..6, types in 1usize..4) {
        let mut oracle = MapOracle::new();
        for t in 0..types {
            oracle.add_type(
                class(&format!("App.T{t}"), vec![ctor(&[])]),
                vec![prop("Id", "int"), prop("Name", "string")],
            );
        }
        let mut sites = Vec::new();
        for t in 0..types {
            for c in 0..copies {
                let line = (t * 10 + c + 1) as u32;
                sites.push(query(line, "select Id, Name from items", &format!("App.T{t}")));
            }
        }
        let output = engine().analyze(&sites, &oracle).expect("analysis runs");
        prop_assert_eq!(output.artifacts.len(), types);
        prop_assert_eq!(output.bindings.len(), types * copies);
        prop_assert_eq!(output.stats.shape_cache_misses as usize, types);
        prop_assert!(output.binding_at(&loc(1, 9)).is_some());
    }

    /// Placeholders come back in first-occurrence order with repeats and
    /// quoted look-alikes dropped.
    #[test]
    fn prop_token_order_is_first_occurrence(picks in proptest::collection::vec(0usize..5, 1..12)) {
        let mut sql = String::from("select * from t where 1 = 1");
        for (i, pick) in picks.iter().enumerate() {
            sql.push_str(&format!(" and c{i} = @{} and n{i} = '@quoted'", NAMES[*pick]));
        }
        let analysis = analyze_text(&sql);

        let mut expected: Vec<&str> = Vec::new();
        for pick in &picks {
            if !expected.contains(&NAMES[*pick]) {
                expected.push(NAMES[*pick]);
            }
        }
        let names: Vec<&str> = analysis.tokens.iter().map(|t| t.name.as_str()).collect();
        prop_assert_eq!(names, expected);
        for token in &analysis.tokens {
            prop_assert_eq!(&sql[token.offset..token.offset + 1], "@");
        }
    }
}
