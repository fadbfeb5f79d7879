//! Command-text resolution: folding, position attribution, classification.

mod support;

use proptest::prelude::*;
use sqlbind_analysis::sql::{CommandText, DynamicReason, SqlTextResolver, StatementKind};
use sqlbind_core::callsite::{
    CallSite, CommandType, EffectiveOptions, InterpolationPart, LiteralForm, LiteralFragment, OperationKind, TextExpr,
};
use support::loc;

fn resolve(site: &CallSite) -> sqlbind_analysis::sql::CommandSpec {
    SqlTextResolver::new(64).resolve(site, &EffectiveOptions::default())
}

#[test]
fn test_two_literal_concat_attributes_each_fragment() {
    // "select " at line 4 col 20, "1;" at line 5 col 24
    let site = CallSite::new(loc(4, 9), OperationKind::Execute).with_text(TextExpr::concat(vec![
        TextExpr::literal("select ", loc(4, 20)),
        TextExpr::literal("1;", loc(5, 24)),
    ]));
    let spec = resolve(&site);
    assert_eq!(spec.literal_text(), Some("select 1;"));
    assert_eq!(spec.locate_substring("select"), Some(loc(4, 20)));
    assert_eq!(spec.locate_substring("1;"), Some(loc(5, 24)));
    assert_eq!(spec.locate_substring(";"), Some(loc(5, 25)));
    assert_eq!(spec.kind, StatementKind::Query);
}

#[test]
fn test_token_through_local_constant_points_at_declaration() {
    let site = CallSite::new(loc(30, 9), OperationKind::Execute)
        .with_text(TextExpr::concat(vec![
            TextExpr::literal("delete from t where ", loc(30, 20)),
            TextExpr::local("Filter", loc(30, 45)),
        ]))
        .with_local("Filter", TextExpr::literal("id = @id", loc(12, 33)));
    let spec = resolve(&site);
    assert_eq!(spec.tokens.len(), 1);
    assert_eq!(spec.token_location(&spec.tokens[0]), Some(loc(12, 38)));
    assert_eq!(spec.kind, StatementKind::NonQuery);
}

#[test]
fn test_escapes_keep_source_columns() {
    // Raw text: select '\t', @x  -> the escape takes two source columns.
    let site = CallSite::new(loc(1, 1), OperationKind::query())
        .with_text(TextExpr::literal("select '\\t', @x", loc(1, 10)));
    let spec = resolve(&site);
    assert_eq!(spec.literal_text(), Some("select '\t', @x"));
    let token = &spec.tokens[0];
    assert_eq!(token.spelled(), "@x");
    assert_eq!(spec.token_location(token), Some(loc(1, 23)));
}

#[test]
fn test_verbatim_multiline_positions() {
    let text = "select *\nfrom t\nwhere id = @id";
    let site = CallSite::new(loc(1, 1), OperationKind::query()).with_text(TextExpr::verbatim(text, loc(7, 30)));
    let spec = resolve(&site);
    let token = &spec.tokens[0];
    assert_eq!(spec.token_location(token), Some(loc(9, 12)));
}

#[test]
fn test_interpolated_constant_hole_folds() {
    let site = CallSite::new(loc(1, 1), OperationKind::query())
        .with_text(TextExpr::Interpolated {
            parts: vec![
                InterpolationPart::Text(LiteralFragment::new("select * from ", LiteralForm::Regular, loc(3, 12))),
                InterpolationPart::Hole {
                    expr: TextExpr::local("Table", loc(3, 27)),
                },
                InterpolationPart::Text(LiteralFragment::new(" where id = @id", LiteralForm::Regular, loc(3, 34))),
            ],
        })
        .with_local("Table", TextExpr::literal("users", loc(2, 20)));
    let spec = resolve(&site);
    assert_eq!(spec.literal_text(), Some("select * from users where id = @id"));
    assert_eq!(spec.locate_substring("users"), Some(loc(2, 20)));
}

#[test]
fn test_non_constant_hole_is_dynamic() {
    let site = CallSite::new(loc(1, 1), OperationKind::query()).with_text(TextExpr::Interpolated {
        parts: vec![
            InterpolationPart::Text(LiteralFragment::new("select * from ", LiteralForm::Regular, loc(3, 12))),
            InterpolationPart::Hole {
                expr: TextExpr::opaque("tableName", loc(3, 27)),
            },
        ],
    });
    let spec = resolve(&site);
    match &spec.text {
        CommandText::Dynamic { reason, at } => {
            assert!(matches!(reason, DynamicReason::Opaque { .. }));
            assert_eq!(at.as_ref(), Some(&loc(3, 27)));
        }
        other => panic!("expected dynamic text, got {other:?}"),
    }
    assert_eq!(spec.kind, StatementKind::Undecidable);
    assert!(spec.tokens.is_empty());
}

#[test]
fn test_bare_identifier_is_stored_procedure() {
    let site = CallSite::new(loc(1, 1), OperationKind::query()).with_text(TextExpr::literal("dbo.GetOrders", loc(1, 5)));
    let spec = resolve(&site);
    assert_eq!(spec.command_type, CommandType::StoredProcedure);
    assert_eq!(spec.kind, StatementKind::Undecidable);
}

#[test]
fn test_explicit_text_command_type_wins() {
    let site = CallSite::new(loc(1, 1), OperationKind::query()).with_text(TextExpr::literal("GetOrders", loc(1, 5)));
    let options = EffectiveOptions {
        command_type: Some(CommandType::Text),
        ..EffectiveOptions::default()
    };
    let spec = SqlTextResolver::new(8).resolve(&site, &options);
    assert_eq!(spec.command_type, CommandType::Text);
}

#[test]
fn test_identical_text_is_lexed_once() {
    let resolver = SqlTextResolver::new(64);
    let options = EffectiveOptions::default();
    for line in 1..=4 {
        let site = support::query(line, "select * from t where id = @id", "App.Customer");
        resolver.resolve(&site, &options);
    }
    assert_eq!(resolver.cache().miss_count(), 1);
    assert_eq!(resolver.cache().hit_count(), 3);
}

proptest! {
    /// However a text is split into concatenated literals, every character
    /// maps back to the fragment it was written in.
    #[test]
    fn prop_split_concat_attributes_to_fragment(
        text in "[a-z @;=]{2,40}",
        cut in 1usize..40,
    ) {
        let cut = cut.min(text.len() - 1);
        let (left, right) = text.split_at(cut);
        let site = CallSite::new(loc(1, 1), OperationKind::Execute).with_text(TextExpr::concat(vec![
            TextExpr::literal(left, loc(10, 5)),
            TextExpr::literal(right, loc(20, 7)),
        ]));
        let spec = resolve(&site);
        let CommandText::Literal { text: folded, map } = &spec.text else {
            panic!("literal concat must fold");
        };
        prop_assert_eq!(folded.as_str(), text.as_str());
        for offset in 0..text.len() {
            let expected = if offset < cut {
                loc(10, 5 + offset as u32)
            } else {
                loc(20, 7 + (offset - cut) as u32)
            };
            prop_assert_eq!(map.locate(offset), Some(expected));
        }
    }
}
