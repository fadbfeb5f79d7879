//! Statement classification and placeholder extraction over lexed SQL.

use rustc_hash::FxHashSet;

use super::lexer::{SqlToken, SqlTokenKind};
use super::types::{ParameterToken, StatementKind};

/// Verbs that can start a statement when no separator precedes them.
const STATEMENT_VERBS: &[&str] = &[
    "SELECT", "INSERT", "UPDATE", "DELETE", "MERGE", "WITH", "EXEC", "EXECUTE", "CALL",
];

/// Statements that never produce rows themselves; a statement glued on after
/// them without a separator still counts.
const PREAMBLE_VERBS: &[&str] = &[
    "DECLARE", "SET", "USE", "PRINT", "RAISERROR", "THROW", "OPEN", "CLOSE", "DEALLOCATE",
    "COMMIT", "ROLLBACK", "SAVE", "LOCK", "RETURN",
];

/// Statements whose embedded SELECT belongs to a definition.
const DEFINITION_VERBS: &[&str] = &[
    "CREATE", "ALTER", "DROP", "TRUNCATE", "GRANT", "REVOKE", "VACUUM", "ANALYZE", "COMMENT",
    "REINDEX", "ATTACH", "DETACH",
];

/// Classify a whole command: any row-producing statement makes it a query.
pub fn classify(tokens: &[SqlToken<'_>]) -> StatementKind {
    let mut saw_statement = false;
    let mut saw_undecidable = false;

    for statement in tokens.split(|t| t.kind == SqlTokenKind::Semicolon) {
        let words = top_level_words(statement);
        if words.is_empty() {
            continue;
        }
        saw_statement = true;
        match classify_statement(&words) {
            StatementKind::Query => return StatementKind::Query,
            StatementKind::Undecidable => saw_undecidable = true,
            StatementKind::NonQuery => {}
        }
    }

    if saw_undecidable || !saw_statement {
        StatementKind::Undecidable
    } else {
        StatementKind::NonQuery
    }
}

/// Words outside any parentheses, in order.
fn top_level_words<'a>(tokens: &[SqlToken<'a>]) -> Vec<&'a str> {
    let mut depth = 0usize;
    let mut words = Vec::new();
    for token in tokens {
        match token.kind {
            SqlTokenKind::OpenParen => depth += 1,
            SqlTokenKind::CloseParen => depth = depth.saturating_sub(1),
            SqlTokenKind::Word if depth == 0 => words.push(token.text),
            _ => {}
        }
    }
    words
}

fn is(word: &str, keyword: &str) -> bool {
    word.eq_ignore_ascii_case(keyword)
}

fn is_any(word: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| is(word, k))
}

fn position_of(words: &[&str], keywords: &[&str]) -> Option<usize> {
    words.iter().position(|w| is_any(w, keywords))
}

fn classify_statement(words: &[&str]) -> StatementKind {
    let Some(first) = words.first() else {
        return StatementKind::NonQuery;
    };

    match first.to_ascii_uppercase().as_str() {
        "WITH" => match position_of(&words[1..], &["SELECT", "INSERT", "UPDATE", "DELETE", "MERGE"]) {
            Some(at) => classify_statement(&words[at + 1..]),
            None => StatementKind::Undecidable,
        },
        "SELECT" => select_kind(words),
        "INSERT" => dml_kind(words, true),
        "UPDATE" | "DELETE" | "MERGE" | "UPSERT" | "REPLACE" => dml_kind(words, false),
        "EXEC" | "EXECUTE" | "CALL" | "PRAGMA" => StatementKind::Undecidable,
        "VALUES" | "SHOW" | "EXPLAIN" | "DESCRIBE" | "DESC" | "TABLE" => StatementKind::Query,
        "IF" | "WHILE" | "BEGIN" | "CASE" | "ELSE" | "END" => {
            if position_of(&words[1..], &["SELECT", "OUTPUT", "RETURNING", "EXEC", "EXECUTE"]).is_some() {
                StatementKind::Undecidable
            } else {
                StatementKind::NonQuery
            }
        }
        _ if is_any(first, DEFINITION_VERBS) => StatementKind::NonQuery,
        _ if is_any(first, PREAMBLE_VERBS) => {
            if words.iter().any(|w| is(w, "CURSOR")) {
                return StatementKind::NonQuery;
            }
            match position_of(&words[1..], STATEMENT_VERBS) {
                Some(at) => classify_statement(&words[at + 1..]),
                None => StatementKind::NonQuery,
            }
        }
        _ => StatementKind::Undecidable,
    }
}

/// `SELECT ... INTO target` stores rows instead of returning them.
fn select_kind(words: &[&str]) -> StatementKind {
    let into = position_of(words, &["INTO"]);
    let from = position_of(words, &["FROM"]);
    match (into, from) {
        (Some(i), Some(f)) if i < f => StatementKind::NonQuery,
        (Some(_), None) => StatementKind::NonQuery,
        _ => StatementKind::Query,
    }
}

fn dml_kind(words: &[&str], is_insert: bool) -> StatementKind {
    if let Some(at) = position_of(words, &["OUTPUT", "RETURNING"]) {
        // OUTPUT ... INTO @t and RETURNING ... INTO :v capture instead of returning.
        let rest = &words[at + 1..];
        let clause_end = position_of(rest, &["SELECT", "VALUES", "FROM", "WHERE", "SET", "DEFAULT"])
            .unwrap_or(rest.len());
        if position_of(&rest[..clause_end], &["INTO"]).is_none() {
            return StatementKind::Query;
        }
    }

    let search_from = if is_insert {
        match position_of(words, &["VALUES"]) {
            Some(at) => at + 1,
            None => return StatementKind::NonQuery,
        }
    } else {
        1
    };

    match position_of(&words[search_from..], &["SELECT"]) {
        Some(at) => classify_statement(&words[search_from + at..]),
        None => StatementKind::NonQuery,
    }
}

/// Distinct placeholders in first-occurrence order, excluding variables the
/// text declares itself.
pub fn parameter_tokens(tokens: &[SqlToken<'_>]) -> Vec<ParameterToken> {
    let declared = declared_variables(tokens);
    let mut seen = FxHashSet::default();
    let mut out = Vec::new();

    for token in tokens {
        let SqlTokenKind::Parameter { prefix } = token.kind else {
            continue;
        };
        if declared.contains(token.text) || !seen.insert(token.text) {
            continue;
        }
        out.push(ParameterToken {
            name: token.text.to_string(),
            prefix,
            offset: token.offset,
        });
    }
    out
}

fn declared_variables<'a>(tokens: &[SqlToken<'a>]) -> FxHashSet<&'a str> {
    let mut declared = FxHashSet::default();
    let mut declaring = false;
    let mut expect_name = false;
    let mut depth = 0usize;

    for token in tokens {
        match token.kind {
            SqlTokenKind::Word if token.is_word("DECLARE") => {
                declaring = true;
                expect_name = true;
                continue;
            }
            SqlTokenKind::Word if depth == 0 && is_any(token.text, STATEMENT_VERBS) => declaring = false,
            SqlTokenKind::Semicolon => declaring = false,
            SqlTokenKind::OpenParen => depth += 1,
            SqlTokenKind::CloseParen => depth = depth.saturating_sub(1),
            SqlTokenKind::Comma if declaring && depth == 0 => {
                expect_name = true;
                continue;
            }
            SqlTokenKind::Parameter { .. } if declaring && expect_name => {
                declared.insert(token.text);
            }
            _ => {}
        }
        expect_name = false;
    }
    declared
}

/// A bare identifier (optionally schema-qualified or bracketed) names a
/// stored procedure.
pub fn looks_like_procedure(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '[' | ']' | '"' | '#'))
        && trimmed.chars().any(char::is_alphabetic)
}
