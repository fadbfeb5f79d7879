//! SQL text resolution: constant folding, placeholder extraction, and
//! query/non-query classification.

pub mod cache;
pub mod classify;
pub mod lexer;
pub mod resolver;
pub mod types;

pub use cache::CommandTextCache;
pub use resolver::SqlTextResolver;
pub use types::{CommandSpec, CommandText, DynamicReason, ParameterToken, StatementKind, TextAnalysis};

/// Lex and classify a fully-resolved command text.
pub fn analyze_text(text: &str) -> TextAnalysis {
    let tokens = lexer::lex(text);
    TextAnalysis {
        tokens: classify::parameter_tokens(&tokens),
        kind: classify::classify(&tokens),
        looks_like_procedure: classify::looks_like_procedure(text),
    }
}
