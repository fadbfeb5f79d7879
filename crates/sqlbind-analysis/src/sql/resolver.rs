//! Constant folding of command-text expressions into SQL text plus a
//! position map back into source.

use std::collections::BTreeMap;

use sqlbind_core::callsite::{CallSite, CommandType, EffectiveOptions, InterpolationPart, TextExpr};
use sqlbind_core::Location;

use super::cache::CommandTextCache;
use super::types::{CommandSpec, CommandText, DynamicReason, StatementKind};
use crate::position::{decode_fragment, decode_number, SourceMapBuilder};

type Dynamic = (DynamicReason, Option<Location>);

/// Resolves the command text of call sites, sharing lexing work through a
/// content-keyed cache.
pub struct SqlTextResolver {
    cache: CommandTextCache,
}

impl SqlTextResolver {
    pub fn new(cache_capacity: u64) -> Self {
        Self {
            cache: CommandTextCache::new(cache_capacity),
        }
    }

    pub fn cache(&self) -> &CommandTextCache {
        &self.cache
    }

    pub fn resolve(&self, site: &CallSite, options: &EffectiveOptions) -> CommandSpec {
        let explicit = options.command_type;
        let Some(expr) = &site.command_text else {
            return CommandSpec::dynamic(DynamicReason::Null, None, explicit.unwrap_or_default());
        };

        let (text, map) = match fold(expr, &site.locals) {
            Ok(folded) => folded,
            Err((reason, at)) => {
                tracing::debug!(site = %site.location, reason = %reason.describe(), "dynamic command text");
                return CommandSpec::dynamic(reason, at, explicit.unwrap_or_default());
            }
        };

        let analysis = self.cache.analyze(&text);
        let command_type = explicit.unwrap_or(if analysis.looks_like_procedure {
            CommandType::StoredProcedure
        } else {
            CommandType::Text
        });

        let (tokens, kind) = match command_type {
            CommandType::StoredProcedure => (Vec::new(), StatementKind::Undecidable),
            CommandType::Text => (analysis.tokens.clone(), analysis.kind),
        };

        CommandSpec {
            text: CommandText::Literal { text, map },
            tokens,
            kind,
            command_type,
        }
    }
}

/// Fold `expr` into one string, resolving local constants from `locals`.
pub fn fold(
    expr: &TextExpr,
    locals: &BTreeMap<String, TextExpr>,
) -> Result<(String, crate::position::SourceMap), Dynamic> {
    let mut folder = Folder {
        locals,
        active: Vec::new(),
        builder: SourceMapBuilder::new(),
    };
    folder.fold(expr, false)?;
    Ok(folder.builder.finish())
}

struct Folder<'a> {
    locals: &'a BTreeMap<String, TextExpr>,
    /// Locals currently being expanded, for cycle detection.
    active: Vec<&'a str>,
    builder: SourceMapBuilder,
}

impl<'a> Folder<'a> {
    fn fold(&mut self, expr: &'a TextExpr, embedded: bool) -> Result<(), Dynamic> {
        match expr {
            TextExpr::Literal(fragment) => {
                self.builder.push_fragment(&fragment.start, decode_fragment(fragment, false));
                Ok(())
            }
            TextExpr::Number { value, at } => {
                if !embedded {
                    return Err((
                        DynamicReason::Opaque {
                            description: value.to_string(),
                        },
                        Some(at.clone()),
                    ));
                }
                self.builder.push_fragment(at, decode_number(*value, at));
                Ok(())
            }
            TextExpr::Concat { parts } => parts.iter().try_for_each(|part| self.fold(part, true)),
            TextExpr::Interpolated { parts } => parts.iter().try_for_each(|part| match part {
                InterpolationPart::Text(fragment) => {
                    self.builder.push_fragment(&fragment.start, decode_fragment(fragment, true));
                    Ok(())
                }
                InterpolationPart::Hole { expr } => self.fold(expr, true),
            }),
            TextExpr::Local { name, at } => {
                if self.active.contains(&name.as_str()) {
                    return Err((DynamicReason::CyclicLocal { name: name.clone() }, Some(at.clone())));
                }
                let Some(value) = self.locals.get(name) else {
                    return Err((DynamicReason::UnknownLocal { name: name.clone() }, Some(at.clone())));
                };
                self.active.push(name);
                let folded = self.fold(value, embedded);
                self.active.pop();
                folded
            }
            TextExpr::Null { at } => Err((DynamicReason::Null, Some(at.clone()))),
            TextExpr::Opaque { description, at } => Err((
                DynamicReason::Opaque {
                    description: description.clone(),
                },
                Some(at.clone()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(line: u32, column: u32) -> Location {
        Location::new("Repo.cs", line, column)
    }

    #[test]
    fn test_concat_of_locals() {
        let mut locals = BTreeMap::new();
        locals.insert("Cols".to_string(), TextExpr::literal("id, name", at(1, 30)));
        let expr = TextExpr::concat(vec![
            TextExpr::literal("select ", at(5, 20)),
            TextExpr::local("Cols", at(5, 30)),
            TextExpr::literal(" from t", at(5, 40)),
        ]);

        let (text, map) = fold(&expr, &locals).unwrap();
        assert_eq!(text, "select id, name from t");
        assert_eq!(map.locate(7), Some(at(1, 30)));
        assert_eq!(map.locate(15), Some(at(5, 40)));
    }

    #[test]
    fn test_number_folds_only_when_embedded() {
        let hole = TextExpr::Interpolated {
            parts: vec![
                InterpolationPart::Text(sqlbind_core::callsite::LiteralFragment::new(
                    "select top ",
                    sqlbind_core::callsite::LiteralForm::Regular,
                    at(2, 10),
                )),
                InterpolationPart::Hole {
                    expr: TextExpr::Number { value: 10, at: at(2, 22) },
                },
            ],
        };
        let (text, _) = fold(&hole, &BTreeMap::new()).unwrap();
        assert_eq!(text, "select top 10");

        let bare = TextExpr::Number { value: 10, at: at(2, 22) };
        assert!(fold(&bare, &BTreeMap::new()).is_err());
    }

    #[test]
    fn test_cycle_is_dynamic() {
        let mut locals = BTreeMap::new();
        locals.insert("A".to_string(), TextExpr::local("B", at(1, 1)));
        locals.insert("B".to_string(), TextExpr::local("A", at(2, 1)));
        let err = fold(&TextExpr::local("A", at(3, 1)), &locals).unwrap_err();
        assert!(matches!(err.0, DynamicReason::CyclicLocal { .. }));
    }

    #[test]
    fn test_unknown_local_and_opaque() {
        let err = fold(&TextExpr::local("Missing", at(1, 1)), &BTreeMap::new()).unwrap_err();
        assert_eq!(err.0, DynamicReason::UnknownLocal { name: "Missing".into() });

        let err = fold(&TextExpr::opaque("BuildSql()", at(4, 9)), &BTreeMap::new()).unwrap_err();
        assert_eq!(err.1, Some(at(4, 9)));
    }

    #[test]
    fn test_same_local_twice_is_not_a_cycle() {
        let mut locals = BTreeMap::new();
        locals.insert("X".to_string(), TextExpr::literal("1", at(1, 1)));
        let expr = TextExpr::concat(vec![
            TextExpr::local("X", at(2, 1)),
            TextExpr::literal("+", at(2, 5)),
            TextExpr::local("X", at(2, 7)),
        ]);
        assert_eq!(fold(&expr, &locals).unwrap().0, "1+1");
    }
}
