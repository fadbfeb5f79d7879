//! Per-scope and per-call-site options.
//!
//! Markers are read once at the boundary into an [`OptionSet`]; the
//! analysis stages only ever see value objects.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::symbols::{MarkerKind, MarkerValue, SymbolOracle, SymbolRef};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandType {
    #[default]
    Text,
    StoredProcedure,
}

impl CommandType {
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "storedprocedure" | "stored_procedure" | "proc" => Some(Self::StoredProcedure),
            _ => None,
        }
    }
}

/// How tuple results map onto columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TupleBinding {
    ByName,
    ByPosition,
}

impl TupleBinding {
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "name" | "by_name" | "byname" => Some(Self::ByName),
            "position" | "by_position" | "byposition" => Some(Self::ByPosition),
            _ => None,
        }
    }
}

/// Options declared at one scope. `None` means "inherit".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionSet {
    /// `Some(false)` opts the region out of specialization.
    pub enabled: Option<bool>,
    /// Strict scopes warn about non-constant command text.
    pub strict_sql: Option<bool>,
    /// Reject runtime coercions when reading columns.
    pub strict_types: Option<bool>,
    /// Cache the prepared command between executions.
    pub cache_command: Option<bool>,
    pub batch_size: Option<u32>,
    pub row_count_hint: Option<u32>,
    pub command_type: Option<CommandType>,
    pub match_names_with_underscores: Option<bool>,
    pub tuple_binding: Option<TupleBinding>,
    /// Backend-specific factory override.
    pub backend: Option<String>,
    /// Member name -> column name.
    pub column_overrides: BTreeMap<String, String>,
    /// Member name -> value converter.
    pub converters: BTreeMap<String, String>,
}

impl OptionSet {
    /// `self` layered over `outer`: anything set here wins.
    pub fn overlay(&self, outer: &OptionSet) -> OptionSet {
        let mut column_overrides = outer.column_overrides.clone();
        column_overrides.extend(self.column_overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        let mut converters = outer.converters.clone();
        converters.extend(self.converters.iter().map(|(k, v)| (k.clone(), v.clone())));

        OptionSet {
            enabled: self.enabled.or(outer.enabled),
            strict_sql: self.strict_sql.or(outer.strict_sql),
            strict_types: self.strict_types.or(outer.strict_types),
            cache_command: self.cache_command.or(outer.cache_command),
            batch_size: self.batch_size.or(outer.batch_size),
            row_count_hint: self.row_count_hint.or(outer.row_count_hint),
            command_type: self.command_type.or(outer.command_type),
            match_names_with_underscores: self
                .match_names_with_underscores
                .or(outer.match_names_with_underscores),
            tuple_binding: self.tuple_binding.or(outer.tuple_binding),
            backend: self.backend.clone().or_else(|| outer.backend.clone()),
            column_overrides,
            converters,
        }
    }

    /// Options set here with exactly the value `scope` already provides.
    pub fn redundant_with(&self, scope: &OptionSet) -> Vec<String> {
        fn same<T: PartialEq>(local: &Option<T>, scope: &Option<T>) -> bool {
            local.is_some() && local == scope
        }

        let mut out = Vec::new();
        if same(&self.enabled, &scope.enabled) {
            out.push("enabled".to_string());
        }
        if same(&self.strict_sql, &scope.strict_sql) {
            out.push("strict_sql".to_string());
        }
        if same(&self.strict_types, &scope.strict_types) {
            out.push("strict_types".to_string());
        }
        if same(&self.cache_command, &scope.cache_command) {
            out.push("cache_command".to_string());
        }
        if same(&self.batch_size, &scope.batch_size) {
            out.push("batch_size".to_string());
        }
        if same(&self.row_count_hint, &scope.row_count_hint) {
            out.push("row_count_hint".to_string());
        }
        if same(&self.command_type, &scope.command_type) {
            out.push("command_type".to_string());
        }
        if same(&self.match_names_with_underscores, &scope.match_names_with_underscores) {
            out.push("match_names_with_underscores".to_string());
        }
        if same(&self.tuple_binding, &scope.tuple_binding) {
            out.push("tuple_binding".to_string());
        }
        if same(&self.backend, &scope.backend) {
            out.push("backend".to_string());
        }
        for (member, column) in &self.column_overrides {
            if scope.column_overrides.get(member) == Some(column) {
                out.push(format!("column_overrides.{member}"));
            }
        }
        for (member, converter) in &self.converters {
            if scope.converters.get(member) == Some(converter) {
                out.push(format!("converters.{member}"));
            }
        }
        out
    }

    /// Read scope-level markers declared on `symbol`. Markers whose values
    /// cannot be understood are left unset and described in the second
    /// element.
    pub fn from_markers(oracle: &dyn SymbolOracle, symbol: &SymbolRef) -> (OptionSet, Vec<String>) {
        let mut invalid = Vec::new();
        let flag = |kind: MarkerKind, invalid: &mut Vec<String>| {
            parse_marker(oracle, symbol, kind, MarkerValue::as_flag, invalid)
        };
        let count = |kind: MarkerKind, invalid: &mut Vec<String>| {
            parse_marker(oracle, symbol, kind, |v| v.as_number().and_then(|n| u32::try_from(n).ok()), invalid)
        };

        let options = OptionSet {
            enabled: flag(MarkerKind::Enabled, &mut invalid),
            strict_sql: flag(MarkerKind::StrictSql, &mut invalid),
            strict_types: flag(MarkerKind::StrictTypes, &mut invalid),
            cache_command: flag(MarkerKind::CacheCommand, &mut invalid),
            batch_size: count(MarkerKind::BatchSize, &mut invalid),
            row_count_hint: count(MarkerKind::RowCountHint, &mut invalid),
            command_type: parse_marker(
                oracle,
                symbol,
                MarkerKind::CommandType,
                |v| v.as_text().and_then(CommandType::parse_str),
                &mut invalid,
            ),
            match_names_with_underscores: flag(MarkerKind::MatchNamesWithUnderscores, &mut invalid),
            tuple_binding: parse_marker(
                oracle,
                symbol,
                MarkerKind::TupleBinding,
                |v| v.as_text().and_then(TupleBinding::parse_str),
                &mut invalid,
            ),
            // Unknown backend names are resolved later against the connection type.
            backend: parse_marker(
                oracle,
                symbol,
                MarkerKind::Backend,
                |v| v.as_text().map(str::to_string),
                &mut invalid,
            ),
            column_overrides: BTreeMap::new(),
            converters: BTreeMap::new(),
        };
        (options, invalid)
    }

    /// Fold a scope chain (innermost first) into one inherited option set,
    /// collecting invalid markers from every scope, outermost first.
    pub fn from_scope_chain(oracle: &dyn SymbolOracle, chain: &[SymbolRef]) -> (OptionSet, Vec<String>) {
        let mut invalid = Vec::new();
        let options = chain.iter().rev().fold(OptionSet::default(), |outer, symbol| {
            let (scope, bad) = OptionSet::from_markers(oracle, symbol);
            invalid.extend(bad);
            scope.overlay(&outer)
        });
        (options, invalid)
    }

    /// Concrete values with defaults applied.
    pub fn resolve(&self) -> EffectiveOptions {
        EffectiveOptions {
            enabled: self.enabled.unwrap_or(true),
            strict_sql: self.strict_sql.unwrap_or(false),
            strict_types: self.strict_types.unwrap_or(false),
            cache_command: self.cache_command.unwrap_or(false),
            batch_size: self.batch_size.unwrap_or(0),
            row_count_hint: self.row_count_hint,
            command_type: self.command_type,
            match_names_with_underscores: self.match_names_with_underscores.unwrap_or(false),
            tuple_binding: self.tuple_binding,
            backend: self.backend.clone(),
            column_overrides: self.column_overrides.clone(),
            converters: self.converters.clone(),
        }
    }
}

/// Fully-resolved options for one call site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectiveOptions {
    pub enabled: bool,
    pub strict_sql: bool,
    pub strict_types: bool,
    pub cache_command: bool,
    /// 0 = no batching limit.
    pub batch_size: u32,
    pub row_count_hint: Option<u32>,
    pub command_type: Option<CommandType>,
    pub match_names_with_underscores: bool,
    pub tuple_binding: Option<TupleBinding>,
    pub backend: Option<String>,
    pub column_overrides: BTreeMap<String, String>,
    pub converters: BTreeMap<String, String>,
}

impl Default for EffectiveOptions {
    fn default() -> Self {
        OptionSet::default().resolve()
    }
}

fn parse_marker<T>(
    oracle: &dyn SymbolOracle,
    symbol: &SymbolRef,
    kind: MarkerKind,
    parse: impl Fn(&MarkerValue) -> Option<T>,
    invalid: &mut Vec<String>,
) -> Option<T> {
    let value = oracle.marker(symbol, kind)?;
    let parsed = parse(&value);
    if parsed.is_none() {
        invalid.push(format!("{symbol}: {kind:?} marker value {value:?} is not valid"));
    }
    parsed
}
