//! Per-member markers, read once into a value object.

use sqlbind_core::symbols::{MarkerKind, MarkerValue, SymbolOracle, SymbolRef, TypeRef};

use super::types::{DbType, ParameterDirection};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberOptions {
    pub bind_name: Option<String>,
    pub db_type: Option<DbType>,
    pub direction: Option<ParameterDirection>,
    pub size: Option<i32>,
    /// `Some(false)` excludes the member; `Some(true)` insists on it.
    pub include: Option<bool>,
    pub return_value: bool,
    pub column_name: Option<String>,
    pub converter: Option<String>,
}

impl MemberOptions {
    /// Read the markers on `owner.member`. Markers whose values cannot be
    /// understood are ignored and described in the second element.
    pub fn lookup(oracle: &dyn SymbolOracle, owner: &TypeRef, member: &str) -> (Self, Vec<String>) {
        let symbol = SymbolRef::member(owner, member);
        let mut opts = Self::default();
        let mut invalid = Vec::new();
        let mut bad = |kind: MarkerKind, value: &MarkerValue| {
            invalid.push(format!("{owner}.{member}: {kind:?} marker value {value:?} is not valid"));
        };

        if let Some(v) = oracle.marker(&symbol, MarkerKind::BindName) {
            match v.as_text().map(str::trim).filter(|s| !s.is_empty()) {
                Some(name) => opts.bind_name = Some(strip_prefix(name).to_string()),
                None => bad(MarkerKind::BindName, &v),
            }
        }
        if let Some(v) = oracle.marker(&symbol, MarkerKind::DbType) {
            match v.as_text().and_then(DbType::parse_str) {
                Some(t) => opts.db_type = Some(t),
                None => bad(MarkerKind::DbType, &v),
            }
        }
        if let Some(v) = oracle.marker(&symbol, MarkerKind::Direction) {
            match v.as_text().and_then(ParameterDirection::parse_str) {
                Some(d) => opts.direction = Some(d),
                None => bad(MarkerKind::Direction, &v),
            }
        }
        if let Some(v) = oracle.marker(&symbol, MarkerKind::Size) {
            match v.as_number().and_then(|n| i32::try_from(n).ok()).filter(|n| *n >= -1) {
                Some(n) => opts.size = Some(n),
                None => bad(MarkerKind::Size, &v),
            }
        }
        if let Some(v) = oracle.marker(&symbol, MarkerKind::Include) {
            match v.as_flag() {
                Some(f) => opts.include = Some(f),
                None => bad(MarkerKind::Include, &v),
            }
        }
        if let Some(v) = oracle.marker(&symbol, MarkerKind::ReturnValue) {
            match v.as_flag() {
                Some(f) => opts.return_value = f,
                None => bad(MarkerKind::ReturnValue, &v),
            }
        }
        if let Some(v) = oracle.marker(&symbol, MarkerKind::ColumnName) {
            match v.as_text().map(str::trim).filter(|s| !s.is_empty()) {
                Some(name) => opts.column_name = Some(name.to_string()),
                None => bad(MarkerKind::ColumnName, &v),
            }
        }
        if let Some(v) = oracle.marker(&symbol, MarkerKind::ValueConverter) {
            match v.as_text().map(str::trim).filter(|s| !s.is_empty()) {
                Some(name) => opts.converter = Some(name.to_string()),
                None => bad(MarkerKind::ValueConverter, &v),
            }
        }

        (opts, invalid)
    }

    /// Direction after applying the return-value marker.
    pub fn effective_direction(&self) -> ParameterDirection {
        if self.return_value {
            ParameterDirection::ReturnValue
        } else {
            self.direction.unwrap_or_default()
        }
    }
}

/// Bind names may be written with their SQL prefix.
fn strip_prefix(name: &str) -> &str {
    name.strip_prefix(['@', '$', ':', '?']).unwrap_or(name)
}
