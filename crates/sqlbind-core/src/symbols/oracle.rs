//! The symbol-resolution oracle and an in-memory implementation.

use crate::callsite::ArgExpr;
use crate::types::collections::FxHashMap;

use super::markers::{MarkerKind, MarkerValue, SymbolRef};
use super::types::{MemberInfo, TypeInfo, TypeRef};

/// Symbol lookups supplied by the host toolchain.
///
/// Calls are synchronous; batching and caching are the implementor's
/// concern. Implementations must be shareable across worker threads.
pub trait SymbolOracle: Send + Sync {
    /// Static type of an argument expression, if the host could resolve it.
    fn static_type_of(&self, expr: &ArgExpr) -> Option<TypeRef>;

    /// Descriptor for a named type.
    fn type_info(&self, ty: &TypeRef) -> Option<TypeInfo>;

    /// Data members of a type with inheritance flattened, base members first.
    fn members_of(&self, ty: &TypeRef) -> Vec<MemberInfo>;

    /// A declared marker on a symbol.
    fn marker(&self, symbol: &SymbolRef, kind: MarkerKind) -> Option<MarkerValue>;
}

/// Map-backed oracle for hosts that pre-extract their symbol tables.
#[derive(Debug, Clone, Default)]
pub struct MapOracle {
    expr_types: FxHashMap<String, TypeRef>,
    types: FxHashMap<TypeRef, TypeInfo>,
    members: FxHashMap<TypeRef, Vec<MemberInfo>>,
    markers: FxHashMap<(SymbolRef, MarkerKind), MarkerValue>,
}

impl MapOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type with its flattened members.
    pub fn add_type(&mut self, info: TypeInfo, members: Vec<MemberInfo>) -> &mut Self {
        self.members.insert(info.name.clone(), members);
        self.types.insert(info.name.clone(), info);
        self
    }

    /// Bind an argument expression key to its static type.
    pub fn set_expr_type(&mut self, key: impl Into<String>, ty: TypeRef) -> &mut Self {
        self.expr_types.insert(key.into(), ty);
        self
    }

    pub fn set_marker(&mut self, symbol: SymbolRef, kind: MarkerKind, value: MarkerValue) -> &mut Self {
        self.markers.insert((symbol, kind), value);
        self
    }

    /// Drop a member from a registered type.
    pub fn remove_member(&mut self, ty: &TypeRef, name: &str) -> &mut Self {
        if let Some(members) = self.members.get_mut(ty) {
            members.retain(|m| m.name != name);
        }
        self
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }
}

impl SymbolOracle for MapOracle {
    fn static_type_of(&self, expr: &ArgExpr) -> Option<TypeRef> {
        self.expr_types.get(&expr.key).cloned()
    }

    fn type_info(&self, ty: &TypeRef) -> Option<TypeInfo> {
        self.types.get(ty).cloned()
    }

    fn members_of(&self, ty: &TypeRef) -> Vec<MemberInfo> {
        self.members.get(ty).cloned().unwrap_or_default()
    }

    fn marker(&self, symbol: &SymbolRef, kind: MarkerKind) -> Option<MarkerValue> {
        self.markers.get(&(symbol.clone(), kind)).cloned()
    }
}
