//! Type resolution with a fallback for well-known host types the oracle may
//! not describe.

use sqlbind_core::symbols::{ScalarKind, SymbolOracle, TypeInfo, TypeKind, TypeRef};

/// Resolve `ty` through the oracle, falling back to built-in names.
pub fn resolve_type(oracle: &dyn SymbolOracle, ty: &TypeRef) -> Option<TypeInfo> {
    oracle.type_info(ty).or_else(|| builtin_type(ty))
}

/// Scalar kind and nullability of `ty`, if it binds as a single value.
pub fn scalar_of(oracle: &dyn SymbolOracle, ty: &TypeRef) -> Option<(ScalarKind, bool)> {
    match resolve_type(oracle, ty)?.kind {
        TypeKind::Scalar { scalar, nullable } => Some((scalar, nullable)),
        TypeKind::Enum { underlying } => Some((underlying, false)),
        _ => None,
    }
}

fn builtin_type(ty: &TypeRef) -> Option<TypeInfo> {
    let raw = ty.as_str().trim();
    let (name, nullable) = match raw.strip_suffix('?') {
        Some(inner) => (inner, true),
        None => (raw, false),
    };
    let name = name.strip_prefix("System.").unwrap_or(name);

    let kind = match name {
        "dynamic" | "object" | "Object" => TypeKind::UntypedRow,
        "DynamicParameters" | "Dapper.DynamicParameters" => TypeKind::DynamicBag,
        _ => {
            let scalar = builtin_scalar(name)?;
            // Reference-typed scalars are always nullable.
            let nullable = nullable || matches!(scalar, ScalarKind::String | ScalarKind::Binary);
            TypeKind::Scalar { scalar, nullable }
        }
    };
    Some(TypeInfo::new(ty.clone(), kind))
}

fn builtin_scalar(name: &str) -> Option<ScalarKind> {
    Some(match name {
        "bool" | "Boolean" => ScalarKind::Bool,
        "byte" | "Byte" => ScalarKind::Byte,
        "short" | "Int16" => ScalarKind::Int16,
        "int" | "Int32" => ScalarKind::Int32,
        "long" | "Int64" => ScalarKind::Int64,
        "float" | "Single" => ScalarKind::Single,
        "double" | "Double" => ScalarKind::Double,
        "decimal" | "Decimal" => ScalarKind::Decimal,
        "string" | "String" => ScalarKind::String,
        "char" | "Char" => ScalarKind::Char,
        "Guid" => ScalarKind::Guid,
        "DateTime" => ScalarKind::DateTime,
        "DateTimeOffset" => ScalarKind::DateTimeOffset,
        "TimeSpan" => ScalarKind::TimeSpan,
        "byte[]" | "Byte[]" => ScalarKind::Binary,
        _ => return None,
    })
}
