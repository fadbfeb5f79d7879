//! Shared fixtures: an in-memory symbol oracle with a few typical types and
//! builders for call sites.

#![allow(dead_code)]

use sqlbind_core::callsite::{ArgExpr, CallSite, OperationKind, OptionSet, TextExpr};
use sqlbind_core::symbols::{
    Accessibility, ConstructorInfo, FactoryInfo, MapOracle, MemberInfo, MemberKind, ParamInfo, TypeInfo, TypeKind,
    TypeRef, WriteAccess,
};
use sqlbind_core::Location;

pub const FILE: &str = "src/Repository.cs";

pub fn loc(line: u32, column: u32) -> Location {
    Location::new(FILE, line, column)
}

pub fn prop(name: &str, ty: &str) -> MemberInfo {
    MemberInfo {
        name: name.to_string(),
        ty: TypeRef::from(ty),
        kind: MemberKind::Property,
        accessibility: Accessibility::Public,
        readable: true,
        write: WriteAccess::Settable,
    }
}

pub fn read_only(name: &str, ty: &str) -> MemberInfo {
    MemberInfo {
        write: WriteAccess::ReadOnly,
        ..prop(name, ty)
    }
}

pub fn params(list: &[(&str, &str)]) -> Vec<ParamInfo> {
    list.iter()
        .map(|(name, ty)| ParamInfo {
            name: name.to_string(),
            ty: TypeRef::from(*ty),
        })
        .collect()
}

pub fn ctor(list: &[(&str, &str)]) -> ConstructorInfo {
    ConstructorInfo {
        parameters: params(list),
        accessibility: Accessibility::Public,
        is_primary: false,
    }
}

pub fn factory(name: &str, list: &[(&str, &str)]) -> FactoryInfo {
    FactoryInfo {
        name: name.to_string(),
        parameters: params(list),
        accessibility: Accessibility::Public,
    }
}

/// A public class with the given constructors.
pub fn class(name: &str, constructors: Vec<ConstructorInfo>) -> TypeInfo {
    let mut info = TypeInfo::new(name, TypeKind::Object);
    info.constructors = constructors;
    info
}

/// Oracle with the types most tests need:
///
/// - `App.Customer { Id: int, Name: string }`, parameterless constructor
/// - `App.Order { OrderId: long, Total: decimal, Note: string? }`
/// - `App.Hidden`, nested inside a private class
/// - argument keys `customer`, `order`, `orders` (a list of orders),
///   `hidden`, `bag` (dynamic parameters), `count` (an int)
pub fn oracle() -> MapOracle {
    let mut oracle = MapOracle::new();
    oracle
        .add_type(class("App.Customer", vec![ctor(&[])]), vec![prop("Id", "int"), prop("Name", "string")])
        .add_type(
            class("App.Order", vec![ctor(&[])]),
            vec![prop("OrderId", "long"), prop("Total", "decimal"), prop("Note", "string?")],
        )
        .add_type(
            TypeInfo::new(
                "List<App.Order>",
                TypeKind::Sequence {
                    element: TypeRef::from("App.Order"),
                },
            ),
            Vec::new(),
        )
        .set_expr_type("customer", TypeRef::from("App.Customer"))
        .set_expr_type("order", TypeRef::from("App.Order"))
        .set_expr_type("orders", TypeRef::from("List<App.Order>"))
        .set_expr_type("bag", TypeRef::from("DynamicParameters"))
        .set_expr_type("count", TypeRef::from("int"));

    let mut hidden = class("App.Outer.Hidden", vec![ctor(&[])]);
    hidden.containing.push(Accessibility::Private);
    oracle
        .add_type(hidden, vec![prop("Id", "int")])
        .set_expr_type("hidden", TypeRef::from("App.Outer.Hidden"));
    oracle
}

/// A site on `line` whose command text is one regular literal starting one
/// column after the opening quote at column 20.
pub fn site(line: u32, operation: OperationKind, sql: &str) -> CallSite {
    CallSite::new(loc(line, 9), operation).with_text(TextExpr::literal(sql, loc(line, 21)))
}

pub fn query(line: u32, sql: &str, result: &str) -> CallSite {
    site(line, OperationKind::query(), sql).with_result_type(result)
}

pub fn execute(line: u32, sql: &str, args: &str) -> CallSite {
    site(line, OperationKind::Execute, sql).with_parameters(ArgExpr::new(args, loc(line, 40)))
}

pub fn strict() -> OptionSet {
    OptionSet {
        strict_sql: Some(true),
        ..OptionSet::default()
    }
}
