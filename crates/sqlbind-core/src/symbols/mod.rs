//! The symbol model supplied by the host toolchain.
//!
//! The engine never walks inheritance or inspects host declarations
//! itself. It consumes pre-flattened views through [`oracle::SymbolOracle`].

pub mod markers;
pub mod oracle;
pub mod types;

pub use markers::{MarkerKind, MarkerValue, SymbolRef};
pub use oracle::{MapOracle, SymbolOracle};
pub use types::{
    Accessibility, ConstructorInfo, FactoryInfo, MemberInfo, MemberKind, ParamInfo, ScalarKind,
    TupleElement, TypeInfo, TypeKind, TypeRef, WriteAccess,
};
