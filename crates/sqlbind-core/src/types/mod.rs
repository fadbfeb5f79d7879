//! Shared value types.

pub mod collections;
pub mod identifiers;
pub mod location;
