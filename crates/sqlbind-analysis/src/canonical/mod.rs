//! Shape canonicalization and the run-scoped artifact cache.

pub mod cache;
pub mod key;

pub use cache::ShapeCache;
pub use key::{CanonicalOptions, CanonicalParameters, CanonicalShape, ShapeKey};
