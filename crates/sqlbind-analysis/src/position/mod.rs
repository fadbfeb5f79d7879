//! Source position tracking across constant folding.
//!
//! Every character of a resolved command text remembers the source
//! position of the literal character that produced it, so diagnostics about
//! a folded text can point at the original fragment.

pub mod decode;
pub mod tracker;

pub use decode::{decode_fragment, decode_number, DecodedChar};
pub use tracker::{FragmentSpan, SourceMap, SourceMapBuilder};
