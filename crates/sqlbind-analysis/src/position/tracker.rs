//! Offset-to-location mapping for resolved command text.

use std::ops::Range;
use std::sync::Arc;

use sqlbind_core::Location;

use super::decode::DecodedChar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MappedPoint {
    offset: usize,
    file: u32,
    line: u32,
    column: u32,
}

/// A contiguous run of resolved text produced by one source literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentSpan {
    /// Byte range in the resolved text.
    pub range: Range<usize>,
    /// Where the literal's content starts in source.
    pub origin: Location,
}

/// Maps byte offsets of a resolved text to source locations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMap {
    files: Vec<Arc<str>>,
    points: Vec<MappedPoint>,
    fragments: Vec<FragmentSpan>,
}

impl SourceMap {
    /// Source location of the character containing `offset`.
    pub fn locate(&self, offset: usize) -> Option<Location> {
        let idx = self.points.partition_point(|p| p.offset <= offset);
        let point = self.points.get(idx.checked_sub(1)?)?;
        let file = self.files.get(point.file as usize)?;
        Some(Location {
            file: Arc::clone(file),
            line: point.line,
            column: point.column,
        })
    }

    /// The literal fragment that produced the byte at `offset`.
    pub fn fragment_at(&self, offset: usize) -> Option<&FragmentSpan> {
        let idx = self.fragments.partition_point(|f| f.range.start <= offset);
        let fragment = self.fragments.get(idx.checked_sub(1)?)?;
        fragment.range.contains(&offset).then_some(fragment)
    }

    pub fn fragments(&self) -> &[FragmentSpan] {
        &self.fragments
    }

    /// Number of mapped characters.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Accumulates resolved text and its source map while folding.
#[derive(Debug, Default)]
pub struct SourceMapBuilder {
    text: String,
    map: SourceMap,
}

impl SourceMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the decoded characters of one literal that starts at `origin`.
    pub fn push_fragment(&mut self, origin: &Location, chars: impl IntoIterator<Item = DecodedChar>) {
        let file = self.intern(&origin.file);
        let start = self.text.len();
        for decoded in chars {
            self.map.points.push(MappedPoint {
                offset: self.text.len(),
                file,
                line: decoded.line,
                column: decoded.column,
            });
            self.text.push(decoded.ch);
        }
        let end = self.text.len();
        if end > start {
            self.map.fragments.push(FragmentSpan {
                range: start..end,
                origin: origin.clone(),
            });
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn finish(self) -> (String, SourceMap) {
        (self.text, self.map)
    }

    fn intern(&mut self, file: &Arc<str>) -> u32 {
        if let Some(idx) = self.map.files.iter().position(|f| f == file) {
            return idx as u32;
        }
        self.map.files.push(Arc::clone(file));
        (self.map.files.len() - 1) as u32
    }
}
