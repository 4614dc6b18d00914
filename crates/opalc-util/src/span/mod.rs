//! Span module - source location tracking.
//!
//! A [`Span`] is a byte range inside one loaded file. Line and column
//! numbers are not stored on the span; they are computed on demand by the
//! [`SourceMap`] from precomputed line starts, which keeps the span an
//! 8-plus-4-byte value that every token and diagnostic can carry freely.

mod source_map;

pub use source_map::{SourceFile, SourceMap};

crate::define_idx!(FileId);

/// A byte range in a source file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    /// File the range belongs to.
    pub file: FileId,
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl Span {
    /// Create a new span.
    #[inline]
    pub fn new(file: FileId, start: usize, end: usize) -> Self {
        Self { file, start, end }
    }

    /// A zero-width span at a single offset.
    #[inline]
    pub fn point(file: FileId, offset: usize) -> Self {
        Self {
            file,
            start: offset,
            end: offset,
        }
    }

    /// Length of the range in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True if the range is zero-width.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Smallest span covering both `self` and `other`.
    ///
    /// Both spans must belong to the same file; the file of `self` wins.
    #[inline]
    pub fn to(self, other: Span) -> Span {
        Span {
            file: self.file,
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}
