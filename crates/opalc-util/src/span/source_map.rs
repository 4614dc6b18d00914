//! Source map for loaded files and offset-to-line conversion.

use std::path::{Path, PathBuf};

use crate::arena::Arena;
use crate::error::SourceError;

use super::FileId;

/// A source file loaded whole into memory.
pub struct SourceFile {
    /// Path the file was loaded from (or a display name for tests).
    path: PathBuf,
    /// Entire file content.
    src: String,
    /// Byte offset of the start of every line, for offset-to-line lookup.
    line_starts: Vec<usize>,
}

impl SourceFile {
    fn new(path: PathBuf, src: String) -> Self {
        let line_starts = compute_line_starts(&src);
        Self {
            path,
            src,
            line_starts,
        }
    }

    /// Display name of the file.
    #[inline]
    pub fn name(&self) -> String {
        self.path.display().to_string()
    }

    /// File content.
    #[inline]
    pub fn src(&self) -> &str {
        &self.src
    }

    /// File size in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.src.len()
    }

    /// Convert a byte offset to 1-based (line, column).
    ///
    /// Offsets past the end of the file report the last line.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => (line + 1, 1),
            Err(next) => {
                let line = next - 1;
                (line + 1, offset - self.line_starts[line] + 1)
            }
        }
    }
}

fn compute_line_starts(src: &str) -> Vec<usize> {
    let mut starts = vec![0];
    for (i, b) in src.bytes().enumerate() {
        if b == b'\n' {
            starts.push(i + 1);
        }
    }
    starts
}

/// Registry of every file known to the compiler.
///
/// Files are identified by [`FileId`] and never removed.
pub struct SourceMap {
    files: Arena<FileId, SourceFile>,
}

impl SourceMap {
    /// Create an empty source map.
    pub fn new() -> Self {
        Self {
            files: Arena::new(),
        }
    }

    /// Read a file from disk, whole, and register it.
    pub fn load(&mut self, path: &Path) -> Result<FileId, SourceError> {
        let src = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.files.push(SourceFile::new(path.to_path_buf(), src)))
    }

    /// Register in-memory content under a display name. Test helper and
    /// library entry point for callers that already hold the text.
    pub fn add(&mut self, name: impl Into<PathBuf>, src: impl Into<String>) -> FileId {
        self.files.push(SourceFile::new(name.into(), src.into()))
    }

    /// Look up a registered file.
    ///
    /// # Panics
    ///
    /// Panics if the id was not produced by this map.
    #[inline]
    pub fn file(&self, id: FileId) -> &SourceFile {
        &self.files[id]
    }

    /// Number of registered files.
    #[inline]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// True if no file has been registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl Default for SourceMap {
    fn default() -> Self {
        Self::new()
    }
}
