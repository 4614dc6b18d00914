//! Core error types for the util crate.

use std::path::PathBuf;

use thiserror::Error;

/// Error raised while loading source files.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
