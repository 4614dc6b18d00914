//! Diagnostic rendering.
//!
//! The compiler is fail-fast: every pass returns a typed error to the
//! driver, which converts it into one [`Diagnostic`] and renders it as
//!
//! ```text
//! <file>:<line>: FATAL: <message>
//! ```
//!
//! on standard error before exiting non-zero. Lexical and syntactic
//! errors carry the offending byte offset; semantic errors name the
//! involved symbol or type and point at the closest known use site.

use std::fmt;

use crate::span::{SourceMap, Span};

/// Diagnostic severity level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    /// A fatal error; compilation stops at the first one.
    Fatal,
    /// A non-fatal notice. The conforming front end never emits these,
    /// but downstream consumers of the IR may.
    Warning,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Fatal => write!(f, "FATAL"),
            Level::Warning => write!(f, "warning"),
        }
    }
}

/// A single diagnostic message.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    /// Severity.
    pub level: Level,
    /// Human-readable message.
    pub message: String,
    /// Location, when one is known. Semantic errors about cyclic types
    /// may not have a precise location.
    pub span: Option<Span>,
}

impl Diagnostic {
    /// Create a fatal diagnostic.
    pub fn fatal(message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            level: Level::Fatal,
            message: message.into(),
            span,
        }
    }

    /// Render the diagnostic against the loaded sources.
    ///
    /// Falls back to line 1 when no span is available.
    pub fn render(&self, sources: &SourceMap) -> String {
        match self.span {
            Some(span) => {
                let file = sources.file(span.file);
                let (line, _col) = file.line_col(span.start);
                format!("{}:{}: {}: {}", file.name(), line, self.level, self.message)
            }
            None if !sources.is_empty() => {
                let file = sources.file(crate::span::FileId(0));
                format!("{}:1: {}: {}", file.name(), self.level, self.message)
            }
            None => format!("<input>:1: {}: {}", self.level, self.message),
        }
    }
}
