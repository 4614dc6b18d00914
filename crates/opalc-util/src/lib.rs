//! opalc-util - Core Utilities and Foundation Types
//!
//! This crate provides the foundation types shared by every phase of the
//! Opal compiler:
//!
//! - [`arena`]: append-only typed storage ([`Arena`]) with dense integer
//!   ids ([`Idx`], [`define_idx!`]). Every IR entity the compiler creates
//!   lives in one of these and is referenced by its id, never by pointer.
//! - [`intern`]: the string interner ([`Interner`], [`StrId`]). Identical
//!   byte sequences share one stable id, so name comparison is an integer
//!   comparison.
//! - [`span`]: source locations ([`Span`], [`FileId`]) and the loaded-file
//!   registry ([`SourceMap`]) with byte-offset to line/column conversion.
//! - [`diagnostic`]: the fatal-diagnostic type rendered by the driver as
//!   `<file>:<line>: FATAL: <message>`.
//!
//! The compiler core is strictly single-threaded; all of these types are
//! plain owned values threaded through the passes rather than globals.

pub mod arena;
pub mod diagnostic;
pub mod error;
pub mod intern;
pub mod span;

pub use arena::{Arena, Idx};
pub use diagnostic::{Diagnostic, Level};
pub use error::SourceError;
pub use intern::{Interner, StrId};
pub use span::{FileId, SourceFile, SourceMap, Span};

// Re-export the hash types the rest of the workspace uses.
pub use rustc_hash::{FxHashMap, FxHashSet};
