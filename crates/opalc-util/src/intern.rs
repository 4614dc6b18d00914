//! String interning for identifier and literal handling.
//!
//! The interner canonicalizes byte sequences: two equal strings share one
//! stable [`StrId`], so name equality anywhere in the compiler is a single
//! integer comparison. String content lives in one flat byte buffer; a
//! per-string offset table (with a trailing sentinel offset) gives each id
//! its `[pos(i), pos(i+1))` slice, so `len(s) = pos(s+1) - pos(s)` holds
//! for every interned string.
//!
//! Lookup is a hash of the bytes into a chain of candidate ids that are
//! compared byte-wise, which is what guarantees set semantics even under
//! hash collisions.
//!
//! Unlike a global string table, the interner is an owned value carried by
//! the IR and threaded through the passes; the core is single-threaded and
//! needs no locking.
//!
//! # Examples
//!
//! ```
//! use opalc_util::intern::Interner;
//!
//! let mut interner = Interner::new();
//! let a = interner.intern("main");
//! let b = interner.intern("main");
//! let c = interner.intern("other");
//!
//! assert_eq!(a, b);
//! assert_ne!(a, c);
//! assert_eq!(interner.get(a), "main");
//! assert_eq!(interner.len_of(c), 5);
//! ```

use std::hash::{Hash, Hasher};

use rustc_hash::{FxHashMap, FxHasher};

crate::define_idx!(StrId);

// StrId is handed around by the million; keep it a bare u32.
static_assertions::assert_eq_size!(StrId, u32);

/// The string interner.
///
/// Append-only like every other arena: an interned string is never
/// dropped, and its id and byte slice stay valid for the life of the
/// compilation.
#[derive(Debug)]
pub struct Interner {
    /// Flat storage for all string content, in intern order.
    buf: Vec<u8>,
    /// Offset table: string `i` occupies `buf[pos[i]..pos[i + 1]]`.
    /// Always holds one trailing sentinel entry (the end of the buffer),
    /// so `pos.len() == count + 1`.
    pos: Vec<u32>,
    /// Hash of the bytes to the chain of ids with that hash. Chains are
    /// walked with a byte-wise compare, so colliding strings still get
    /// distinct ids.
    map: FxHashMap<u64, Vec<StrId>>,
}

impl Interner {
    /// Create an empty interner.
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            pos: vec![0],
            map: FxHashMap::default(),
        }
    }

    /// Intern a string, returning its stable id.
    ///
    /// Interning the same byte sequence twice returns the same id;
    /// differing sequences always get distinct ids.
    pub fn intern(&mut self, s: &str) -> StrId {
        let hash = Self::hash_bytes(s.as_bytes());

        if let Some(chain) = self.map.get(&hash) {
            for &id in chain {
                if self.bytes_of(id) == s.as_bytes() {
                    return id;
                }
            }
        }

        let id = StrId(self.count() as u32);
        self.buf.extend_from_slice(s.as_bytes());
        self.pos.push(self.buf.len() as u32);
        self.map.entry(hash).or_default().push(id);
        id
    }

    /// Get the string for an id.
    ///
    /// # Panics
    ///
    /// Panics if the id was not produced by this interner.
    pub fn get(&self, id: StrId) -> &str {
        // SAFETY: the buffer only ever receives whole `&str` slices and
        // `pos` entries only ever mark their boundaries, so every
        // `[pos(i), pos(i + 1))` window is valid UTF-8.
        unsafe { std::str::from_utf8_unchecked(self.bytes_of(id)) }
    }

    /// Byte length of an interned string.
    pub fn len_of(&self, id: StrId) -> usize {
        let i = id.0 as usize;
        (self.pos[i + 1] - self.pos[i]) as usize
    }

    /// Number of distinct strings interned so far.
    pub fn count(&self) -> usize {
        self.pos.len() - 1
    }

    fn bytes_of(&self, id: StrId) -> &[u8] {
        let i = id.0 as usize;
        &self.buf[self.pos[i] as usize..self.pos[i + 1] as usize]
    }

    fn hash_bytes(bytes: &[u8]) -> u64 {
        let mut hasher = FxHasher::default();
        bytes.hash(&mut hasher);
        hasher.finish()
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}
