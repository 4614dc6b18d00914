//! opalc-lex - Lexical Analyzer
//!
//! Transforms Opal source text into a token stream with one token of
//! lookahead. The lexer is pull-based: the parser calls [`Lexer::peek`]
//! to inspect the next token and [`Lexer::bump`] to consume it; end of
//! file is the `None` token rather than a sentinel kind.
//!
//! Identifier and string-literal payloads are interned through the
//! [`Interner`](opalc_util::Interner) owned by the IR, which the parser
//! passes in on every call - the lexer itself holds no compiler state
//! beyond its cursor and the saved lookahead token.
//!
//! Whitespace and nested block comments are skipped between tokens.
//! Any unrecognized byte, a 64-bit integer overflow, or an unterminated
//! comment or string literal is a fatal [`LexError`] carrying the
//! offending location.

pub mod cursor;
pub mod lexer;
pub mod token;

pub use cursor::Cursor;
pub use lexer::{Lexer, LexError};
pub use token::{Token, TokenKind};
