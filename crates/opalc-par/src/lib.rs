//! opalc-par - Parser and Intermediate Representation
//!
//! Recursive descent over the token stream for declarations and
//! statements, precedence climbing for expressions. The parser does not
//! build a pointer tree: every node it produces is appended to one of
//! the typed arenas in [`Ir`] and wired up through ids.
//!
//! Declarations also populate the symbol table. A scope's symbols are
//! buffered while the scope is open and flushed into the symbol arena as
//! one contiguous block when it closes, so each scope owns an exact
//! `[first_symbol, first_symbol + num_symbols)` range - the invariant
//! the resolver's linear range scan depends on. Symbol references are
//! recorded unresolved; binding them is the resolver's job, which is how
//! forward references fall out for free.
//!
//! The parser is fail-fast: the first unexpected token, duplicate name,
//! or lexical error aborts with a [`ParseError`].

pub mod ir;
pub mod pretty;
pub mod tables;

mod expr;
mod items;
mod stmt;
mod types;

use indexmap::IndexSet;
use opalc_lex::{LexError, Lexer, Token, TokenKind};
use opalc_util::{FileId, Span, StrId};
use thiserror::Error;

use crate::ir::{Ir, PendingSymbol, Scope, ScopeId, ScopeKind, SymbolId, SymbolKind};

/// Fatal syntax error.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The lexer hit a fatal error.
    #[error(transparent)]
    Lex(#[from] LexError),

    /// Input ended in the middle of a construct.
    #[error("unexpected end of file")]
    UnexpectedEof { span: Span },

    /// The current token cannot start or continue the construct.
    #[error("expected {expected}, found {found}")]
    Unexpected {
        expected: &'static str,
        found: &'static str,
        span: Span,
    },

    /// A second declaration of a name within one scope.
    #[error("duplicate symbol '{name}' in the same scope")]
    DuplicateSymbol { name: String, span: Span },

    /// A reserved word used as a name.
    #[error("'{name}' is a reserved word")]
    ReservedWord { name: String, span: Span },
}

impl ParseError {
    /// Location of the error.
    pub fn span(&self) -> Span {
        match self {
            ParseError::Lex(e) => e.span(),
            ParseError::UnexpectedEof { span }
            | ParseError::Unexpected { span, .. }
            | ParseError::DuplicateSymbol { span, .. }
            | ParseError::ReservedWord { span, .. } => *span,
        }
    }
}

/// Parse one source file into a fresh IR.
///
/// This is the normal entry point: it interns the keywords, registers
/// the base types in the global scope, parses every top-level
/// declaration, and flushes the global symbol table.
pub fn parse(file: FileId, src: &str) -> Result<Ir, ParseError> {
    let mut parser = Parser::new(file, src)?;
    parser.run()?;
    Ok(parser.into_ir())
}

/// A scope that is still accepting declarations.
///
/// Symbols are buffered here and written to the symbol arena only when
/// the scope closes; that keeps each scope's ids contiguous even though
/// global declarations surround proc bodies textually.
struct OpenScope {
    id: ScopeId,
    pending: Vec<PendingSymbol>,
    /// Names declared so far, for immediate duplicate rejection.
    names: IndexSet<StrId>,
}

/// The recursive-descent parser.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    pub(crate) ir: Ir,
    /// The global scope, open for the whole parse.
    global: OpenScope,
    /// Scopes opened inside it (proc scopes). Keeping the global scope
    /// out of this stack means the current scope exists by
    /// construction; the nesting itself is unbounded even though the
    /// language only puts proc scopes under the global one today.
    nested: Vec<OpenScope>,
    file: FileId,
    /// Byte length of the source, for end-of-file spans.
    end: usize,
}

impl<'a> Parser<'a> {
    /// Create a parser over one file's content, with the base types
    /// registered in the global scope.
    pub fn new(file: FileId, src: &'a str) -> Result<Self, ParseError> {
        let ir = Ir::new();
        let global = OpenScope {
            id: ir.global_scope,
            pending: Vec::new(),
            names: IndexSet::new(),
        };
        let mut parser = Self {
            lexer: Lexer::new(file, src),
            ir,
            global,
            nested: Vec::new(),
            file,
            end: src.len(),
        };
        parser.register_base_types()?;
        Ok(parser)
    }

    /// Parse the whole file: declarations until EOF, then flush the
    /// global scope.
    pub fn run(&mut self) -> Result<(), ParseError> {
        while self.peek_token()?.is_some() {
            self.parse_declaration()?;
        }
        let pending = std::mem::take(&mut self.global.pending);
        let id = self.global.id;
        self.flush_scope(id, pending);
        Ok(())
    }

    /// Give up ownership of the built IR.
    pub fn into_ir(self) -> Ir {
        self.ir
    }

    /// Register every built-in base type as a type plus a global symbol.
    fn register_base_types(&mut self) -> Result<(), ParseError> {
        for &(name, size) in tables::BASE_TYPES {
            let name = self.ir.interner.intern(name);
            let tp = self.ir.types.push(ir::Type {
                kind: ir::TypeKind::Base(ir::BaseType { name, size }),
                // A base type has no inner references to wait for.
                complete: true,
            });
            let span = Span::point(self.file, 0);
            self.declare(name, SymbolKind::Type(tp), span)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Token plumbing
    // ------------------------------------------------------------------

    /// Next token kind without consuming, `None` at EOF.
    pub(crate) fn peek_kind(&mut self) -> Result<Option<TokenKind>, ParseError> {
        Ok(self.lexer.peek(&mut self.ir.interner)?.map(|t| t.kind))
    }

    /// Next token without consuming, `None` at EOF.
    pub(crate) fn peek_token(&mut self) -> Result<Option<Token>, ParseError> {
        Ok(self.lexer.peek(&mut self.ir.interner)?.copied())
    }

    /// Consume the next token, appending it to the token arena.
    /// EOF is an error here; callers that can stop use `peek` first.
    pub(crate) fn bump(&mut self) -> Result<(ir::TokenId, Token), ParseError> {
        match self.lexer.bump(&mut self.ir.interner)? {
            Some(tok) => {
                let id = self.ir.tokens.push(tok);
                Ok((id, tok))
            }
            None => Err(ParseError::UnexpectedEof {
                span: Span::point(self.file, self.end),
            }),
        }
    }

    /// Consume a token that must have exactly this kind.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> Result<(ir::TokenId, Token), ParseError> {
        let (id, tok) = self.bump()?;
        if tok.kind == kind {
            Ok((id, tok))
        } else {
            Err(self.unexpected(kind.describe(), tok))
        }
    }

    /// Consume the next token if it has this kind.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> Result<bool, ParseError> {
        if self.peek_kind()? == Some(kind) {
            self.bump()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Consume a word that is not a reserved keyword.
    pub(crate) fn expect_name(
        &mut self,
        what: &'static str,
    ) -> Result<(ir::TokenId, StrId, Span), ParseError> {
        let (id, tok) = self.bump()?;
        match tok.kind {
            TokenKind::Word(name) if !self.ir.kw.is_keyword(name) => Ok((id, name, tok.span)),
            TokenKind::Word(name) => Err(ParseError::ReservedWord {
                name: self.ir.str(name).to_string(),
                span: tok.span,
            }),
            _ => Err(self.unexpected(what, tok)),
        }
    }

    /// True if the next token is this exact keyword.
    pub(crate) fn at_keyword(&mut self, kw: StrId) -> Result<bool, ParseError> {
        Ok(matches!(self.peek_kind()?, Some(TokenKind::Word(w)) if w == kw))
    }

    pub(crate) fn unexpected(&self, expected: &'static str, found: Token) -> ParseError {
        ParseError::Unexpected {
            expected,
            found: found.kind.describe(),
            span: found.span,
        }
    }

    // ------------------------------------------------------------------
    // Scope discipline
    // ------------------------------------------------------------------

    /// Id of the innermost open scope.
    pub(crate) fn current_scope(&self) -> ScopeId {
        match self.nested.last() {
            Some(open) => open.id,
            None => self.global.id,
        }
    }

    /// Open a child scope of the current one.
    pub(crate) fn open_scope(&mut self, kind: ScopeKind) -> ScopeId {
        let parent = Some(self.current_scope());
        let id = self.ir.scopes.push(Scope {
            parent,
            kind,
            first_symbol: SymbolId(0),
            num_symbols: 0,
        });
        self.nested.push(OpenScope {
            id,
            pending: Vec::new(),
            names: IndexSet::new(),
        });
        id
    }

    /// Declare a name in the current scope. Rejects duplicates
    /// immediately; the symbol itself is written out at scope close.
    pub(crate) fn declare(
        &mut self,
        name: StrId,
        kind: SymbolKind,
        span: Span,
    ) -> Result<(), ParseError> {
        let top = match self.nested.last_mut() {
            Some(open) => open,
            None => &mut self.global,
        };
        if !top.names.insert(name) {
            return Err(ParseError::DuplicateSymbol {
                name: self.ir.str(name).to_string(),
                span,
            });
        }
        top.pending.push(PendingSymbol { name, kind });
        Ok(())
    }

    /// Close the innermost nested scope. The global scope is not on the
    /// nested stack; it flushes once at the end of the parse.
    pub(crate) fn close_scope(&mut self) {
        if let Some(open) = self.nested.pop() {
            let id = open.id;
            self.flush_scope(id, open.pending);
        }
    }

    /// Flush a scope's buffered symbols into the arena as one
    /// contiguous block and patch the back-links on the declared
    /// artifacts.
    fn flush_scope(&mut self, id: ScopeId, pending: Vec<PendingSymbol>) {
        let first = self.ir.symbols.next_id();

        for p in &pending {
            let sid = self.ir.symbols.push(ir::Symbol {
                name: p.name,
                scope: id,
                kind: p.kind,
            });
            match p.kind {
                SymbolKind::Data(d) => self.ir.datas[d].sym = sid,
                SymbolKind::Array(a) => self.ir.arrays[a].sym = sid,
                SymbolKind::Proc(pr) => self.ir.procs[pr].sym = sid,
                SymbolKind::Param(pa) => self.ir.params[pa].sym = sid,
                SymbolKind::Type(_) => {}
            }
        }

        let scope = &mut self.ir.scopes[id];
        scope.first_symbol = first;
        scope.num_symbols = pending.len() as u32;
    }

    /// Record an unresolved symbol reference at the current scope.
    pub(crate) fn new_symref(&mut self, name: StrId, token: ir::TokenId) -> ir::SymrefId {
        let scope = self.current_scope();
        self.ir.symrefs.push(ir::Symref {
            name,
            scope,
            token,
            sym: None,
        })
    }
}

#[cfg(test)]
mod edge_cases;
