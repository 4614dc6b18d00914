//! The lexer: source text to tokens, one lookahead token deep.

use opalc_util::{FileId, Interner, Span};
use thiserror::Error;

use crate::cursor::Cursor;
use crate::token::{Token, TokenKind};

/// Fatal lexical error.
#[derive(Debug, Error)]
pub enum LexError {
    /// A byte outside the lexical surface.
    #[error("unexpected character '{ch}'")]
    UnexpectedChar { ch: char, span: Span },

    /// A decimal literal that does not fit a signed 64-bit value.
    #[error("integer literal does not fit in 64 bits")]
    IntOverflow { span: Span },

    /// A block comment still open at end of file.
    #[error("unterminated block comment")]
    UnterminatedComment { span: Span },

    /// A string literal still open at end of file or line.
    #[error("unterminated string literal")]
    UnterminatedString { span: Span },

    /// An escape sequence other than `\"` or `\\`.
    #[error("invalid escape '\\{ch}' in string literal")]
    InvalidEscape { ch: char, span: Span },
}

impl LexError {
    /// Location of the error.
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedChar { span, .. }
            | LexError::IntOverflow { span }
            | LexError::UnterminatedComment { span }
            | LexError::UnterminatedString { span }
            | LexError::InvalidEscape { span, .. } => *span,
        }
    }
}

/// Lexer for Opal source.
///
/// Exposes a one-token lookahead: [`peek`](Lexer::peek) scans and saves
/// the next token without consuming it, [`bump`](Lexer::bump) hands it
/// out. `None` means end of file. Both take the interner by reference
/// because word and string payloads are interned as they are produced.
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    file: FileId,
    lookahead: Option<Token>,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer over the content of one file.
    pub fn new(file: FileId, source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
            file,
            lookahead: None,
        }
    }

    /// Returns the next token without consuming it, or `None` at EOF.
    pub fn peek(&mut self, interner: &mut Interner) -> Result<Option<&Token>, LexError> {
        if self.lookahead.is_none() {
            self.lookahead = self.scan_token(interner)?;
        }
        Ok(self.lookahead.as_ref())
    }

    /// Consumes and returns the next token, or `None` at EOF.
    pub fn bump(&mut self, interner: &mut Interner) -> Result<Option<Token>, LexError> {
        if self.lookahead.is_none() {
            self.lookahead = self.scan_token(interner)?;
        }
        Ok(self.lookahead.take())
    }

    /// Scans one token from the current position.
    fn scan_token(&mut self, interner: &mut Interner) -> Result<Option<Token>, LexError> {
        self.skip_trivia()?;

        if self.cursor.is_at_end() {
            return Ok(None);
        }

        let start = self.cursor.position();
        let c = self.cursor.current_char();

        let kind = match c {
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            '{' => self.single(TokenKind::LBrace),
            '}' => self.single(TokenKind::RBrace),
            '[' => self.single(TokenKind::LBracket),
            ']' => self.single(TokenKind::RBracket),
            '.' => self.single(TokenKind::Dot),
            ',' => self.single(TokenKind::Comma),
            ';' => self.single(TokenKind::Semicolon),
            ':' => self.single(TokenKind::Colon),
            '*' => self.single(TokenKind::Star),
            '/' => self.single(TokenKind::Slash),
            '&' => self.single(TokenKind::Amp),
            '|' => self.single(TokenKind::Pipe),
            '^' => self.single(TokenKind::Caret),
            '~' => self.single(TokenKind::Tilde),
            '!' => self.single(TokenKind::Bang),
            // Double-character punctuators win over their prefixes.
            '+' => self.single_or_double('+', TokenKind::Plus, TokenKind::PlusPlus),
            '-' => self.single_or_double('-', TokenKind::Minus, TokenKind::MinusMinus),
            '=' => self.single_or_double('=', TokenKind::Assign, TokenKind::EqEq),
            '"' => self.scan_string(interner, start)?,
            c if is_word_start(c) => self.scan_word(interner, start),
            c if c.is_ascii_digit() => self.scan_int(start)?,
            c => {
                return Err(LexError::UnexpectedChar {
                    ch: c,
                    span: Span::new(self.file, start, start + c.len_utf8()),
                });
            }
        };

        let span = Span::new(self.file, start, self.cursor.position());
        Ok(Some(Token::new(kind, span)))
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.cursor.advance();
        kind
    }

    fn single_or_double(&mut self, second: char, one: TokenKind, two: TokenKind) -> TokenKind {
        self.cursor.advance();
        if self.cursor.current_char() == second {
            self.cursor.advance();
            two
        } else {
            one
        }
    }

    fn scan_word(&mut self, interner: &mut Interner, start: usize) -> TokenKind {
        while is_word_continue(self.cursor.current_char()) {
            self.cursor.advance();
        }
        TokenKind::Word(interner.intern(self.cursor.slice_from(start)))
    }

    fn scan_int(&mut self, start: usize) -> Result<TokenKind, LexError> {
        let mut value: i64 = 0;
        while self.cursor.current_char().is_ascii_digit() {
            let digit = self.cursor.current_char() as i64 - '0' as i64;
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(digit))
                .ok_or_else(|| {
                    // Consume the rest of the digit run so the span covers
                    // the whole offending literal.
                    let mut pos = self.cursor.position();
                    while self.cursor.current_char().is_ascii_digit() {
                        self.cursor.advance();
                        pos = self.cursor.position();
                    }
                    LexError::IntOverflow {
                        span: Span::new(self.file, start, pos),
                    }
                })?;
            self.cursor.advance();
        }
        Ok(TokenKind::Int(value))
    }

    fn scan_string(
        &mut self,
        interner: &mut Interner,
        start: usize,
    ) -> Result<TokenKind, LexError> {
        self.cursor.advance(); // opening quote
        let mut content = String::new();

        loop {
            if self.cursor.is_at_end() {
                return Err(LexError::UnterminatedString {
                    span: Span::new(self.file, start, self.cursor.position()),
                });
            }
            match self.cursor.current_char() {
                '"' => {
                    self.cursor.advance();
                    break;
                }
                '\\' => {
                    self.cursor.advance();
                    let esc = self.cursor.current_char();
                    match esc {
                        '"' | '\\' => {
                            content.push(esc);
                            self.cursor.advance();
                        }
                        _ => {
                            let at = self.cursor.position();
                            return Err(LexError::InvalidEscape {
                                ch: esc,
                                span: Span::new(self.file, at - 1, at + esc.len_utf8()),
                            });
                        }
                    }
                }
                '\n' => {
                    return Err(LexError::UnterminatedString {
                        span: Span::new(self.file, start, self.cursor.position()),
                    });
                }
                c => {
                    content.push(c);
                    self.cursor.advance();
                }
            }
        }

        Ok(TokenKind::Str(interner.intern(&content)))
    }

    /// Skips whitespace and nested block comments.
    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match self.cursor.current_char() {
                ' ' | '\t' | '\r' | '\n' => self.cursor.advance(),
                '/' if self.cursor.peek_char(1) == '*' => self.skip_block_comment()?,
                _ => return Ok(()),
            }
        }
    }

    /// Skips one block comment, honoring nesting.
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start = self.cursor.position();
        self.cursor.advance();
        self.cursor.advance();
        let mut depth = 1u32;

        while depth > 0 {
            if self.cursor.is_at_end() {
                return Err(LexError::UnterminatedComment {
                    span: Span::new(self.file, start, self.cursor.position()),
                });
            }
            if self.cursor.current_char() == '/' && self.cursor.peek_char(1) == '*' {
                self.cursor.advance();
                self.cursor.advance();
                depth += 1;
            } else if self.cursor.current_char() == '*' && self.cursor.peek_char(1) == '/' {
                self.cursor.advance();
                self.cursor.advance();
                depth -= 1;
            } else {
                self.cursor.advance();
            }
        }

        Ok(())
    }
}

fn is_word_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_word_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
