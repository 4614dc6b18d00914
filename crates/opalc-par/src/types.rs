//! Type syntax.
//!
//! A type form is one of:
//! - a name (symref to a named type, direct reference),
//! - `*` NAME (pointer, indirect reference to the pointee's name),
//! - `[` TYPE `]` TYPE (array of value type indexed by index type),
//! - `proc (` TYPE, ... `)` TYPE (procedure type).
//!
//! Entity types are nominal and therefore only ever appear as names at
//! use sites.

use opalc_lex::TokenKind;

use crate::ir::{RefType, Type, TypeId, TypeKind};
use crate::{ParseError, Parser};

impl<'a> Parser<'a> {
    /// Parse one type form.
    pub(crate) fn parse_type(&mut self) -> Result<TypeId, ParseError> {
        match self.peek_kind()? {
            Some(TokenKind::Word(w)) if w == self.ir.kw.kw_proc => self.parse_proc_type(),
            Some(TokenKind::Word(_)) => {
                let (tok, name, _) = self.expect_name("a type name")?;
                let symref = self.new_symref(name, tok);
                Ok(self.ir.types.push(Type {
                    kind: TypeKind::Ref(RefType {
                        symref,
                        indirect: false,
                        resolved: None,
                    }),
                    complete: false,
                }))
            }
            Some(TokenKind::Star) => {
                self.bump()?;
                let (tok, name, _) = self.expect_name("a type name after '*'")?;
                let symref = self.new_symref(name, tok);
                Ok(self.ir.types.push(Type {
                    kind: TypeKind::Ref(RefType {
                        symref,
                        indirect: true,
                        resolved: None,
                    }),
                    complete: false,
                }))
            }
            Some(TokenKind::LBracket) => {
                self.bump()?;
                let index = self.parse_type()?;
                self.expect(TokenKind::RBracket)?;
                let value = self.parse_type()?;
                Ok(self.ir.types.push(Type {
                    kind: TypeKind::Array(crate::ir::ArrayType { index, value }),
                    complete: false,
                }))
            }
            Some(_) => {
                let (_, tok) = self.bump()?;
                Err(self.unexpected("a type", tok))
            }
            None => {
                let (_, tok) = self.bump()?; // reports UnexpectedEof
                Err(self.unexpected("a type", tok))
            }
        }
    }

    /// `proc ( TYPE, ... ) TYPE` in type position.
    fn parse_proc_type(&mut self) -> Result<TypeId, ParseError> {
        self.bump()?; // 'proc'
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        if self.peek_kind()? != Some(TokenKind::RParen) {
            loop {
                args.push(self.parse_type()?);
                if !self.eat(TokenKind::Comma)? {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        let ret = self.parse_type()?;
        Ok(self.new_proctype(ret, args.into_iter()))
    }
}
