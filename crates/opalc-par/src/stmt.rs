//! Statement parsing.

use opalc_lex::TokenKind;

use crate::ir::{ChildStmt, CompoundStmt, ForStmt, IfStmt, Stmt, StmtId, WhileStmt};
use crate::{ParseError, Parser};

impl<'a> Parser<'a> {
    /// Parse one statement.
    pub(crate) fn parse_stmt(&mut self) -> Result<StmtId, ParseError> {
        match self.peek_kind()? {
            Some(TokenKind::LBrace) => self.parse_compound_stmt(),
            Some(TokenKind::Word(w)) if w == self.ir.kw.kw_if => self.parse_if_stmt(),
            Some(TokenKind::Word(w)) if w == self.ir.kw.kw_while => self.parse_while_stmt(),
            Some(TokenKind::Word(w)) if w == self.ir.kw.kw_for => self.parse_for_stmt(),
            Some(TokenKind::Word(w)) if w == self.ir.kw.kw_return => self.parse_return_stmt(),
            Some(TokenKind::Word(w)) if w == self.ir.kw.kw_data => {
                let data = self.parse_data_decl()?;
                Ok(self.ir.stmts.push(Stmt::Data(data)))
            }
            Some(TokenKind::Word(w)) if w == self.ir.kw.kw_array => {
                let array = self.parse_array_decl()?;
                Ok(self.ir.stmts.push(Stmt::Array(array)))
            }
            Some(_) => {
                let expr = self.parse_expr()?;
                self.expect(TokenKind::Semicolon)?;
                Ok(self.ir.stmts.push(Stmt::Expr(expr)))
            }
            None => {
                let (_, tok) = self.bump()?; // reports UnexpectedEof
                Err(self.unexpected("a statement", tok))
            }
        }
    }

    /// `{ stmt* }`
    ///
    /// Children are collected first and their link records written as
    /// one contiguous run afterwards, so nested compounds cannot
    /// interleave ranks.
    pub(crate) fn parse_compound_stmt(&mut self) -> Result<StmtId, ParseError> {
        self.expect(TokenKind::LBrace)?;
        let mut children = Vec::new();
        loop {
            match self.peek_kind()? {
                Some(TokenKind::RBrace) => break,
                Some(_) => children.push(self.parse_stmt()?),
                None => {
                    let (_, tok) = self.bump()?; // reports UnexpectedEof
                    return Err(self.unexpected("'}'", tok));
                }
            }
        }
        self.bump()?; // '}'

        let first_child = self.ir.child_stmts.next_id();
        let stmt = self.ir.stmts.push(Stmt::Compound(CompoundStmt {
            first_child,
            num_stmts: children.len() as u32,
        }));
        for (rank, child) in children.into_iter().enumerate() {
            self.ir.child_stmts.push(ChildStmt {
                parent: stmt,
                child,
                rank: rank as u32,
            });
        }
        Ok(stmt)
    }

    /// `if ( expr ) stmt`
    fn parse_if_stmt(&mut self) -> Result<StmtId, ParseError> {
        self.bump()?; // 'if'
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        let body = self.parse_stmt()?;
        Ok(self.ir.stmts.push(Stmt::If(IfStmt { cond, body })))
    }

    /// `while ( expr ) stmt`
    fn parse_while_stmt(&mut self) -> Result<StmtId, ParseError> {
        self.bump()?; // 'while'
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        let body = self.parse_stmt()?;
        Ok(self.ir.stmts.push(Stmt::While(WhileStmt { cond, body })))
    }

    /// `for ( init ; cond ; step ) stmt`
    ///
    /// Init and step are expression statements; the step carries no
    /// trailing semicolon of its own.
    fn parse_for_stmt(&mut self) -> Result<StmtId, ParseError> {
        self.bump()?; // 'for'
        self.expect(TokenKind::LParen)?;
        let init_expr = self.parse_expr()?;
        self.expect(TokenKind::Semicolon)?;
        let init = self.ir.stmts.push(Stmt::Expr(init_expr));
        let cond = self.parse_expr()?;
        self.expect(TokenKind::Semicolon)?;
        let step_expr = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        let step = self.ir.stmts.push(Stmt::Expr(step_expr));
        let body = self.parse_stmt()?;
        Ok(self.ir.stmts.push(Stmt::For(ForStmt {
            init,
            cond,
            step,
            body,
        })))
    }

    /// `return expr? ;`
    fn parse_return_stmt(&mut self) -> Result<StmtId, ParseError> {
        self.bump()?; // 'return'
        let expr = if self.peek_kind()? == Some(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semicolon)?;
        Ok(self.ir.stmts.push(Stmt::Return(expr)))
    }
}
