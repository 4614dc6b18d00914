//! Expression parsing: precedence climbing over the static binop table.
//!
//! The climber parses a prefix-unop chain leading to a primary, then
//! folds in binary operators whose precedence is at least the caller's
//! minimum. The right operand is always parsed with `prec + 1`, which
//! makes every operator left-associative - assignment included, a
//! deliberate property of this language (see the precedence tests).

use opalc_lex::TokenKind;

use crate::ir::{
    BinopExpr, CallArg, CallExpr, Expr, ExprId, ExprKind, MemberExpr, SubscriptExpr, UnopExpr,
};
use crate::tables;
use crate::{ParseError, Parser};

impl<'a> Parser<'a> {
    /// Parse a full expression.
    pub(crate) fn parse_expr(&mut self) -> Result<ExprId, ParseError> {
        self.parse_expr_prec(tables::PREC_MIN)
    }

    /// Parse an expression whose top-level binop has precedence at
    /// least `min_prec`.
    fn parse_expr_prec(&mut self, min_prec: u8) -> Result<ExprId, ParseError> {
        let mut lhs = self.parse_prefix_expr()?;

        loop {
            let Some(kind) = self.peek_kind()? else { break };
            let Some((op, prec)) = tables::binop_for(kind) else {
                break;
            };
            if prec < min_prec {
                break;
            }

            let (token, _) = self.bump()?;
            let rhs = self.parse_expr_prec(prec + 1)?;
            lhs = self.push_expr(ExprKind::Binop(BinopExpr { op, token, lhs, rhs }));
        }

        Ok(lhs)
    }

    /// Parse a chain of prefix operators leading into a postfix chain.
    fn parse_prefix_expr(&mut self) -> Result<ExprId, ParseError> {
        if let Some(kind) = self.peek_kind()? {
            if let Some(op) = tables::prefix_unop_for(kind) {
                let (token, _) = self.bump()?;
                let operand = self.parse_prefix_expr()?;
                return Ok(self.push_expr(ExprKind::Unop(UnopExpr { op, token, operand })));
            }
        }
        self.parse_postfix_expr()
    }

    /// Parse a primary and fold in calls, subscripts, member selections
    /// and postfix increments, left to right.
    fn parse_postfix_expr(&mut self) -> Result<ExprId, ParseError> {
        let mut expr = self.parse_primary_expr()?;

        loop {
            match self.peek_kind()? {
                Some(TokenKind::LParen) => {
                    expr = self.parse_call(expr)?;
                }
                Some(TokenKind::LBracket) => {
                    self.bump()?;
                    let index = self.parse_expr()?;
                    self.expect(TokenKind::RBracket)?;
                    expr = self.push_expr(ExprKind::Subscript(SubscriptExpr { base: expr, index }));
                }
                Some(TokenKind::Dot) => {
                    self.bump()?;
                    let (_, name, _) = self.expect_name("a member name")?;
                    expr = self.push_expr(ExprKind::Member(MemberExpr { base: expr, name }));
                }
                Some(kind) => match tables::postfix_unop_for(kind) {
                    Some(op) => {
                        let (token, _) = self.bump()?;
                        expr = self.push_expr(ExprKind::Unop(UnopExpr {
                            op,
                            token,
                            operand: expr,
                        }));
                    }
                    None => break,
                },
                None => break,
            }
        }

        Ok(expr)
    }

    /// `( args... )` after a callee. Arg link records are laid out as
    /// one contiguous, rank-ordered run after all args are parsed.
    fn parse_call(&mut self, callee: ExprId) -> Result<ExprId, ParseError> {
        self.bump()?; // '('
        let mut args = Vec::new();
        if self.peek_kind()? != Some(TokenKind::RParen) {
            loop {
                args.push(self.parse_expr()?);
                if !self.eat(TokenKind::Comma)? {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;

        let first_arg = self.ir.call_args.next_id();
        let call = self.push_expr(ExprKind::Call(CallExpr {
            callee,
            first_arg,
            num_args: args.len() as u32,
        }));
        for (rank, arg) in args.into_iter().enumerate() {
            self.ir.call_args.push(CallArg {
                call,
                arg,
                rank: rank as u32,
            });
        }
        Ok(call)
    }

    /// Integer/string literal, name, or parenthesized expression.
    fn parse_primary_expr(&mut self) -> Result<ExprId, ParseError> {
        let (token, tok) = self.bump()?;
        match tok.kind {
            TokenKind::Int(_) | TokenKind::Str(_) => Ok(self.push_expr(ExprKind::Literal(token))),
            TokenKind::Word(name) if !self.ir.kw.is_keyword(name) => {
                let symref = self.new_symref(name, token);
                Ok(self.push_expr(ExprKind::Symref(symref)))
            }
            TokenKind::LParen => {
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            _ => Err(self.unexpected("an expression", tok)),
        }
    }

    #[inline]
    fn push_expr(&mut self, kind: ExprKind) -> ExprId {
        self.ir.exprs.push(Expr { kind, ty: None })
    }
}
