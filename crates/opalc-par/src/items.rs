//! Top-level and in-proc declarations.

use opalc_lex::TokenKind;

use crate::ir::{
    ArrayDecl, ArrayType, DataDecl, DataId, EntityType, Param, Proc, ProcType, ScopeKind, StmtId,
    SymbolKind, Type, TypeKind, PENDING_SYM,
};
use crate::ir::{ArrayId, ScopeId};
use crate::{ParseError, Parser};

impl<'a> Parser<'a> {
    /// Dispatch one top-level declaration on the current keyword.
    pub(crate) fn parse_declaration(&mut self) -> Result<(), ParseError> {
        if self.at_keyword(self.ir.kw.kw_data)? {
            self.parse_data_decl()?;
        } else if self.at_keyword(self.ir.kw.kw_array)? {
            self.parse_array_decl()?;
        } else if self.at_keyword(self.ir.kw.kw_entity)? {
            self.parse_entity_decl()?;
        } else if self.at_keyword(self.ir.kw.kw_proc)? {
            self.parse_proc_decl()?;
        } else {
            let (_, tok) = self.bump()?;
            return Err(self.unexpected("a declaration", tok));
        }
        Ok(())
    }

    /// `data NAME TYPE ;`
    ///
    /// Also used as a statement inside proc bodies; the returned id is
    /// what the statement wraps.
    pub(crate) fn parse_data_decl(&mut self) -> Result<DataId, ParseError> {
        self.bump()?; // 'data'
        let (_, name, span) = self.expect_name("a data name")?;
        let tp = self.parse_type()?;
        self.expect(TokenKind::Semicolon)?;

        let scope = self.current_scope();
        let data = self.ir.datas.push(DataDecl {
            scope,
            tp,
            sym: PENDING_SYM,
        });
        self.declare(name, SymbolKind::Data(data), span)?;
        Ok(data)
    }

    /// `array NAME [ IDXTYPE ] VALTYPE ;`
    pub(crate) fn parse_array_decl(&mut self) -> Result<ArrayId, ParseError> {
        self.bump()?; // 'array'
        let (_, name, span) = self.expect_name("an array name")?;
        self.expect(TokenKind::LBracket)?;
        let index = self.parse_type()?;
        self.expect(TokenKind::RBracket)?;
        let value = self.parse_type()?;
        self.expect(TokenKind::Semicolon)?;

        let tp = self.ir.types.push(Type {
            kind: TypeKind::Array(ArrayType { index, value }),
            complete: false,
        });
        let scope = self.current_scope();
        let array = self.ir.arrays.push(ArrayDecl {
            scope,
            tp,
            sym: PENDING_SYM,
        });
        self.declare(name, SymbolKind::Array(array), span)?;
        Ok(array)
    }

    /// `entity NAME { TYPE ; }`
    fn parse_entity_decl(&mut self) -> Result<(), ParseError> {
        self.bump()?; // 'entity'
        let (_, name, span) = self.expect_name("an entity name")?;
        self.expect(TokenKind::LBrace)?;
        let inner = self.parse_type()?;
        self.expect(TokenKind::Semicolon)?;
        self.expect(TokenKind::RBrace)?;

        let tp = self.ir.types.push(Type {
            kind: TypeKind::Entity(EntityType { name, inner }),
            complete: false,
        });
        self.declare(name, SymbolKind::Type(tp), span)
    }

    /// `proc NAME ( TYPE NAME, ... ) RETTYPE { body }`
    fn parse_proc_decl(&mut self) -> Result<(), ParseError> {
        self.bump()?; // 'proc'
        let (_, name, span) = self.expect_name("a proc name")?;

        // Header. Param types and names are collected first so the
        // paramtype records can be laid out contiguously afterwards.
        self.expect(TokenKind::LParen)?;
        let mut header = Vec::new();
        if self.peek_kind()? != Some(TokenKind::RParen) {
            loop {
                let tp = self.parse_type()?;
                let (_, pname, pspan) = self.expect_name("a parameter name")?;
                header.push((tp, pname, pspan));
                if !self.eat(TokenKind::Comma)? {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        let ret = self.parse_type()?;

        let proc_tp = self.new_proctype(ret, header.iter().map(|&(tp, _, _)| tp));

        // The proc record is created before its scope so the scope can
        // carry the owning proc id; scope and body are patched below.
        let first_param = self.ir.params.next_id();
        let proc = self.ir.procs.push(Proc {
            tp: proc_tp,
            sym: PENDING_SYM,
            scope: ScopeId(u32::MAX),
            num_params: header.len() as u32,
            first_param,
            body: StmtId(u32::MAX),
        });
        self.declare(name, SymbolKind::Proc(proc), span)?;

        let scope = self.open_scope(ScopeKind::Proc(proc));
        self.ir.procs[proc].scope = scope;

        for (rank, &(tp, pname, pspan)) in header.iter().enumerate() {
            let param = self.ir.params.push(Param {
                proc,
                sym: PENDING_SYM,
                tp,
                rank: rank as u32,
            });
            self.declare(pname, SymbolKind::Param(param), pspan)?;
        }

        let body = self.parse_compound_stmt()?;
        self.ir.procs[proc].body = body;
        self.close_scope();
        Ok(())
    }

    /// Lay out a proc type and its contiguous, rank-ordered paramtypes.
    pub(crate) fn new_proctype(
        &mut self,
        ret: crate::ir::TypeId,
        params: impl ExactSizeIterator<Item = crate::ir::TypeId>,
    ) -> crate::ir::TypeId {
        let first_paramtype = self.ir.paramtypes.next_id();
        let proc_tp = self.ir.types.push(Type {
            kind: TypeKind::Proc(ProcType {
                ret,
                num_params: params.len() as u32,
                first_paramtype,
            }),
            complete: false,
        });
        for (rank, arg) in params.enumerate() {
            self.ir.paramtypes.push(crate::ir::Paramtype {
                proc_type: proc_tp,
                arg,
                rank: rank as u32,
            });
        }
        proc_tp
    }
}
