//! Pretty-printer: canonical source text from the IR.
//!
//! Walks the arenas and emits a reformatted program. Global
//! declarations come out in declaration order (the global scope's
//! symbol range preserves it), bodies are indented four spaces, and
//! expressions are parenthesized exactly where precedence demands it.
//! Printing is a pure function of the IR, so print -> parse -> print is
//! a fixed point - the property the round-trip tests lean on.

use opalc_lex::TokenKind;

use crate::ir::{
    ArrayId, CompoundStmt, DataId, ExprId, ExprKind, Ir, Proc, Stmt, StmtId, SymbolId, SymbolKind,
    TypeId, TypeKind,
};
use crate::tables::{self, PREC_MIN, PREC_POSTFIX};

/// Render one type, for diagnostics.
pub fn type_to_string(ir: &Ir, tp: TypeId) -> String {
    let mut printer = Printer {
        ir,
        out: String::new(),
    };
    printer.print_type(tp);
    printer.out
}

/// Render the whole program.
pub fn pretty(ir: &Ir) -> String {
    let mut printer = Printer {
        ir,
        out: String::new(),
    };
    printer.print_program();
    printer.out
}

struct Printer<'a> {
    ir: &'a Ir,
    out: String,
}

const INDENT: &str = "    ";

impl<'a> Printer<'a> {
    fn print_program(&mut self) {
        let globals: Vec<SymbolId> = self.ir.scope_symbols(self.ir.global_scope).collect();
        for sid in globals {
            let sym = self.ir.symbols[sid];
            match sym.kind {
                SymbolKind::Type(tp) => {
                    // Base types are built in, not part of the program.
                    if let TypeKind::Entity(entity) = self.ir.types[tp].kind {
                        self.out.push_str("entity ");
                        self.out.push_str(self.ir.str(entity.name));
                        self.out.push_str(" { ");
                        self.print_type(entity.inner);
                        self.out.push_str("; }\n");
                    }
                }
                SymbolKind::Data(data) => self.print_data_decl(data, 0),
                SymbolKind::Array(array) => self.print_array_decl(array, 0),
                SymbolKind::Proc(proc) => self.print_proc(&self.ir.procs[proc]),
                SymbolKind::Param(_) => {}
            }
        }
    }

    fn print_proc(&mut self, proc: &Proc) {
        self.out.push_str("proc ");
        self.out.push_str(self.ir.str(self.ir.symbols[proc.sym].name));
        self.out.push('(');
        for (i, pid) in self.ir.proc_params(proc).enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            let param = self.ir.params[pid];
            self.print_type(param.tp);
            self.out.push(' ');
            self.out.push_str(self.ir.str(self.ir.symbols[param.sym].name));
        }
        self.out.push_str(") ");
        let ret = match self.ir.types[proc.tp].kind {
            TypeKind::Proc(pt) => pt.ret,
            // A proc record always carries a proc type.
            _ => return,
        };
        self.print_type(ret);
        self.out.push(' ');
        self.print_block_at(proc.body, 0);
        self.out.push('\n');
    }

    fn print_data_decl(&mut self, data: DataId, indent: usize) {
        let decl = self.ir.datas[data];
        self.push_indent(indent);
        self.out.push_str("data ");
        self.out.push_str(self.ir.str(self.ir.symbols[decl.sym].name));
        self.out.push(' ');
        self.print_type(decl.tp);
        self.out.push_str(";\n");
    }

    fn print_array_decl(&mut self, array: ArrayId, indent: usize) {
        let decl = self.ir.arrays[array];
        self.push_indent(indent);
        self.out.push_str("array ");
        self.out.push_str(self.ir.str(self.ir.symbols[decl.sym].name));
        if let TypeKind::Array(at) = self.ir.types[decl.tp].kind {
            self.out.push_str(" [");
            self.print_type(at.index);
            self.out.push_str("] ");
            self.print_type(at.value);
        }
        self.out.push_str(";\n");
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    /// Print a statement starting on a fresh line, trailing newline
    /// included.
    fn print_stmt(&mut self, stmt: StmtId, indent: usize) {
        match self.ir.stmts[stmt] {
            Stmt::Compound(c) => {
                self.push_indent(indent);
                self.print_compound(&c, indent);
                self.out.push('\n');
            }
            Stmt::If(s) => {
                self.push_indent(indent);
                self.out.push_str("if (");
                self.print_expr(s.cond, PREC_MIN);
                self.out.push_str(") ");
                self.print_body(s.body, indent);
            }
            Stmt::While(s) => {
                self.push_indent(indent);
                self.out.push_str("while (");
                self.print_expr(s.cond, PREC_MIN);
                self.out.push_str(") ");
                self.print_body(s.body, indent);
            }
            Stmt::For(s) => {
                self.push_indent(indent);
                self.out.push_str("for (");
                if let Stmt::Expr(e) = self.ir.stmts[s.init] {
                    self.print_expr(e, PREC_MIN);
                }
                self.out.push_str("; ");
                self.print_expr(s.cond, PREC_MIN);
                self.out.push_str("; ");
                if let Stmt::Expr(e) = self.ir.stmts[s.step] {
                    self.print_expr(e, PREC_MIN);
                }
                self.out.push_str(") ");
                self.print_body(s.body, indent);
            }
            Stmt::Return(expr) => {
                self.push_indent(indent);
                self.out.push_str("return");
                if let Some(e) = expr {
                    self.out.push(' ');
                    self.print_expr(e, PREC_MIN);
                }
                self.out.push_str(";\n");
            }
            Stmt::Expr(e) => {
                self.push_indent(indent);
                self.print_expr(e, PREC_MIN);
                self.out.push_str(";\n");
            }
            Stmt::Data(d) => self.print_data_decl(d, indent),
            Stmt::Array(a) => self.print_array_decl(a, indent),
        }
    }

    /// Print the body of an if/while/for: a compound inline, anything
    /// else on its own indented line.
    fn print_body(&mut self, body: StmtId, indent: usize) {
        if matches!(self.ir.stmts[body], Stmt::Compound(_)) {
            self.print_block_at(body, indent);
            self.out.push('\n');
        } else {
            self.out.push('\n');
            self.print_stmt(body, indent + 1);
        }
    }

    /// Print a compound statement block in place (no leading indent, no
    /// trailing newline).
    fn print_block_at(&mut self, stmt: StmtId, indent: usize) {
        if let Stmt::Compound(c) = self.ir.stmts[stmt] {
            self.print_compound(&c, indent);
        }
    }

    fn print_compound(&mut self, c: &CompoundStmt, indent: usize) {
        self.out.push_str("{\n");
        for link in self.ir.compound_children(c) {
            let child = self.ir.child_stmts[link].child;
            self.print_stmt(child, indent + 1);
        }
        self.push_indent(indent);
        self.out.push('}');
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    /// Intrinsic precedence of an expression node: binops rank by the
    /// operator table, prefix operators sit above every binop, the
    /// postfix tier above that, atoms highest.
    fn expr_prec(&self, expr: ExprId) -> u8 {
        match self.ir.exprs[expr].kind {
            ExprKind::Binop(b) => tables::binop_prec(b.op),
            ExprKind::Unop(u) if u.op.is_prefix() => tables::PREC_UNARY,
            ExprKind::Unop(_)
            | ExprKind::Member(_)
            | ExprKind::Subscript(_)
            | ExprKind::Call(_) => PREC_POSTFIX,
            ExprKind::Literal(_) | ExprKind::Symref(_) => PREC_POSTFIX + 1,
        }
    }

    /// Print an expression, parenthesizing it if its own precedence is
    /// below `min_prec`.
    fn print_expr(&mut self, expr: ExprId, min_prec: u8) {
        let parens = self.expr_prec(expr) < min_prec;
        if parens {
            self.out.push('(');
        }

        match self.ir.exprs[expr].kind {
            ExprKind::Literal(tok) => match self.ir.tokens[tok].kind {
                TokenKind::Int(value) => {
                    self.out.push_str(&value.to_string());
                }
                TokenKind::Str(s) => {
                    let escaped = self
                        .ir
                        .str(s)
                        .replace('\\', "\\\\")
                        .replace('"', "\\\"");
                    self.out.push('"');
                    self.out.push_str(&escaped);
                    self.out.push('"');
                }
                _ => {}
            },
            ExprKind::Symref(sr) => {
                self.out.push_str(self.ir.str(self.ir.symrefs[sr].name));
            }
            // The operand of a prefix operator is held to the postfix
            // tier so that nested prefix operators come out
            // parenthesized; "-(-x)" cannot be relexed as a decrement
            // the way "--x" can.
            ExprKind::Unop(u) if u.op.is_prefix() => {
                self.out.push_str(u.op.text());
                self.print_expr(u.operand, PREC_POSTFIX);
            }
            ExprKind::Unop(u) => {
                self.print_expr(u.operand, PREC_POSTFIX);
                self.out.push_str(u.op.text());
            }
            ExprKind::Binop(b) => {
                let prec = tables::binop_prec(b.op);
                self.print_expr(b.lhs, prec);
                self.out.push(' ');
                self.out.push_str(b.op.text());
                self.out.push(' ');
                self.print_expr(b.rhs, prec + 1);
            }
            ExprKind::Member(m) => {
                self.print_expr(m.base, PREC_POSTFIX);
                self.out.push('.');
                self.out.push_str(self.ir.str(m.name));
            }
            ExprKind::Subscript(s) => {
                self.print_expr(s.base, PREC_POSTFIX);
                self.out.push('[');
                self.print_expr(s.index, PREC_MIN);
                self.out.push(']');
            }
            ExprKind::Call(c) => {
                self.print_expr(c.callee, PREC_POSTFIX);
                self.out.push('(');
                for (i, link) in self.ir.call_args_of(&c).enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    let arg = self.ir.call_args[link].arg;
                    self.print_expr(arg, PREC_MIN);
                }
                self.out.push(')');
            }
        }

        if parens {
            self.out.push(')');
        }
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    fn print_type(&mut self, tp: TypeId) {
        match self.ir.types[tp].kind {
            TypeKind::Base(b) => self.out.push_str(self.ir.str(b.name)),
            TypeKind::Entity(e) => self.out.push_str(self.ir.str(e.name)),
            TypeKind::Ref(r) => {
                if r.indirect {
                    self.out.push('*');
                }
                self.out.push_str(self.ir.str(self.ir.symrefs[r.symref].name));
            }
            TypeKind::Array(a) => {
                self.out.push('[');
                self.print_type(a.index);
                self.out.push(']');
                self.print_type(a.value);
            }
            TypeKind::Proc(p) => {
                self.out.push_str("proc(");
                for (i, pid) in self.ir.proctype_params(&p).enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    let arg = self.ir.paramtypes[pid].arg;
                    self.print_type(arg);
                }
                self.out.push_str(") ");
                self.print_type(p.ret);
            }
        }
    }

    fn push_indent(&mut self, indent: usize) {
        for _ in 0..indent {
            self.out.push_str(INDENT);
        }
    }
}
