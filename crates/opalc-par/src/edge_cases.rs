//! Parser edge cases and structural properties.

use opalc_util::FileId;

use crate::ir::*;
use crate::{parse, ParseError};

fn parse_src(src: &str) -> Ir {
    parse(FileId(0), src).expect("source should parse")
}

fn parse_err(src: &str) -> ParseError {
    parse(FileId(0), src).expect_err("source should not parse")
}

/// The expression of `return EXPR;` in the first proc's body.
fn only_return_expr(ir: &Ir) -> ExprId {
    let proc = &ir.procs[ProcId(0)];
    let Stmt::Compound(c) = ir.stmts[proc.body] else {
        panic!("proc body is not a compound");
    };
    let first = ir
        .compound_children(&c)
        .next()
        .expect("body has a statement");
    let Stmt::Return(Some(expr)) = ir.stmts[ir.child_stmts[first].child] else {
        panic!("first statement is not a return with a value");
    };
    expr
}

fn symref_name(ir: &Ir, expr: ExprId) -> &str {
    let ExprKind::Symref(sr) = ir.exprs[expr].kind else {
        panic!("expected a symref expression");
    };
    ir.str(ir.symrefs[sr].name)
}

// ============================================================================
// Declarations
// ============================================================================

#[test]
fn test_data_decl_shape() {
    let ir = parse_src("data x int;");
    assert_eq!(ir.datas.len(), 1);
    let data = ir.datas[DataId(0)];
    assert_eq!(data.scope, ir.global_scope);
    let sym = ir.symbols[data.sym];
    assert_eq!(ir.str(sym.name), "x");
    assert_eq!(sym.kind, SymbolKind::Data(DataId(0)));
    // The declared type is an unresolved direct reference to "int".
    let TypeKind::Ref(r) = ir.types[data.tp].kind else {
        panic!("expected a reference type");
    };
    assert!(!r.indirect);
    assert_eq!(ir.str(ir.symrefs[r.symref].name), "int");
    assert!(ir.symrefs[r.symref].sym.is_none());
}

#[test]
fn test_entity_decl_shape() {
    let mut ir = parse_src("entity Foo { int; }");
    let foo = ir.interner.intern("Foo");
    let sym = ir
        .symbol_in_scope(ir.global_scope, foo)
        .expect("Foo is declared");
    let SymbolKind::Type(tp) = ir.symbols[sym].kind else {
        panic!("Foo is not a type symbol");
    };
    let TypeKind::Entity(entity) = ir.types[tp].kind else {
        panic!("Foo is not an entity type");
    };
    assert_eq!(ir.str(entity.name), "Foo");
    assert!(matches!(ir.types[entity.inner].kind, TypeKind::Ref(_)));
}

#[test]
fn test_array_decl_shape() {
    let ir = parse_src("array table [int] byte;");
    let decl = ir.arrays[ArrayId(0)];
    let TypeKind::Array(at) = ir.types[decl.tp].kind else {
        panic!("expected an array type");
    };
    assert!(matches!(ir.types[at.index].kind, TypeKind::Ref(_)));
    assert!(matches!(ir.types[at.value].kind, TypeKind::Ref(_)));
}

#[test]
fn test_proc_decl_shape() {
    let ir = parse_src("proc f(int a, byte b) int { return 0; }");
    let proc = ir.procs[ProcId(0)];
    assert_eq!(proc.num_params, 2);

    let TypeKind::Proc(pt) = ir.types[proc.tp].kind else {
        panic!("expected a proc type");
    };
    assert_eq!(pt.num_params, 2);
    let ranks: Vec<u32> = ir
        .proctype_params(&pt)
        .map(|id| ir.paramtypes[id].rank)
        .collect();
    assert_eq!(ranks, vec![0, 1]);
    for id in ir.proctype_params(&pt) {
        assert_eq!(ir.paramtypes[id].proc_type, proc.tp);
    }

    // The proc scope holds exactly the two params, in rank order.
    let scope = ir.scopes[proc.scope];
    assert_eq!(scope.kind, ScopeKind::Proc(ProcId(0)));
    assert_eq!(scope.parent, Some(ir.global_scope));
    assert_eq!(scope.num_symbols, 2);
    let names: Vec<&str> = ir
        .scope_symbols(proc.scope)
        .map(|sid| ir.str(ir.symbols[sid].name))
        .collect();
    assert_eq!(names, vec!["a", "b"]);

    for (rank, pid) in ir.proc_params(&proc).enumerate() {
        let param = ir.params[pid];
        assert_eq!(param.rank, rank as u32);
        assert_eq!(param.proc, ProcId(0));
        assert_eq!(ir.symbols[param.sym].kind, SymbolKind::Param(pid));
    }
}

#[test]
fn test_proctype_in_type_position() {
    let ir = parse_src("data cb proc(int, byte) int;");
    let decl = ir.datas[DataId(0)];
    let TypeKind::Proc(pt) = ir.types[decl.tp].kind else {
        panic!("expected a proc type");
    };
    assert_eq!(pt.num_params, 2);
}

// ============================================================================
// Scope contiguity
// ============================================================================

#[test]
fn test_scope_symbol_ranges_are_exact() {
    // Globals surround a proc textually; the flush-on-close discipline
    // must still produce disjoint contiguous ranges.
    let ir = parse_src(
        "data a int;\n\
         proc f(int p) int { data l int; return 0; }\n\
         data z int;",
    );

    for (scope_id, scope) in ir.scopes.iter_enumerated() {
        for sid in ir.scope_symbols(scope_id) {
            assert_eq!(
                ir.symbols[sid].scope, scope_id,
                "symbol inside range belongs to another scope"
            );
        }
        let in_range = |sid: SymbolId| {
            sid.0 >= scope.first_symbol.0 && sid.0 < scope.first_symbol.0 + scope.num_symbols
        };
        for (sid, sym) in ir.symbols.iter_enumerated() {
            if sym.scope == scope_id {
                assert!(in_range(sid), "scope symbol outside declared range");
            }
        }
    }

    // Global declaration order is preserved: builtins, then a, f, z.
    let globals: Vec<&str> = ir
        .scope_symbols(ir.global_scope)
        .map(|sid| ir.str(ir.symbols[sid].name))
        .collect();
    assert_eq!(globals, vec!["int", "byte", "a", "f", "z"]);
}

#[test]
fn test_back_links_patched() {
    let ir = parse_src("data d int; array arr [int] int; proc p() int { return 0; }");
    for (id, data) in ir.datas.iter_enumerated() {
        assert_eq!(ir.symbols[data.sym].kind, SymbolKind::Data(id));
    }
    for (id, array) in ir.arrays.iter_enumerated() {
        assert_eq!(ir.symbols[array.sym].kind, SymbolKind::Array(id));
    }
    for (id, proc) in ir.procs.iter_enumerated() {
        assert_eq!(ir.symbols[proc.sym].kind, SymbolKind::Proc(id));
    }
}

// ============================================================================
// Expressions
// ============================================================================

#[test]
fn test_mul_binds_tighter_than_add() {
    let ir = parse_src("proc t(int a, int b, int c) int { return a + b * c; }");
    let top = only_return_expr(&ir);
    let ExprKind::Binop(add) = ir.exprs[top].kind else {
        panic!("top is not a binop");
    };
    assert_eq!(add.op, BinopKind::Plus);
    assert_eq!(symref_name(&ir, add.lhs), "a");
    let ExprKind::Binop(mul) = ir.exprs[add.rhs].kind else {
        panic!("rhs is not a binop");
    };
    assert_eq!(mul.op, BinopKind::Mul);
    assert_eq!(symref_name(&ir, mul.lhs), "b");
    assert_eq!(symref_name(&ir, mul.rhs), "c");
}

#[test]
fn test_assignment_is_left_associative() {
    let ir = parse_src("proc t(int a, int b, int c) int { return a = b = c; }");
    let top = only_return_expr(&ir);
    let ExprKind::Binop(outer) = ir.exprs[top].kind else {
        panic!("top is not a binop");
    };
    assert_eq!(outer.op, BinopKind::Assign);
    // Left-associative: (a = b) = c.
    let ExprKind::Binop(inner) = ir.exprs[outer.lhs].kind else {
        panic!("lhs is not the inner assignment");
    };
    assert_eq!(inner.op, BinopKind::Assign);
    assert_eq!(symref_name(&ir, inner.lhs), "a");
    assert_eq!(symref_name(&ir, inner.rhs), "b");
    assert_eq!(symref_name(&ir, outer.rhs), "c");
}

#[test]
fn test_postfix_chain_shape() {
    // a.b[c](d) == call(subscript(member(a, "b"), c), [d])
    let ir = parse_src("proc t(int a, int c, int d) int { return a.b[c](d); }");
    let top = only_return_expr(&ir);

    let ExprKind::Call(call) = ir.exprs[top].kind else {
        panic!("top is not a call");
    };
    assert_eq!(call.num_args, 1);
    let arg_link = ir.call_args_of(&call).next().unwrap();
    assert_eq!(ir.call_args[arg_link].call, top);
    assert_eq!(symref_name(&ir, ir.call_args[arg_link].arg), "d");

    let ExprKind::Subscript(sub) = ir.exprs[call.callee].kind else {
        panic!("callee is not a subscript");
    };
    assert_eq!(symref_name(&ir, sub.index), "c");

    let ExprKind::Member(member) = ir.exprs[sub.base].kind else {
        panic!("subscript base is not a member");
    };
    assert_eq!(ir.str(member.name), "b");
    assert_eq!(symref_name(&ir, member.base), "a");
}

#[test]
fn test_prefix_and_postfix_unops() {
    let ir = parse_src("proc t(int a) int { return -a++; }");
    let top = only_return_expr(&ir);
    let ExprKind::Unop(neg) = ir.exprs[top].kind else {
        panic!("top is not a unop");
    };
    assert_eq!(neg.op, UnopKind::Negative);
    let ExprKind::Unop(inc) = ir.exprs[neg.operand].kind else {
        panic!("operand is not a unop");
    };
    assert_eq!(inc.op, UnopKind::Postincrement);
    assert_eq!(symref_name(&ir, inc.operand), "a");
}

#[test]
fn test_address_of_is_prefix_and_bitand_is_infix() {
    let ir = parse_src("proc t(int a, int b) int { return a & &b; }");
    let top = only_return_expr(&ir);
    let ExprKind::Binop(band) = ir.exprs[top].kind else {
        panic!("top is not a binop");
    };
    assert_eq!(band.op, BinopKind::BitAnd);
    let ExprKind::Unop(addr) = ir.exprs[band.rhs].kind else {
        panic!("rhs is not address-of");
    };
    assert_eq!(addr.op, UnopKind::AddressOf);
}

#[test]
fn test_call_args_contiguous_ranked() {
    let ir = parse_src("proc t(int a, int b, int c) int { return t(a, b, c); }");
    let top = only_return_expr(&ir);
    let ExprKind::Call(call) = ir.exprs[top].kind else {
        panic!("top is not a call");
    };
    assert_eq!(call.num_args, 3);
    let names: Vec<&str> = ir
        .call_args_of(&call)
        .map(|link| symref_name(&ir, ir.call_args[link].arg))
        .collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    for (rank, link) in ir.call_args_of(&call).enumerate() {
        assert_eq!(ir.call_args[link].rank, rank as u32);
    }
}

#[test]
fn test_parenthesized_expression_regrouping() {
    let ir = parse_src("proc t(int a, int b, int c) int { return (a + b) * c; }");
    let top = only_return_expr(&ir);
    let ExprKind::Binop(mul) = ir.exprs[top].kind else {
        panic!("top is not a binop");
    };
    assert_eq!(mul.op, BinopKind::Mul);
    let ExprKind::Binop(add) = ir.exprs[mul.lhs].kind else {
        panic!("lhs is not the parenthesized sum");
    };
    assert_eq!(add.op, BinopKind::Plus);
}

#[test]
fn test_literal_expressions() {
    let ir = parse_src(r#"proc t() int { return f(42, "hi"); }"#);
    let top = only_return_expr(&ir);
    let ExprKind::Call(call) = ir.exprs[top].kind else {
        panic!("top is not a call");
    };
    let kinds: Vec<_> = ir
        .call_args_of(&call)
        .map(|link| ir.exprs[ir.call_args[link].arg].kind)
        .collect();
    assert!(matches!(kinds[0], ExprKind::Literal(_)));
    assert!(matches!(kinds[1], ExprKind::Literal(_)));
}

// ============================================================================
// Statements
// ============================================================================

#[test]
fn test_compound_children_ranked() {
    let ir = parse_src(
        "proc t(int a) int { a = 1; { a = 2; a = 3; } a = 4; return a; }",
    );
    let proc = ir.procs[ProcId(0)];
    let Stmt::Compound(c) = ir.stmts[proc.body] else {
        panic!("body is not compound");
    };
    assert_eq!(c.num_stmts, 4);
    for (rank, link) in ir.compound_children(&c).enumerate() {
        let child = ir.child_stmts[link];
        assert_eq!(child.rank, rank as u32);
        assert_eq!(child.parent, proc.body);
    }
    // Second child is the nested compound with its own contiguous run.
    let second = ir.compound_children(&c).nth(1).unwrap();
    let Stmt::Compound(inner) = ir.stmts[ir.child_stmts[second].child] else {
        panic!("second child is not the nested compound");
    };
    assert_eq!(inner.num_stmts, 2);
}

#[test]
fn test_control_flow_statements() {
    let ir = parse_src(
        "proc t(int n) int {\n\
            if (n == 0) return 1;\n\
            while (n == 1) n = n + 1;\n\
            for (n = 0; n == 10; n++) n = n - 1;\n\
            return n;\n\
         }",
    );
    let proc = ir.procs[ProcId(0)];
    let Stmt::Compound(c) = ir.stmts[proc.body] else {
        panic!("body is not compound");
    };
    let kinds: Vec<_> = ir
        .compound_children(&c)
        .map(|link| ir.stmts[ir.child_stmts[link].child])
        .collect();
    assert!(matches!(kinds[0], Stmt::If(_)));
    assert!(matches!(kinds[1], Stmt::While(_)));
    assert!(matches!(kinds[2], Stmt::For(_)));
    assert!(matches!(kinds[3], Stmt::Return(Some(_))));
}

#[test]
fn test_return_without_value() {
    let ir = parse_src("proc t() int { return; }");
    let proc = ir.procs[ProcId(0)];
    let Stmt::Compound(c) = ir.stmts[proc.body] else {
        panic!("body is not compound");
    };
    let link = ir.compound_children(&c).next().unwrap();
    assert!(matches!(
        ir.stmts[ir.child_stmts[link].child],
        Stmt::Return(None)
    ));
}

#[test]
fn test_local_declarations_in_proc_scope() {
    let ir = parse_src("proc t() int { data l int; array a [int] int; return l; }");
    let proc = ir.procs[ProcId(0)];
    let names: Vec<&str> = ir
        .scope_symbols(proc.scope)
        .map(|sid| ir.str(ir.symbols[sid].name))
        .collect();
    assert_eq!(names, vec!["l", "a"]);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_duplicate_symbol_rejected() {
    let err = parse_err("data x int; data x int;");
    assert!(matches!(err, ParseError::DuplicateSymbol { .. }));
}

#[test]
fn test_duplicate_param_rejected() {
    let err = parse_err("proc f(int a, int a) int { return 0; }");
    assert!(matches!(err, ParseError::DuplicateSymbol { .. }));
}

#[test]
fn test_param_and_local_clash_rejected() {
    let err = parse_err("proc f(int a) int { data a int; return 0; }");
    assert!(matches!(err, ParseError::DuplicateSymbol { .. }));
}

#[test]
fn test_global_and_local_may_share_name() {
    // Different scopes: this is shadowing, not a duplicate.
    parse_src("data a int; proc f() int { data a int; return a; }");
}

#[test]
fn test_missing_semicolon() {
    let err = parse_err("data x int");
    assert!(matches!(err, ParseError::UnexpectedEof { .. }));
}

#[test]
fn test_unexpected_token_at_top_level() {
    let err = parse_err("42;");
    assert!(matches!(err, ParseError::Unexpected { .. }));
}

#[test]
fn test_reserved_word_as_name() {
    let err = parse_err("data if int;");
    assert!(matches!(err, ParseError::ReservedWord { .. }));
}

#[test]
fn test_unclosed_body() {
    let err = parse_err("proc f() int { return 0;");
    assert!(matches!(err, ParseError::UnexpectedEof { .. }));
}

#[test]
fn test_pointer_requires_name() {
    let err = parse_err("data p *[int]int;");
    assert!(matches!(err, ParseError::Unexpected { .. }));
}

#[test]
fn test_lex_error_propagates() {
    let err = parse_err("data x int; @");
    assert!(matches!(err, ParseError::Lex(_)));
}

#[test]
fn test_empty_program_parses() {
    let ir = parse_src("");
    // Only the builtins are declared.
    assert_eq!(ir.scopes[ir.global_scope].num_symbols, 2);
}
