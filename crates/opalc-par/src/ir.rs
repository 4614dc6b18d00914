//! The arena-backed intermediate representation.
//!
//! Every entity the parser produces lives in a per-kind arena inside
//! [`Ir`] and points at other entities through typed ids. The graph is
//! heavily cross-referenced - expressions reference types, types reference
//! symbols, symbols reference procs and declarations, scopes reference
//! their parents and a range of symbols - which is exactly what the
//! id-based layout is for: cycles are just numbers, and growth never
//! invalidates anything.
//!
//! Mutation after parsing is restricted to two controlled passes: the
//! resolver writes `Symref::sym`, the completer writes `Type::complete`
//! and `RefType::resolved`. Nothing else changes, and nothing is ever
//! removed.

use opalc_lex::Token;
use opalc_util::{define_idx, Arena, Interner, StrId};

define_idx!(TokenId);
define_idx!(ScopeId);
define_idx!(SymbolId);
define_idx!(SymrefId);
define_idx!(TypeId);
define_idx!(ParamtypeId);
define_idx!(DataId);
define_idx!(ArrayId);
define_idx!(ProcId);
define_idx!(ParamId);
define_idx!(ExprId);
define_idx!(CallArgId);
define_idx!(StmtId);
define_idx!(ChildStmtId);

/// Placeholder for back-links that are patched when the owning scope
/// flushes its symbols. Never observable after a successful parse.
pub(crate) const PENDING_SYM: SymbolId = SymbolId(u32::MAX);

// ============================================================================
// Scopes and symbols
// ============================================================================

/// What kind of scope this is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    /// The single flat global scope.
    Global,
    /// A procedure scope holding its params and locals.
    Proc(ProcId),
}

/// A container for symbol declarations with a parent chain.
///
/// The `num_symbols` symbols starting at `first_symbol` all belong to
/// this scope and to no other; the parser maintains that contiguity by
/// buffering a scope's symbols while it is open and flushing them as one
/// block when it closes.
#[derive(Clone, Copy, Debug)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub kind: ScopeKind,
    pub first_symbol: SymbolId,
    pub num_symbols: u32,
}

/// The artifact a symbol names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    Type(TypeId),
    Data(DataId),
    Array(ArrayId),
    Proc(ProcId),
    Param(ParamId),
}

/// A named, scoped declaration.
#[derive(Clone, Copy, Debug)]
pub struct Symbol {
    pub name: StrId,
    pub scope: ScopeId,
    pub kind: SymbolKind,
}

/// A symbol buffered in an open scope, not yet flushed to the arena.
pub(crate) struct PendingSymbol {
    pub name: StrId,
    pub kind: SymbolKind,
}

/// A use-site reference to a symbol, by name.
///
/// `sym` starts out unset and is written exactly once by the resolver.
#[derive(Clone, Copy, Debug)]
pub struct Symref {
    pub name: StrId,
    /// Scope the reference appears in; lookup walks up from here.
    pub scope: ScopeId,
    /// Originating token, for diagnostics.
    pub token: TokenId,
    pub sym: Option<SymbolId>,
}

// ============================================================================
// Types
// ============================================================================

/// A built-in type: a name and a byte size.
#[derive(Clone, Copy, Debug)]
pub struct BaseType {
    pub name: StrId,
    pub size: u32,
}

/// A nominal wrapper around one element type.
#[derive(Clone, Copy, Debug)]
pub struct EntityType {
    pub name: StrId,
    pub inner: TypeId,
}

/// An array type: index type and value type.
#[derive(Clone, Copy, Debug)]
pub struct ArrayType {
    pub index: TypeId,
    pub value: TypeId,
}

/// A procedure type. Its paramtypes are contiguous in the paramtype
/// arena starting at `first_paramtype`, ordered by rank.
#[derive(Clone, Copy, Debug)]
pub struct ProcType {
    pub ret: TypeId,
    pub num_params: u32,
    pub first_paramtype: ParamtypeId,
}

/// A type written as a name, or as a pointer to a name.
///
/// The symref must resolve to a type symbol. A direct reference
/// (`indirect == false`, a plain named use) is complete only once the
/// target type is complete; a pointer (`indirect == true`, written `*T`)
/// has a fixed size regardless of its pointee and completes as soon as
/// the symref resolves. That difference is what lets mutually recursive
/// entities tie the knot through a pointer while direct mutual embedding
/// stays incomplete forever.
#[derive(Clone, Copy, Debug)]
pub struct RefType {
    pub symref: SymrefId,
    pub indirect: bool,
    /// Target type, cached by the completer.
    pub resolved: Option<TypeId>,
}

/// Payload of a type.
#[derive(Clone, Copy, Debug)]
pub enum TypeKind {
    Base(BaseType),
    Entity(EntityType),
    Array(ArrayType),
    Proc(ProcType),
    Ref(RefType),
}

/// A type together with its completion flag.
///
/// `complete` is monotone: false to true only, computed by the completer
/// fixpoint after resolution.
#[derive(Clone, Copy, Debug)]
pub struct Type {
    pub kind: TypeKind,
    pub complete: bool,
}

/// One parameter slot of a proc type.
#[derive(Clone, Copy, Debug)]
pub struct Paramtype {
    pub proc_type: TypeId,
    pub arg: TypeId,
    pub rank: u32,
}

// ============================================================================
// Declarations
// ============================================================================

/// Result of parsing a `data` declaration.
#[derive(Clone, Copy, Debug)]
pub struct DataDecl {
    pub scope: ScopeId,
    pub tp: TypeId,
    /// Back-link to the owning symbol.
    pub sym: SymbolId,
}

/// Result of parsing an `array` declaration.
#[derive(Clone, Copy, Debug)]
pub struct ArrayDecl {
    pub scope: ScopeId,
    pub tp: TypeId,
    /// Back-link to the owning symbol.
    pub sym: SymbolId,
}

/// Result of parsing a `proc` definition.
#[derive(Clone, Copy, Debug)]
pub struct Proc {
    /// The proc type.
    pub tp: TypeId,
    /// Back-link to the owning symbol.
    pub sym: SymbolId,
    /// The scope holding params and locals.
    pub scope: ScopeId,
    pub num_params: u32,
    /// Params are contiguous from here, ordered by rank.
    pub first_param: ParamId,
    /// The body compound statement.
    pub body: StmtId,
}

/// One declared parameter of a proc.
#[derive(Clone, Copy, Debug)]
pub struct Param {
    pub proc: ProcId,
    pub sym: SymbolId,
    pub tp: TypeId,
    pub rank: u32,
}

// ============================================================================
// Operators
// ============================================================================

/// Unary operator kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnopKind {
    InvertBits,
    Not,
    AddressOf,
    Deref,
    Negative,
    Positive,
    Predecrement,
    Preincrement,
    Postdecrement,
    Postincrement,
}

impl UnopKind {
    /// True for operators written before their operand.
    pub fn is_prefix(&self) -> bool {
        !matches!(self, UnopKind::Postdecrement | UnopKind::Postincrement)
    }

    /// Source text of the operator.
    pub fn text(&self) -> &'static str {
        match self {
            UnopKind::InvertBits => "~",
            UnopKind::Not => "!",
            UnopKind::AddressOf => "&",
            UnopKind::Deref => "*",
            UnopKind::Negative => "-",
            UnopKind::Positive => "+",
            UnopKind::Predecrement | UnopKind::Postdecrement => "--",
            UnopKind::Preincrement | UnopKind::Postincrement => "++",
        }
    }
}

/// Binary operator kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinopKind {
    Assign,
    Equals,
    Minus,
    Plus,
    Mul,
    Div,
    BitAnd,
    BitOr,
    BitXor,
}

impl BinopKind {
    /// Source text of the operator.
    pub fn text(&self) -> &'static str {
        match self {
            BinopKind::Assign => "=",
            BinopKind::Equals => "==",
            BinopKind::Minus => "-",
            BinopKind::Plus => "+",
            BinopKind::Mul => "*",
            BinopKind::Div => "/",
            BinopKind::BitAnd => "&",
            BinopKind::BitOr => "|",
            BinopKind::BitXor => "^",
        }
    }
}

// ============================================================================
// Expressions
// ============================================================================

/// A unary operation.
#[derive(Clone, Copy, Debug)]
pub struct UnopExpr {
    pub op: UnopKind,
    pub token: TokenId,
    pub operand: ExprId,
}

/// A binary operation.
#[derive(Clone, Copy, Debug)]
pub struct BinopExpr {
    pub op: BinopKind,
    pub token: TokenId,
    pub lhs: ExprId,
    pub rhs: ExprId,
}

/// Member selection `base.name`.
#[derive(Clone, Copy, Debug)]
pub struct MemberExpr {
    pub base: ExprId,
    pub name: StrId,
}

/// Subscript `base[index]`.
#[derive(Clone, Copy, Debug)]
pub struct SubscriptExpr {
    pub base: ExprId,
    pub index: ExprId,
}

/// A call. Its args are contiguous in the call-arg arena starting at
/// `first_arg`, ordered by rank.
#[derive(Clone, Copy, Debug)]
pub struct CallExpr {
    pub callee: ExprId,
    pub first_arg: CallArgId,
    pub num_args: u32,
}

/// Payload of an expression.
#[derive(Clone, Copy, Debug)]
pub enum ExprKind {
    /// An integer or string literal; the token carries the value.
    Literal(TokenId),
    Symref(SymrefId),
    Unop(UnopExpr),
    Binop(BinopExpr),
    Member(MemberExpr),
    Subscript(SubscriptExpr),
    Call(CallExpr),
}

/// An expression node.
#[derive(Clone, Copy, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    /// Reserved for a typing pass that runs after completion; the front
    /// end never populates it.
    pub ty: Option<TypeId>,
}

/// One argument slot of a call.
#[derive(Clone, Copy, Debug)]
pub struct CallArg {
    pub call: ExprId,
    pub arg: ExprId,
    pub rank: u32,
}

// ============================================================================
// Statements
// ============================================================================

/// An if statement.
#[derive(Clone, Copy, Debug)]
pub struct IfStmt {
    pub cond: ExprId,
    pub body: StmtId,
}

/// A for statement: `for (init; cond; step) body`.
#[derive(Clone, Copy, Debug)]
pub struct ForStmt {
    pub init: StmtId,
    pub cond: ExprId,
    pub step: StmtId,
    pub body: StmtId,
}

/// A while statement.
#[derive(Clone, Copy, Debug)]
pub struct WhileStmt {
    pub cond: ExprId,
    pub body: StmtId,
}

/// A compound statement. Its children are contiguous in the child-stmt
/// arena starting at `first_child`, ranks increasing in parse order.
#[derive(Clone, Copy, Debug)]
pub struct CompoundStmt {
    pub first_child: ChildStmtId,
    pub num_stmts: u32,
}

/// A statement.
#[derive(Clone, Copy, Debug)]
pub enum Stmt {
    If(IfStmt),
    For(ForStmt),
    While(WhileStmt),
    Return(Option<ExprId>),
    Expr(ExprId),
    Compound(CompoundStmt),
    Data(DataId),
    Array(ArrayId),
}

/// Parent/child link of a compound statement.
#[derive(Clone, Copy, Debug)]
pub struct ChildStmt {
    pub parent: StmtId,
    pub child: StmtId,
    pub rank: u32,
}

// ============================================================================
// Keywords
// ============================================================================

/// The reserved words, interned once at IR construction so the parser
/// compares token payload ids instead of strings.
#[derive(Clone, Copy, Debug)]
pub struct Keywords {
    pub kw_if: StrId,
    pub kw_while: StrId,
    pub kw_for: StrId,
    pub kw_return: StrId,
    pub kw_proc: StrId,
    pub kw_data: StrId,
    pub kw_entity: StrId,
    pub kw_array: StrId,
}

impl Keywords {
    fn intern_all(interner: &mut Interner) -> Self {
        Self {
            kw_if: interner.intern("if"),
            kw_while: interner.intern("while"),
            kw_for: interner.intern("for"),
            kw_return: interner.intern("return"),
            kw_proc: interner.intern("proc"),
            kw_data: interner.intern("data"),
            kw_entity: interner.intern("entity"),
            kw_array: interner.intern("array"),
        }
    }

    /// True if `name` is any reserved word.
    pub fn is_keyword(&self, name: StrId) -> bool {
        name == self.kw_if
            || name == self.kw_while
            || name == self.kw_for
            || name == self.kw_return
            || name == self.kw_proc
            || name == self.kw_data
            || name == self.kw_entity
            || name == self.kw_array
    }
}

// ============================================================================
// The IR root
// ============================================================================

/// All compiler state for one compilation: the interner plus one arena
/// per entity kind. Created by the parser, read by everything else,
/// mutated in place by the resolver and completer.
#[derive(Debug)]
pub struct Ir {
    pub interner: Interner,
    pub kw: Keywords,
    pub tokens: Arena<TokenId, Token>,
    pub scopes: Arena<ScopeId, Scope>,
    pub symbols: Arena<SymbolId, Symbol>,
    pub symrefs: Arena<SymrefId, Symref>,
    pub types: Arena<TypeId, Type>,
    pub paramtypes: Arena<ParamtypeId, Paramtype>,
    pub datas: Arena<DataId, DataDecl>,
    pub arrays: Arena<ArrayId, ArrayDecl>,
    pub procs: Arena<ProcId, Proc>,
    pub params: Arena<ParamId, Param>,
    pub exprs: Arena<ExprId, Expr>,
    pub call_args: Arena<CallArgId, CallArg>,
    pub stmts: Arena<StmtId, Stmt>,
    pub child_stmts: Arena<ChildStmtId, ChildStmt>,
    /// The flat global scope, always `ScopeId(0)`.
    pub global_scope: ScopeId,
}

impl Ir {
    /// Create an empty IR with the keywords interned and the global
    /// scope in place. Base types are registered by the parser, which
    /// owns symbol declaration.
    pub fn new() -> Self {
        let mut interner = Interner::new();
        let kw = Keywords::intern_all(&mut interner);
        let mut scopes = Arena::new();
        let global_scope = scopes.push(Scope {
            parent: None,
            kind: ScopeKind::Global,
            first_symbol: SymbolId(0),
            num_symbols: 0,
        });

        Self {
            interner,
            kw,
            tokens: Arena::new(),
            scopes,
            symbols: Arena::new(),
            symrefs: Arena::new(),
            types: Arena::new(),
            paramtypes: Arena::new(),
            datas: Arena::new(),
            arrays: Arena::new(),
            procs: Arena::new(),
            params: Arena::new(),
            exprs: Arena::new(),
            call_args: Arena::new(),
            stmts: Arena::new(),
            child_stmts: Arena::new(),
            global_scope,
        }
    }

    /// Text of an interned string.
    #[inline]
    pub fn str(&self, id: StrId) -> &str {
        self.interner.get(id)
    }

    /// The ids of the symbols declared in `scope`, in declaration order.
    pub fn scope_symbols(&self, scope: ScopeId) -> impl Iterator<Item = SymbolId> + '_ {
        let s = self.scopes[scope];
        (0..s.num_symbols).map(move |i| SymbolId(s.first_symbol.0 + i))
    }

    /// Linearly scan one scope's contiguous symbol range for a name.
    pub fn symbol_in_scope(&self, scope: ScopeId, name: StrId) -> Option<SymbolId> {
        self.scope_symbols(scope)
            .find(|&sid| self.symbols[sid].name == name)
    }

    /// True if `ancestor` is `scope` or appears on its parent chain.
    pub fn scope_is_ancestor(&self, ancestor: ScopeId, scope: ScopeId) -> bool {
        let mut cur = Some(scope);
        while let Some(s) = cur {
            if s == ancestor {
                return true;
            }
            cur = self.scopes[s].parent;
        }
        false
    }

    /// The paramtype ids of a proc type, in rank order.
    pub fn proctype_params(&self, pt: &ProcType) -> impl Iterator<Item = ParamtypeId> {
        let first = pt.first_paramtype.0;
        (0..pt.num_params).map(move |i| ParamtypeId(first + i))
    }

    /// The child statement link ids of a compound, in rank order.
    pub fn compound_children(&self, c: &CompoundStmt) -> impl Iterator<Item = ChildStmtId> {
        let first = c.first_child.0;
        (0..c.num_stmts).map(move |i| ChildStmtId(first + i))
    }

    /// The call-arg link ids of a call, in rank order.
    pub fn call_args_of(&self, c: &CallExpr) -> impl Iterator<Item = CallArgId> {
        let first = c.first_arg.0;
        (0..c.num_args).map(move |i| CallArgId(first + i))
    }

    /// The param ids of a proc, in rank order.
    pub fn proc_params(&self, p: &Proc) -> impl Iterator<Item = ParamId> {
        let first = p.first_param.0;
        (0..p.num_params).map(move |i| ParamId(first + i))
    }
}

impl Default for Ir {
    fn default() -> Self {
        Self::new()
    }
}
