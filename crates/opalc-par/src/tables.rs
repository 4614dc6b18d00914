//! Static operator and base-type tables.
//!
//! These tables are the single source of truth for how token kinds map
//! to operators, for binary-operator precedence, and for the built-in
//! base types registered in the global scope at startup.

use opalc_lex::TokenKind;

use crate::ir::{BinopKind, UnopKind};

/// Maps a token kind to the prefix operator it introduces.
pub struct PrefixUnopRule {
    pub token: TokenKind,
    pub op: UnopKind,
}

/// Maps a token kind to the postfix operator it introduces.
pub struct PostfixUnopRule {
    pub token: TokenKind,
    pub op: UnopKind,
}

/// Maps a token kind to a binary operator and its precedence.
pub struct BinopRule {
    pub token: TokenKind,
    pub op: BinopKind,
    pub prec: u8,
}

/// Prefix unary operators. `&` is address-of and `*` is deref here;
/// the same tokens are binops in infix position.
pub const PREFIX_UNOPS: &[PrefixUnopRule] = &[
    PrefixUnopRule { token: TokenKind::Tilde, op: UnopKind::InvertBits },
    PrefixUnopRule { token: TokenKind::Bang, op: UnopKind::Not },
    PrefixUnopRule { token: TokenKind::Amp, op: UnopKind::AddressOf },
    PrefixUnopRule { token: TokenKind::Star, op: UnopKind::Deref },
    PrefixUnopRule { token: TokenKind::Minus, op: UnopKind::Negative },
    PrefixUnopRule { token: TokenKind::Plus, op: UnopKind::Positive },
    PrefixUnopRule { token: TokenKind::MinusMinus, op: UnopKind::Predecrement },
    PrefixUnopRule { token: TokenKind::PlusPlus, op: UnopKind::Preincrement },
];

/// Postfix unary operators.
pub const POSTFIX_UNOPS: &[PostfixUnopRule] = &[
    PostfixUnopRule { token: TokenKind::MinusMinus, op: UnopKind::Postdecrement },
    PostfixUnopRule { token: TokenKind::PlusPlus, op: UnopKind::Postincrement },
];

/// Lowest binop precedence; the expression climber starts here.
pub const PREC_MIN: u8 = 1;

/// Binary operators with precedence (higher binds tighter). Ties are
/// left-associative; assignment too - the climber always recurses with
/// `prec + 1`.
pub const BINOPS: &[BinopRule] = &[
    BinopRule { token: TokenKind::Assign, op: BinopKind::Assign, prec: 1 },
    BinopRule { token: TokenKind::EqEq, op: BinopKind::Equals, prec: 2 },
    BinopRule { token: TokenKind::Plus, op: BinopKind::Plus, prec: 3 },
    BinopRule { token: TokenKind::Minus, op: BinopKind::Minus, prec: 3 },
    BinopRule { token: TokenKind::Star, op: BinopKind::Mul, prec: 4 },
    BinopRule { token: TokenKind::Slash, op: BinopKind::Div, prec: 4 },
    BinopRule { token: TokenKind::Amp, op: BinopKind::BitAnd, prec: 5 },
    BinopRule { token: TokenKind::Pipe, op: BinopKind::BitOr, prec: 5 },
    BinopRule { token: TokenKind::Caret, op: BinopKind::BitXor, prec: 5 },
];

/// Precedence of the prefix/postfix tier, above every binop.
pub const PREC_UNARY: u8 = 6;
pub const PREC_POSTFIX: u8 = 7;

/// Built-in base types registered at startup: name and byte size.
pub const BASE_TYPES: &[(&str, u32)] = &[("int", 8), ("byte", 1)];

/// Look up the prefix operator for a token kind.
pub fn prefix_unop_for(token: TokenKind) -> Option<UnopKind> {
    PREFIX_UNOPS
        .iter()
        .find(|rule| rule.token == token)
        .map(|rule| rule.op)
}

/// Look up the postfix operator for a token kind.
pub fn postfix_unop_for(token: TokenKind) -> Option<UnopKind> {
    POSTFIX_UNOPS
        .iter()
        .find(|rule| rule.token == token)
        .map(|rule| rule.op)
}

/// Look up the binop and precedence for a token kind, or `None` if the
/// token is not a binary operator.
pub fn binop_for(token: TokenKind) -> Option<(BinopKind, u8)> {
    BINOPS
        .iter()
        .find(|rule| rule.token == token)
        .map(|rule| (rule.op, rule.prec))
}

/// Precedence of a binop kind, for the pretty-printer.
pub fn binop_prec(op: BinopKind) -> u8 {
    match BINOPS.iter().find(|rule| rule.op == op) {
        Some(rule) => rule.prec,
        None => PREC_MIN,
    }
}
