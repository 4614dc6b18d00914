//! Symbol resolution: bind every symref to the nearest declaration.

use opalc_par::ir::{Ir, SymrefId};
use opalc_util::Span;
use thiserror::Error;

/// Fatal resolution error.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No scope on the reference's parent chain declares the name.
    #[error("unresolved symbol '{name}'")]
    Unresolved { name: String, span: Span },
}

impl ResolveError {
    /// Location of the offending reference.
    pub fn span(&self) -> Span {
        match self {
            ResolveError::Unresolved { span, .. } => *span,
        }
    }
}

/// Bind every symref in the IR.
///
/// For each reference: walk from its scope up the parent chain, and at
/// each scope linearly scan the contiguous symbol range for a name
/// match. The first hit - the nearest enclosing declaration - wins.
/// A reference that reaches the root without a hit is fatal.
pub fn resolve(ir: &mut Ir) -> Result<(), ResolveError> {
    let ids: Vec<SymrefId> = ir.symrefs.indices().collect();

    for id in ids {
        let (name, ref_scope) = {
            let sr = &ir.symrefs[id];
            (sr.name, sr.scope)
        };

        let mut cursor = Some(ref_scope);
        let mut found = None;
        while let Some(scope) = cursor {
            if let Some(sym) = ir.symbol_in_scope(scope, name) {
                found = Some(sym);
                break;
            }
            cursor = ir.scopes[scope].parent;
        }

        match found {
            Some(sym) => ir.symrefs[id].sym = Some(sym),
            None => {
                let token = ir.symrefs[id].token;
                return Err(ResolveError::Unresolved {
                    name: ir.str(name).to_string(),
                    span: ir.tokens[token].span,
                });
            }
        }
    }

    Ok(())
}
