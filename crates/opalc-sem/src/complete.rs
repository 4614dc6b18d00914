//! Type completion: a monotone fixpoint over the type arena.
//!
//! A type is complete once all of its direct dependencies are:
//!
//! - a base type always is;
//! - an entity needs its inner type complete;
//! - an array needs both its index and value types complete;
//! - a proc type needs its return type and every paramtype complete;
//! - a direct reference needs its target type complete;
//! - a pointer reference only needs its symref resolved to a type
//!   symbol: a pointer's size does not depend on its pointee, which is
//!   what lets mutually recursive entities close their cycle through a
//!   pointer while direct mutual embedding never completes.
//!
//! The pass sweeps the whole arena until a sweep changes nothing. The
//! flag only ever flips false to true, and there are finitely many
//! types, so at most N sweeps run. Any type still incomplete at the
//! fixpoint is fatal.

use opalc_par::ir::{Ir, SymbolKind, TypeId, TypeKind};
use opalc_par::pretty::type_to_string;
use opalc_util::{Idx, Span};
use thiserror::Error;

/// Fatal completion error.
#[derive(Debug, Error)]
pub enum CompleteError {
    /// A type reference resolved to a data/array/proc/param symbol.
    #[error("'{name}' does not name a type")]
    NotAType { name: String, span: Span },

    /// A type still incomplete at the fixpoint: an embedding cycle or a
    /// reference that never resolved.
    #[error("type '{name}' is never complete")]
    IncompleteType { name: String, span: Option<Span> },
}

impl CompleteError {
    /// Location of the error, when one is known.
    pub fn span(&self) -> Option<Span> {
        match self {
            CompleteError::NotAType { span, .. } => Some(*span),
            CompleteError::IncompleteType { span, .. } => *span,
        }
    }
}

/// Compute `complete` for every type in the IR.
///
/// Requires symbol resolution to have run; an unresolved symref inside
/// a type simply leaves the type incomplete and is reported at the
/// fixpoint.
pub fn complete(ir: &mut Ir) -> Result<(), CompleteError> {
    loop {
        let mut changed = false;

        for i in 0..ir.types.len() {
            let tid = TypeId::from_usize(i);
            let t = ir.types[tid];
            if t.complete {
                continue;
            }

            let now_complete = match t.kind {
                TypeKind::Base(_) => true,
                TypeKind::Entity(e) => ir.types[e.inner].complete,
                TypeKind::Array(a) => ir.types[a.index].complete && ir.types[a.value].complete,
                TypeKind::Proc(pt) => {
                    ir.types[pt.ret].complete
                        && ir
                            .proctype_params(&pt)
                            .all(|p| ir.types[ir.paramtypes[p].arg].complete)
                }
                TypeKind::Ref(r) => {
                    let Some(sym) = ir.symrefs[r.symref].sym else {
                        // Unresolved; stays incomplete and is reported
                        // at the fixpoint.
                        continue;
                    };
                    let SymbolKind::Type(target) = ir.symbols[sym].kind else {
                        let token = ir.symrefs[r.symref].token;
                        return Err(CompleteError::NotAType {
                            name: ir.str(ir.symrefs[r.symref].name).to_string(),
                            span: ir.tokens[token].span,
                        });
                    };
                    if r.indirect || ir.types[target].complete {
                        if let TypeKind::Ref(ref mut rr) = ir.types[tid].kind {
                            rr.resolved = Some(target);
                        }
                        true
                    } else {
                        false
                    }
                }
            };

            if now_complete {
                ir.types[tid].complete = true;
                changed = true;
            }
        }

        if !changed {
            break;
        }
    }

    for i in 0..ir.types.len() {
        let tid = TypeId::from_usize(i);
        if !ir.types[tid].complete {
            return Err(CompleteError::IncompleteType {
                name: type_to_string(ir, tid),
                span: incomplete_span(ir, tid),
            });
        }
    }

    Ok(())
}

/// Best-effort location for an incomplete type: the token of the first
/// symref reachable without following resolved targets.
fn incomplete_span(ir: &Ir, tid: TypeId) -> Option<Span> {
    match ir.types[tid].kind {
        TypeKind::Base(_) => None,
        TypeKind::Entity(e) => incomplete_span(ir, e.inner),
        TypeKind::Array(a) => {
            incomplete_span(ir, a.index).or_else(|| incomplete_span(ir, a.value))
        }
        TypeKind::Proc(pt) => incomplete_span(ir, pt.ret).or_else(|| {
            ir.proctype_params(&pt)
                .find_map(|p| incomplete_span(ir, ir.paramtypes[p].arg))
        }),
        TypeKind::Ref(r) => {
            let token = ir.symrefs[r.symref].token;
            Some(ir.tokens[token].span)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::resolve;
    use opalc_par::ir::{DataId, RefType};
    use opalc_par::parse;
    use opalc_util::FileId;

    fn completed_ir(src: &str) -> Ir {
        let mut ir = parse(FileId(0), src).expect("parse");
        resolve(&mut ir).expect("resolve");
        complete(&mut ir).expect("complete");
        ir
    }

    fn completion_err(src: &str) -> CompleteError {
        let mut ir = parse(FileId(0), src).expect("parse");
        resolve(&mut ir).expect("resolve");
        complete(&mut ir).expect_err("completion should fail")
    }

    fn ref_of(ir: &Ir, tid: TypeId) -> RefType {
        match ir.types[tid].kind {
            TypeKind::Ref(r) => r,
            other => panic!("expected a reference type, got {:?}", other),
        }
    }

    #[test]
    fn test_data_with_base_type() {
        // Everything reachable from `x` ends up complete.
        let ir = completed_ir("data x int;");
        let data = ir.datas[DataId(0)];
        assert!(ir.types[data.tp].complete);
        let r = ref_of(&ir, data.tp);
        let target = r.resolved.expect("reference caches its target");
        assert!(matches!(ir.types[target].kind, TypeKind::Base(_)));
        assert!(ir.types[target].complete);
    }

    #[test]
    fn test_entity_and_reference() {
        // y's type is a reference resolving to the Foo entity.
        let ir = completed_ir("entity Foo { int; } data y Foo;");
        let data = ir.datas[DataId(0)];
        let r = ref_of(&ir, data.tp);
        let target = r.resolved.expect("resolved");
        let TypeKind::Entity(entity) = ir.types[target].kind else {
            panic!("y's type does not reach the entity");
        };
        assert_eq!(ir.str(entity.name), "Foo");
        assert!(ir.types[target].complete);
        assert!(ir.types[data.tp].complete);
    }

    #[test]
    fn test_proc_type_completes() {
        // The proctype of f completes.
        let ir = completed_ir("proc f(int a) int { return a + 1; }");
        for (_, t) in ir.types.iter_enumerated() {
            assert!(t.complete);
        }
    }

    #[test]
    fn test_every_type_complete_or_failure() {
        let ir = completed_ir(
            "entity Foo { int; }\n\
             array table [int] *Foo;\n\
             data cb proc(int, Foo) int;\n\
             proc f(Foo x) *Foo { return 0; }",
        );
        for (_, t) in ir.types.iter_enumerated() {
            assert!(t.complete);
        }
    }

    #[test]
    fn test_direct_cycle_is_fatal() {
        // Direct mutual embedding never completes.
        let err = completion_err("entity A { B; } entity B { A; }");
        assert!(matches!(err, CompleteError::IncompleteType { .. }));
    }

    #[test]
    fn test_self_embedding_is_fatal() {
        let err = completion_err("entity A { A; }");
        assert!(matches!(err, CompleteError::IncompleteType { .. }));
    }

    #[test]
    fn test_pointer_breaks_cycle() {
        // The same shape through pointers completes.
        let ir = completed_ir("entity A { *B; } entity B { *A; }");
        for (_, t) in ir.types.iter_enumerated() {
            assert!(t.complete);
        }
    }

    #[test]
    fn test_self_pointer_completes() {
        let ir = completed_ir("entity Node { *Node; } data head *Node;");
        for (_, t) in ir.types.iter_enumerated() {
            assert!(t.complete);
        }
    }

    #[test]
    fn test_pointer_caches_target() {
        let ir = completed_ir("entity Node { *Node; }");
        for (_, t) in ir.types.iter_enumerated() {
            if let TypeKind::Ref(r) = t.kind {
                let target = r.resolved.expect("pointer caches its target");
                assert!(matches!(ir.types[target].kind, TypeKind::Entity(_)));
            }
        }
    }

    #[test]
    fn test_reference_to_non_type_is_fatal() {
        let err = completion_err("data x int; data y x;");
        match err {
            CompleteError::NotAType { name, .. } => assert_eq!(name, "x"),
            other => panic!("expected NotAType, got {:?}", other),
        }
    }

    #[test]
    fn test_incomplete_error_names_the_type() {
        let err = completion_err("entity A { B; } entity B { A; }");
        let CompleteError::IncompleteType { name, span } = err else {
            panic!("expected IncompleteType");
        };
        // The first stuck type is the reference to B inside A.
        assert_eq!(name, "B");
        assert!(span.is_some());
    }

    #[test]
    fn test_completion_is_idempotent() {
        let mut ir = parse(FileId(0), "entity Foo { int; } data y Foo;").expect("parse");
        resolve(&mut ir).expect("resolve");
        complete(&mut ir).expect("first run");
        complete(&mut ir).expect("second run");
        for (_, t) in ir.types.iter_enumerated() {
            assert!(t.complete);
        }
    }
}
