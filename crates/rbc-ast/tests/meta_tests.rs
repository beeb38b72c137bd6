use super::*;
use rbc_solver::{LangType, Primitive, TypeId};

#[test]
fn alloc_assigns_sequential_ids() {
    let mut arena = MetaArena::new();
    let a = arena.alloc(SourceLoc::new(1, 0));
    let b = arena.alloc(SourceLoc::new(1, 4));
    assert_eq!(a, MetaId(0));
    assert_eq!(b, MetaId(1));
    assert_eq!(arena.len(), 2);
    assert_eq!(arena.loc(b), SourceLoc::new(1, 4));
}

#[test]
fn resolve_type_is_monotonic_and_idempotent() {
    let mut arena = MetaArena::new();
    let id = arena.alloc(SourceLoc::new(1, 0));
    assert!(!arena.is_resolved(id));

    arena.resolve_type(id, TypeId(3)).unwrap();
    assert!(arena.is_resolved(id));
    assert_eq!(arena.resolved_type(id), Some(TypeId(3)));

    // Same id again is a no-op
    arena.resolve_type(id, TypeId(3)).unwrap();

    // A different id is an internal-invariant error
    assert!(arena.resolve_type(id, TypeId(4)).is_err());
    assert_eq!(arena.resolved_type(id), Some(TypeId(3)));
}

#[test]
fn unresolved_guesses_may_be_refined_but_not_downgraded() {
    let mut arena = MetaArena::new();
    let id = arena.alloc(SourceLoc::new(2, 0));

    arena
        .note_unresolved_type(id, LangType::array(LangType::Undefined))
        .unwrap();
    arena
        .note_unresolved_type(id, LangType::array(LangType::Primitive(Primitive::I32)))
        .unwrap();
    assert!(!arena.is_resolved(id));

    arena.resolve_type(id, TypeId(9)).unwrap();
    assert!(
        arena
            .note_unresolved_type(id, LangType::Undefined)
            .is_err()
    );
}

#[test]
fn symbol_link_is_one_shot() {
    let mut arena = MetaArena::new();
    let id = arena.alloc(SourceLoc::new(3, 1));
    assert_eq!(arena.get(id).symbol(), None);

    arena.link_symbol(id, SymbolId(7)).unwrap();
    arena.link_symbol(id, SymbolId(7)).unwrap();
    assert!(arena.link_symbol(id, SymbolId(8)).is_err());
    assert_eq!(arena.get(id).symbol(), Some(SymbolId(7)));
}

#[test]
fn conversion_annotation_is_stable() {
    let mut arena = MetaArena::new();
    let id = arena.alloc(SourceLoc::new(4, 2));
    arena.set_conversion(id, Conversion::Primitive(TypeId(5))).unwrap();
    arena.set_conversion(id, Conversion::Primitive(TypeId(5))).unwrap();
    assert!(arena.set_conversion(id, Conversion::Primitive(TypeId(6))).is_err());
    assert_eq!(arena.get(id).conversion(), Some(Conversion::Primitive(TypeId(5))));
    assert_eq!(Conversion::Primitive(TypeId(5)).target(), TypeId(5));
}
