use super::*;
use crate::types::{LangType, Primitive};

#[test]
fn primitives_occupy_fixed_low_ids() {
    let table = TypeTable::new();
    assert_eq!(table.lookup(&LangType::NIL).unwrap().id, TypeId::NIL);
    assert_eq!(table.lookup(&LangType::BOOL).unwrap().id, TypeId::BOOL);
    assert_eq!(table.lookup(&LangType::I32).unwrap().id, TypeId::I32);
    assert_eq!(table.lookup(&LangType::I64).unwrap().id, TypeId::I64);
    assert_eq!(table.lookup(&LangType::F32).unwrap().id, TypeId::F32);
    assert_eq!(table.lookup(&LangType::F64).unwrap().id, TypeId::F64);
    assert_eq!(table.lookup(&LangType::STR).unwrap().id, TypeId::STR);
    assert_eq!(table.lookup(&LangType::QUOTE).unwrap().id, TypeId::QUOTE);
}

#[test]
fn resolve_is_idempotent() {
    let mut table = TypeTable::new();
    let ty = LangType::array(LangType::I32);
    let first = table.resolve(&ty).unwrap();
    let second = table.resolve(&ty).unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(table.len(), 9); // 8 fixed + the array
}

#[test]
fn structurally_equal_types_share_an_id() {
    let mut table = TypeTable::new();
    let a = table
        .resolve(&LangType::function(vec![LangType::I32, LangType::I32], LangType::I32))
        .unwrap();
    let b = table
        .resolve(&LangType::function(vec![LangType::I32, LangType::I32], LangType::I32))
        .unwrap();
    assert_eq!(a.id, b.id);

    let c = table
        .resolve(&LangType::function(vec![LangType::I32], LangType::I32))
        .unwrap();
    assert_ne!(a.id, c.id);
}

#[test]
fn resolve_registers_nested_composites() {
    let mut table = TypeTable::new();
    let nested = LangType::array(LangType::tuple(vec![LangType::I32, LangType::STR]));
    let entry = table.resolve(&nested).unwrap();
    assert!(entry.flags.contains(TypeFlags::COMPOSITE));

    // The inner tuple was interned on the way down.
    assert!(table.lookup(&LangType::tuple(vec![LangType::I32, LangType::STR])).is_some());
}

#[test]
fn resolve_fails_on_undefined_leaves() {
    let mut table = TypeTable::new();
    assert!(table.resolve(&LangType::Undefined).is_none());
    assert!(table.resolve(&LangType::array(LangType::Undefined)).is_none());
    assert!(
        table
            .resolve(&LangType::function(vec![LangType::Undefined], LangType::I32))
            .is_none()
    );
}

#[test]
fn user_types_resolve_only_after_declaration() {
    let mut table = TypeTable::new();
    assert!(table.resolve(&LangType::user("Point")).is_none());

    let declared = table.declare_user("Point");
    let resolved = table.resolve(&LangType::user("Point")).unwrap();
    assert_eq!(declared.id, resolved.id);

    // Composites over user types resolve too, once declared.
    assert!(table.resolve(&LangType::array(LangType::user("Point"))).is_some());
    assert!(table.resolve(&LangType::array(LangType::user("Shape"))).is_none());
}

#[test]
fn lookup_never_inserts() {
    let table = TypeTable::new();
    let before = table.len();
    assert!(table.lookup(&LangType::array(LangType::I32)).is_none());
    assert_eq!(table.len(), before);
}

#[test]
fn deferred_empty_array_adopts_declared_element() {
    let mut table = TypeTable::new();
    let declared = table.resolve_id(&LangType::array(LangType::I64)).unwrap();

    let src = LangType::array(LangType::Undefined);
    let compat = table.check_deferred(&src, declared);
    assert!(compat.compatible);
    assert_eq!(compat.conversion, WideningConversion::Composite(declared));

    let other = table.resolve_id(&LangType::tuple(vec![LangType::I64])).unwrap();
    assert!(!table.check_deferred(&src, other).compatible);
}

#[test]
fn primitive_of() {
    let table = TypeTable::new();
    assert_eq!(table.primitive_of(TypeId::I32), Some(Primitive::I32));
    assert_eq!(table.primitive_of(TypeId::STR), None);
}
