use super::*;
use crate::namespace::NamespaceId;
use rbc_ast::Modifiers;
use rbc_common::SourceLoc;
use rbc_solver::LangType;

fn field(name: &str, ns_scope: NsScope, loc: SourceLoc) -> SymbolData {
    SymbolData {
        name: name.to_string(),
        modifiers: Modifiers::empty(),
        type_ref: TypeRef::Unresolved(LangType::Undefined),
        kind: crate::symbol::SymbolKind::Field,
        loc,
        ns_scope,
    }
}

#[test]
fn define_then_lookup() {
    let mut table = SymbolTable::new();
    let at = NsScope::global(NamespaceId::ROOT);
    let id = table.define(field("x", at, SourceLoc::new(1, 0))).unwrap();

    assert_eq!(table.lookup_in(at, "x"), Some(id));
    assert!(table.data(id).is_some());
    assert_eq!(table.data(id).unwrap().name, "x");
}

#[test]
fn duplicate_definition_is_an_error() {
    let mut table = SymbolTable::new();
    let at = NsScope::global(NamespaceId::ROOT);
    table.define(field("x", at, SourceLoc::new(1, 0))).unwrap();

    let err = table.define(field("x", at, SourceLoc::new(2, 0))).unwrap_err();
    assert_eq!(err.to_string(), "Duplicate symbol 'x'");
}

#[test]
fn redefining_the_same_declaration_site_is_idempotent() {
    // The multi-attempt resolver re-runs Pass 1; the same `let` at the
    // same location must land on the same symbol, not error.
    let mut table = SymbolTable::new();
    let at = NsScope::global(NamespaceId::ROOT);
    let first = table.define(field("x", at, SourceLoc::new(1, 0))).unwrap();
    let second = table.define(field("x", at, SourceLoc::new(1, 0))).unwrap();
    assert_eq!(first, second);
    assert_eq!(table.len(), 1);
}

#[test]
fn stub_collapses_in_place() {
    let mut table = SymbolTable::new();
    let at = NsScope::global(NamespaceId::ROOT);

    let stub = table.get_stub(at, "later");
    assert!(table.data(stub).is_none());
    // Asking again returns the same stub.
    assert_eq!(table.get_stub(at, "later"), stub);

    let id = table.define(field("later", at, SourceLoc::new(9, 0))).unwrap();
    assert_eq!(id, stub);
    assert!(table.data(stub).is_some());
}

#[test]
fn lookup_walks_chain_innermost_first() {
    let mut table = SymbolTable::new();
    let ns = NamespaceId::ROOT;
    let outer = NsScope::new(ns, ScopeId::GLOBAL);
    let inner = NsScope::new(ns, ScopeId(1));

    let outer_id = table.define(field("x", outer, SourceLoc::new(1, 0))).unwrap();
    let inner_id = table.define(field("x", inner, SourceLoc::new(3, 2))).unwrap();

    let chain = [ScopeId(1), ScopeId::GLOBAL];
    assert_eq!(table.lookup(ns, &chain, "x"), Some(inner_id));

    let chain = [ScopeId::GLOBAL];
    assert_eq!(table.lookup(ns, &chain, "x"), Some(outer_id));

    assert_eq!(table.lookup(ns, &chain, "y"), None);
}

#[test]
fn finalize_type_is_monotonic() {
    let mut table = SymbolTable::new();
    let at = NsScope::global(NamespaceId::ROOT);
    let id = table.define(field("x", at, SourceLoc::new(1, 0))).unwrap();

    table.finalize_type(id, rbc_solver::TypeId::I64).unwrap();
    // Same id again: fine.
    table.finalize_type(id, rbc_solver::TypeId::I64).unwrap();
    // A different id: invariant violation.
    assert!(table.finalize_type(id, rbc_solver::TypeId::I32).is_err());

    match &table.data(id).unwrap().type_ref {
        TypeRef::Resolved(ty) => assert_eq!(*ty, rbc_solver::TypeId::I64),
        TypeRef::Unresolved(_) => panic!("expected a finalized type"),
    }
}

#[test]
fn validate_reports_leftover_stubs() {
    let mut table = SymbolTable::new();
    let at = NsScope::global(NamespaceId::ROOT);
    table.get_stub(at, "ghost");
    let errors = table.validate();
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        ValidationError::UnresolvedStub { name, .. } if name == "ghost"
    ));

    table.define(field("ghost", at, SourceLoc::new(5, 0))).unwrap();
    assert!(table.validate().is_empty());
}
