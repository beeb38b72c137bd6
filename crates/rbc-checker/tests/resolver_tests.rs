//! End-to-end resolver behavior over built ASTs.

use rbc_ast::{Ast, Conversion, Modifiers, Op};
use rbc_binder::{NamespaceId, NamespaceTree, ScopeId, SymbolTable};
use rbc_common::{CompileError, SourceLoc, diagnostic_codes};
use rbc_checker::{Resolver, ResolverOptions};
use rbc_solver::{LangType, TypeId, TypeTable};

fn loc(line: i32, column: i32) -> SourceLoc {
    SourceLoc::new(line, column)
}

struct Ctx {
    table: SymbolTable,
    types: TypeTable,
    tree: NamespaceTree,
    main: NamespaceId,
}

fn ctx() -> Ctx {
    let tree = NamespaceTree::new();
    let main = tree.resolve_path("main").unwrap();
    Ctx {
        table: SymbolTable::new(),
        types: TypeTable::new(),
        tree,
        main,
    }
}

fn resolve(ctx: &mut Ctx, ast: &mut Ast) -> Result<rbc_checker::ResolveOutcome, CompileError> {
    Resolver::new(ResolverOptions::default()).resolve_unit(
        &mut ctx.table,
        &mut ctx.types,
        &ctx.tree,
        ctx.main,
        ast,
    )
}

#[test]
fn literal_resolves_to_i32() {
    // `42`
    let mut b = Ast::builder();
    let v = b.int32(42, loc(1, 0));
    let v_meta = v.meta();
    b.push_root(v);
    let mut ast = b.finish();

    let mut ctx = ctx();
    let outcome = resolve(&mut ctx, &mut ast).unwrap();
    assert!(outcome.fully_resolved);
    assert_eq!(ast.meta.resolved_type(v_meta), Some(TypeId::I32));
}

#[test]
fn let_with_widening_annotation() {
    // `let x : I64 = 42`
    let mut b = Ast::builder();
    let v = b.int32(42, loc(1, 13));
    let v_meta = v.meta();
    let stmt = b.let_stmt("x", Modifiers::empty(), Some(LangType::I64), v, loc(1, 0));
    b.push_root(stmt);
    let mut ast = b.finish();

    let mut ctx = ctx();
    let outcome = resolve(&mut ctx, &mut ast).unwrap();
    assert!(outcome.fully_resolved);

    let sym = ctx
        .table
        .lookup(ctx.main, &[ScopeId::GLOBAL], "x")
        .expect("x declared in scope 0");
    match &ctx.table.data(sym).unwrap().type_ref {
        rbc_ast::TypeRef::Resolved(id) => assert_eq!(*id, TypeId::I64),
        other => panic!("expected a finalized type, got {other:?}"),
    }
    assert_eq!(
        ast.meta.get(v_meta).conversion(),
        Some(Conversion::Primitive(TypeId::I64))
    );
}

#[test]
fn reassigning_an_immutable_binding_fails() {
    // `{ let x : I32 = 10  x := (+ x 10) }`
    let mut b = Ast::builder();
    let ten = b.int32(10, loc(1, 14));
    let let_x = b.let_stmt("x", Modifiers::empty(), Some(LangType::I32), ten, loc(1, 2));
    let x1 = b.identifier("x", loc(2, 2));
    let x2 = b.identifier("x", loc(2, 10));
    let amount = b.int32(10, loc(2, 12));
    let sum = b.op(Op::Plus, vec![x2, amount], loc(2, 7));
    let reassign = b.op(Op::ReAssign, vec![x1, sum], loc(2, 2));
    let block = b.block(vec![let_x.into(), reassign.into()], loc(1, 0));
    b.push_root(block);
    let mut ast = b.finish();

    let mut ctx = ctx();
    let err = resolve(&mut ctx, &mut ast).unwrap_err();
    assert_eq!(err.code(), diagnostic_codes::INVALID_OPERATION);
    assert_eq!(
        err.to_string(),
        "Invalid operation 'assignment': Symbol is not mutable"
    );
}

#[test]
fn nested_arithmetic_resolves_to_i32() {
    // `(- 10 20 30 (* (+ 10 10) (+ 20 -20)))`
    let mut b = Ast::builder();
    let a = b.int32(10, loc(1, 3));
    let c = b.int32(20, loc(1, 6));
    let d = b.int32(30, loc(1, 9));
    let e1 = b.int32(10, loc(1, 16));
    let e2 = b.int32(10, loc(1, 19));
    let inner1 = b.op(Op::Plus, vec![e1, e2], loc(1, 14));
    let inner1_meta = inner1.meta();
    let f1 = b.int32(20, loc(1, 26));
    let f2 = b.int32(-20, loc(1, 29));
    let inner2 = b.op(Op::Plus, vec![f1, f2], loc(1, 24));
    let product = b.op(Op::Asterisk, vec![inner1, inner2], loc(1, 12));
    let product_meta = product.meta();
    let diff = b.op(Op::Minus, vec![a, c, d, product], loc(1, 0));
    let diff_meta = diff.meta();
    b.push_root(diff);
    let mut ast = b.finish();

    let mut ctx = ctx();
    let outcome = resolve(&mut ctx, &mut ast).unwrap();
    assert!(outcome.fully_resolved);
    assert_eq!(ast.meta.resolved_type(diff_meta), Some(TypeId::I32));
    assert_eq!(ast.meta.resolved_type(product_meta), Some(TypeId::I32));
    assert_eq!(ast.meta.resolved_type(inner1_meta), Some(TypeId::I32));
}

#[test]
fn then_else_predicate_types() {
    // `((> 10 4) -> 420 : (* 6 9))`
    let mut b = Ast::builder();
    let ten = b.int32(10, loc(1, 4));
    let four = b.int32(4, loc(1, 7));
    let cond = b.op(Op::Greater, vec![ten, four], loc(1, 1));
    let cond_meta = cond.meta();
    let then = b.int32(420, loc(1, 13));
    let six = b.int32(6, loc(1, 22));
    let nine = b.int32(9, loc(1, 24));
    let otherwise = b.op(Op::Asterisk, vec![six, nine], loc(1, 20));
    let pred = b.then_else(cond, then, otherwise, loc(1, 0));
    let pred_meta = pred.meta();
    b.push_root(pred);
    let mut ast = b.finish();

    let mut ctx = ctx();
    let outcome = resolve(&mut ctx, &mut ast).unwrap();
    assert!(outcome.fully_resolved);
    assert_eq!(ast.meta.resolved_type(cond_meta), Some(TypeId::BOOL));
    assert_eq!(ast.meta.resolved_type(pred_meta), Some(TypeId::I32));
}

#[test]
fn annotated_lambda_gets_a_function_type_and_private_scope() {
    // `(=> : I32 |x: I32, y: I32| ((> x y) -> 1 : 0))`
    let mut b = Ast::builder();
    let px = b.param("x", LangType::I32, Modifiers::empty(), loc(1, 11));
    let py = b.param("y", LangType::I32, Modifiers::empty(), loc(1, 19));
    let x = b.identifier("x", loc(1, 30));
    let y = b.identifier("y", loc(1, 32));
    let cond = b.op(Op::Greater, vec![x, y], loc(1, 28));
    let one = b.int32(1, loc(1, 38));
    let zero = b.int32(0, loc(1, 42));
    let body = b.then_else(cond, one, zero, loc(1, 27));
    let lam = b.lambda(vec![px, py], Some(LangType::I32), body, false, loc(1, 0));
    let lam_meta = lam.meta();
    b.push_root(lam);
    let mut ast = b.finish();

    let mut ctx = ctx();
    let outcome = resolve(&mut ctx, &mut ast).unwrap();
    assert!(outcome.fully_resolved);

    let expected = ctx
        .types
        .resolve_id(&LangType::function(vec![LangType::I32, LangType::I32], LangType::I32))
        .unwrap();
    assert_eq!(ast.meta.resolved_type(lam_meta), Some(expected));

    // The parameters live only inside the lambda's scope.
    assert!(ctx.table.lookup(ctx.main, &[ScopeId::GLOBAL], "x").is_none());
    assert!(ctx.table.lookup(ctx.main, &[ScopeId::GLOBAL], "y").is_none());
}

#[test]
fn narrowing_initializer_is_a_type_mismatch() {
    // `let x : I32 = 2.0`
    let mut b = Ast::builder();
    let v = b.float64(2.0, loc(1, 13));
    let stmt = b.let_stmt("x", Modifiers::empty(), Some(LangType::I32), v, loc(1, 0));
    b.push_root(stmt);
    let mut ast = b.finish();

    let mut ctx = ctx();
    let err = resolve(&mut ctx, &mut ast).unwrap_err();
    assert_eq!(err.code(), diagnostic_codes::TYPE_MISMATCH);
    assert_eq!(err.to_string(), "Type mismatch: expected 'I32', found 'F64'");
}

/// `let x : Fn<I32;I32> = (=> |y: I32| { let x = 10  x := (+ x 10)  (* x y 10 30) })`
fn mutable_block_scenario(inner_modifiers: Modifiers) -> Ast {
    let mut b = Ast::builder();
    let ten = b.int32(10, loc(1, 40));
    let let_inner = b.let_stmt("x", inner_modifiers, Some(LangType::I32), ten, loc(1, 32));
    let x1 = b.identifier("x", loc(1, 44));
    let x2 = b.identifier("x", loc(1, 50));
    let amount = b.int32(10, loc(1, 52));
    let sum = b.op(Op::Plus, vec![x2, amount], loc(1, 48));
    let reassign = b.op(Op::ReAssign, vec![x1, sum], loc(1, 44));
    let x3 = b.identifier("x", loc(1, 60));
    let y = b.identifier("y", loc(1, 62));
    let ten2 = b.int32(10, loc(1, 64));
    let thirty = b.int32(30, loc(1, 67));
    let product = b.op(Op::Asterisk, vec![x3, y, ten2, thirty], loc(1, 58));
    let body = b.block(
        vec![let_inner.into(), reassign.into(), product.into()],
        loc(1, 30),
    );
    let py = b.param("y", LangType::I32, Modifiers::empty(), loc(1, 25));
    let lam = b.lambda(vec![py], None, body, false, loc(1, 22));
    let stmt = b.let_stmt(
        "x",
        Modifiers::empty(),
        Some(LangType::function(vec![LangType::I32], LangType::I32)),
        lam,
        loc(1, 0),
    );
    b.push_root(stmt);
    b.finish()
}

#[test]
fn mutable_inner_binding_allows_reassignment() {
    let mut ast = mutable_block_scenario(Modifiers::MUTABLE);
    let mut ctx = ctx();
    let outcome = resolve(&mut ctx, &mut ast).unwrap();
    assert!(outcome.fully_resolved);

    let sym = ctx.table.lookup(ctx.main, &[ScopeId::GLOBAL], "x").unwrap();
    let expected = ctx
        .types
        .resolve_id(&LangType::function(vec![LangType::I32], LangType::I32))
        .unwrap();
    match &ctx.table.data(sym).unwrap().type_ref {
        rbc_ast::TypeRef::Resolved(id) => assert_eq!(*id, expected),
        other => panic!("expected a finalized type, got {other:?}"),
    }
}

#[test]
fn immutable_inner_binding_rejects_reassignment() {
    let mut ast = mutable_block_scenario(Modifiers::empty());
    let mut ctx = ctx();
    let err = resolve(&mut ctx, &mut ast).unwrap_err();
    assert_eq!(err.code(), diagnostic_codes::INVALID_OPERATION);
}

#[test]
fn forward_reference_settles_on_a_later_attempt() {
    // `let a = b` before `let b = (+ 1 2)`
    let mut b = Ast::builder();
    let use_b = b.identifier("b", loc(1, 8));
    let let_a = b.let_stmt("a", Modifiers::empty(), None, use_b, loc(1, 0));
    let one = b.int32(1, loc(2, 11));
    let two = b.int32(2, loc(2, 13));
    let sum = b.op(Op::Plus, vec![one, two], loc(2, 8));
    let let_b = b.let_stmt("b", Modifiers::empty(), None, sum, loc(2, 0));
    b.push_root(let_a);
    b.push_root(let_b);
    let mut ast = b.finish();

    let mut ctx = ctx();
    let outcome = resolve(&mut ctx, &mut ast).unwrap();
    assert!(outcome.fully_resolved);
    assert!(outcome.stats.attempts >= 2);

    let a = ctx.table.lookup(ctx.main, &[ScopeId::GLOBAL], "a").unwrap();
    match &ctx.table.data(a).unwrap().type_ref {
        rbc_ast::TypeRef::Resolved(id) => assert_eq!(*id, TypeId::I32),
        other => panic!("expected a finalized type, got {other:?}"),
    }
}

#[test]
fn missing_symbol_is_partial_not_an_error() {
    let mut b = Ast::builder();
    let use_y = b.identifier("y", loc(1, 8));
    let stmt = b.let_stmt("x", Modifiers::empty(), None, use_y, loc(1, 0));
    b.push_root(stmt);
    let mut ast = b.finish();

    let mut ctx = ctx();
    let outcome = resolve(&mut ctx, &mut ast).unwrap();
    assert!(!outcome.fully_resolved);
    assert!(outcome.stats.pending > 0);
}

#[test]
fn strict_mode_reports_the_missing_symbol() {
    let mut b = Ast::builder();
    let use_y = b.identifier("y", loc(3, 8));
    b.push_root(use_y);
    let mut ast = b.finish();

    let mut ctx = ctx();
    let err = Resolver::new(ResolverOptions {
        strict: true,
        ..ResolverOptions::default()
    })
    .resolve_unit(&mut ctx.table, &mut ctx.types, &ctx.tree, ctx.main, &mut ast)
    .unwrap_err();
    assert_eq!(err.code(), diagnostic_codes::UNRESOLVED_SYMBOL);
    assert_eq!(err.loc(), loc(3, 8));
    assert_eq!(err.to_string(), "Cannot resolve symbol 'y'");
}

#[test]
fn empty_list_adopts_the_declared_array_type() {
    // `let xs : Array<I64> = []`
    let mut b = Ast::builder();
    let empty = b.array(vec![], loc(1, 22));
    let empty_meta = empty.meta();
    let stmt = b.let_stmt(
        "xs",
        Modifiers::empty(),
        Some(LangType::array(LangType::I64)),
        empty,
        loc(1, 0),
    );
    b.push_root(stmt);
    let mut ast = b.finish();

    let mut ctx = ctx();
    let outcome = resolve(&mut ctx, &mut ast).unwrap();
    assert!(outcome.fully_resolved);

    let declared = ctx.types.resolve_id(&LangType::array(LangType::I64)).unwrap();
    assert_eq!(ast.meta.resolved_type(empty_meta), Some(declared));
    assert_eq!(
        ast.meta.get(empty_meta).conversion(),
        Some(Conversion::Composite(declared))
    );
}

#[test]
fn empty_list_without_context_stays_partial() {
    // `let xs = []`
    let mut b = Ast::builder();
    let empty = b.array(vec![], loc(1, 9));
    let stmt = b.let_stmt("xs", Modifiers::empty(), None, empty, loc(1, 0));
    b.push_root(stmt);
    let mut ast = b.finish();

    let mut ctx = ctx();
    let outcome = resolve(&mut ctx, &mut ast).unwrap();
    assert!(!outcome.fully_resolved);
}

#[test]
fn resolving_twice_is_idempotent() {
    let mut b = Ast::builder();
    let v = b.int32(42, loc(1, 13));
    let v_meta = v.meta();
    let stmt = b.let_stmt("x", Modifiers::empty(), Some(LangType::I64), v, loc(1, 0));
    b.push_root(stmt);
    let mut ast = b.finish();

    let mut ctx = ctx();
    resolve(&mut ctx, &mut ast).unwrap();
    let first_type = ast.meta.resolved_type(v_meta);
    let first_conversion = ast.meta.get(v_meta).conversion();
    let first_symbols = ctx.table.len();

    let outcome = resolve(&mut ctx, &mut ast).unwrap();
    assert!(outcome.fully_resolved);
    assert_eq!(ast.meta.resolved_type(v_meta), first_type);
    assert_eq!(ast.meta.get(v_meta).conversion(), first_conversion);
    assert_eq!(ctx.table.len(), first_symbols);
}

#[test]
fn resolved_ids_round_trip_through_the_type_table() {
    // Building, resolving, and re-reading through the table gives back
    // the structural types the source wrote.
    let mut b = Ast::builder();
    let v = b.int32(42, loc(1, 13));
    let stmt = b.let_stmt("x", Modifiers::empty(), Some(LangType::I64), v, loc(1, 0));
    b.push_root(stmt);
    let list_a = b.int32(1, loc(2, 6));
    let list_b = b.int32(2, loc(2, 8));
    let list = b.op(Op::List, vec![list_a, list_b], loc(2, 0));
    let list_meta = list.meta();
    b.push_root(list);
    let mut ast = b.finish();

    let mut ctx = ctx();
    assert!(resolve(&mut ctx, &mut ast).unwrap().fully_resolved);

    let sym = ctx.table.lookup(ctx.main, &[ScopeId::GLOBAL], "x").unwrap();
    let rbc_ast::TypeRef::Resolved(sym_ty) = ctx.table.data(sym).unwrap().type_ref else {
        panic!("expected a finalized type");
    };
    assert_eq!(ctx.types.lang_type(sym_ty), Some(&LangType::I64));

    let list_ty = ast.meta.resolved_type(list_meta).unwrap();
    assert_eq!(
        ctx.types.lang_type(list_ty),
        Some(&LangType::array(LangType::I32))
    );
}

#[test]
fn assign_statement_requires_a_mutable_target() {
    // `let x = 1` then `x := 2` as a statement
    let build = |modifiers: Modifiers| {
        let mut b = Ast::builder();
        let one = b.int32(1, loc(1, 8));
        let let_x = b.let_stmt("x", modifiers, None, one, loc(1, 0));
        let two = b.int32(2, loc(2, 5));
        let assign = b.assign_stmt("x", two, loc(2, 0));
        b.push_root(let_x);
        b.push_root(assign);
        b.finish()
    };

    let mut ctx1 = ctx();
    let mut ok_ast = build(Modifiers::MUTABLE);
    assert!(resolve(&mut ctx1, &mut ok_ast).unwrap().fully_resolved);

    let mut ctx2 = ctx();
    let mut bad_ast = build(Modifiers::empty());
    let err = resolve(&mut ctx2, &mut bad_ast).unwrap_err();
    assert_eq!(err.code(), diagnostic_codes::INVALID_ASSIGNMENT);
    assert_eq!(err.to_string(), "Invalid assignment: Symbol is not mutable");
}

#[test]
fn const_bindings_are_never_reassignable() {
    let mut b = Ast::builder();
    let one = b.int32(1, loc(1, 8));
    let let_x = b.let_stmt("x", Modifiers::MUTABLE | Modifiers::CONST, None, one, loc(1, 0));
    let two = b.int32(2, loc(2, 5));
    let assign = b.assign_stmt("x", two, loc(2, 0));
    b.push_root(let_x);
    b.push_root(assign);
    let mut ast = b.finish();

    let mut ctx = ctx();
    let err = resolve(&mut ctx, &mut ast).unwrap_err();
    assert_eq!(err.code(), diagnostic_codes::INVALID_ASSIGNMENT);
}
