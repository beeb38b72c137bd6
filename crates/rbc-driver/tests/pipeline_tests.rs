//! Environment scanning and pipeline composition.

use rbc_ast::{Ast, Modifiers, TypeRef};
use rbc_binder::{NsScope, ScopeId};
use rbc_checker::ResolverOptions;
use rbc_common::{CompileError, SourceLoc, diagnostic_codes};
use rbc_driver::{Environment, Pipeline, ReadSource, Unit, UnitStage, UnitTransform};
use rbc_solver::TypeId;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// External lexer stand-in: the core only cares about the stage.
struct StubLex;

impl UnitTransform for StubLex {
    fn name(&self) -> &'static str {
        "lex"
    }

    fn input_stage(&self) -> UnitStage {
        UnitStage::Read
    }

    fn output_stage(&self) -> UnitStage {
        UnitStage::Lexed
    }

    fn apply(&self, _unit: &mut Unit) -> Result<(), CompileError> {
        Ok(())
    }
}

/// External parser stand-in: every file becomes
/// `let <stem> = 42` (public).
struct StubParse;

fn stem_of(unit: &Unit) -> String {
    unit.path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unit")
        .to_string()
}

impl UnitTransform for StubParse {
    fn name(&self) -> &'static str {
        "parse"
    }

    fn input_stage(&self) -> UnitStage {
        UnitStage::Lexed
    }

    fn output_stage(&self) -> UnitStage {
        UnitStage::Parsed
    }

    fn apply(&self, unit: &mut Unit) -> Result<(), CompileError> {
        let mut b = Ast::builder();
        let v = b.int32(42, SourceLoc::new(1, 8));
        let stmt = b.let_stmt(stem_of(unit), Modifiers::PUBLIC, None, v, SourceLoc::new(1, 0));
        b.push_root(stmt);
        unit.ast = Some(b.finish());
        Ok(())
    }
}

fn write(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, text).unwrap();
}

fn sample_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "app.rbc", "let app = 42\n");
    write(dir.path(), "util/math.rbc", "let math = 42\n");
    write(dir.path(), "util/deep/helpers.rbc", "let helpers = 42\n");
    write(dir.path(), "README.md", "not a source file\n");
    dir
}

#[test]
fn scanning_builds_the_namespace_tree() {
    let dir = sample_project();
    let env = Environment::from_root(dir.path()).unwrap();

    assert!(env.tree.resolve_path("main").is_some());
    let util = env.tree.resolve_path("util").unwrap();
    let deep = env.tree.resolve_path("util.deep").unwrap();
    assert_eq!(env.tree.node(deep).unwrap().parent, Some(util));

    // Three source files; the README is skipped.
    assert_eq!(env.units().len(), 3);
    let main = env.tree.resolve_path("main").unwrap();
    let by_ns: Vec<_> = env.units().iter().map(|u| u.ns).collect();
    assert!(by_ns.contains(&main));
    assert!(by_ns.contains(&util));
    assert!(by_ns.contains(&deep));
    assert!(env.units().iter().all(|u| u.stage() == UnitStage::Init));
}

#[test]
fn full_pipeline_resolves_every_unit() {
    let dir = sample_project();
    let mut env = Environment::from_root(dir.path()).unwrap();

    let pipeline = Pipeline::new()
        .then(ReadSource)
        .then(StubLex)
        .then(StubParse)
        .then_resolve(ResolverOptions::default());
    let report = pipeline.run(&mut env).unwrap();

    assert!(report.fully_resolved);
    assert_eq!(report.outcomes.len(), 3);
    assert!(
        env.units()
            .iter()
            .all(|u| u.stage() == UnitStage::FullyResolved)
    );
    assert!(env.units().iter().all(|u| u.source.is_some()));

    // Each unit declared its stem in its namespace's global scope.
    let util = env.tree.resolve_path("util").unwrap();
    let sym = env
        .symbols
        .lookup_in(NsScope::new(util, ScopeId::GLOBAL), "math")
        .expect("math declared in util");
    match &env.symbols.data(sym).unwrap().type_ref {
        TypeRef::Resolved(id) => assert_eq!(*id, TypeId::I32),
        other => panic!("expected a finalized type, got {other:?}"),
    }
}

#[test]
fn units_of_one_namespace_see_each_other() {
    // Two files in the same namespace: `b.rbc` reads a binding that
    // `a.rbc` declares. Scope-0 visibility is the union of the
    // namespace's units.
    struct CrossRefParse;

    impl UnitTransform for CrossRefParse {
        fn name(&self) -> &'static str {
            "parse"
        }

        fn input_stage(&self) -> UnitStage {
            UnitStage::Read
        }

        fn output_stage(&self) -> UnitStage {
            UnitStage::Parsed
        }

        fn apply(&self, unit: &mut Unit) -> Result<(), CompileError> {
            let mut b = Ast::builder();
            if stem_of(unit) == "a" {
                let v = b.int32(42, SourceLoc::new(1, 8));
                let stmt = b.let_stmt("a", Modifiers::empty(), None, v, SourceLoc::new(1, 0));
                b.push_root(stmt);
            } else {
                let use_a = b.identifier("a", SourceLoc::new(1, 8));
                let stmt = b.let_stmt("b", Modifiers::empty(), None, use_a, SourceLoc::new(1, 0));
                b.push_root(stmt);
            }
            unit.ast = Some(b.finish());
            Ok(())
        }
    }

    let dir = TempDir::new().unwrap();
    write(dir.path(), "shared/a.rbc", "let a = 42\n");
    write(dir.path(), "shared/b.rbc", "let b = a\n");
    let mut env = Environment::from_root(dir.path()).unwrap();

    let pipeline = Pipeline::new()
        .then(ReadSource)
        .then(CrossRefParse)
        .then_resolve(ResolverOptions::default());
    let report = pipeline.run(&mut env).unwrap();
    assert!(report.fully_resolved);

    let shared = env.tree.resolve_path("shared").unwrap();
    let b_sym = env
        .symbols
        .lookup_in(NsScope::new(shared, ScopeId::GLOBAL), "b")
        .unwrap();
    match &env.symbols.data(b_sym).unwrap().type_ref {
        TypeRef::Resolved(id) => assert_eq!(*id, TypeId::I32),
        other => panic!("expected a finalized type, got {other:?}"),
    }
}

#[test]
fn in_memory_units_flow_through_the_pipeline() {
    // Embedders can attach units directly; a fused front-end transform
    // may jump Init -> Parsed in one step.
    struct FusedFrontend;

    impl UnitTransform for FusedFrontend {
        fn name(&self) -> &'static str {
            "frontend"
        }

        fn input_stage(&self) -> UnitStage {
            UnitStage::Init
        }

        fn output_stage(&self) -> UnitStage {
            UnitStage::Parsed
        }

        fn apply(&self, unit: &mut Unit) -> Result<(), CompileError> {
            let mut b = Ast::builder();
            let v = b.int32(7, SourceLoc::new(1, 8));
            let stmt = b.let_stmt(stem_of(unit), Modifiers::empty(), None, v, SourceLoc::new(1, 0));
            b.push_root(stmt);
            unit.ast = Some(b.finish());
            Ok(())
        }
    }

    let mut env = Environment::new();
    let main = env.tree.resolve_path("main").unwrap();
    // Added out of order; the environment keeps unit order deterministic.
    env.add_unit(Unit::new("b.rbc".into(), main));
    env.add_unit(Unit::new("a.rbc".into(), main));
    assert_eq!(env.units()[0].path, std::path::PathBuf::from("a.rbc"));

    let pipeline = Pipeline::new()
        .then(FusedFrontend)
        .then_resolve(ResolverOptions::default());
    let report = pipeline.run(&mut env).unwrap();
    assert!(report.fully_resolved);
    assert!(
        env.symbols
            .lookup_in(NsScope::new(main, ScopeId::GLOBAL), "a")
            .is_some()
    );
    assert!(
        env.symbols
            .lookup_in(NsScope::new(main, ScopeId::GLOBAL), "b")
            .is_some()
    );
}

#[test]
fn pipeline_fails_fast_with_unit_attribution() {
    struct FailOnMath;

    impl UnitTransform for FailOnMath {
        fn name(&self) -> &'static str {
            "lex"
        }

        fn input_stage(&self) -> UnitStage {
            UnitStage::Read
        }

        fn output_stage(&self) -> UnitStage {
            UnitStage::Lexed
        }

        fn apply(&self, unit: &mut Unit) -> Result<(), CompileError> {
            if stem_of(unit) == "math" {
                Err(CompileError::Parse {
                    message: "unexpected token '|'".to_string(),
                    loc: SourceLoc::new(3, 7),
                })
            } else {
                Ok(())
            }
        }
    }

    let dir = sample_project();
    let mut env = Environment::from_root(dir.path()).unwrap();
    let pipeline = Pipeline::new().then(ReadSource).then(FailOnMath);

    let err = pipeline.run(&mut env).unwrap_err();
    assert!(err.path.as_ref().unwrap().ends_with("util/math.rbc"));
    let diag = err.to_diagnostic();
    assert_eq!(diag.code, diagnostic_codes::PARSE_ERROR);
    assert_eq!(diag.line, 3);
    assert!(diag.file.ends_with("math.rbc"));
}

#[test]
fn transforms_assert_their_input_stage() {
    let dir = sample_project();
    let mut env = Environment::from_root(dir.path()).unwrap();

    let pipeline = Pipeline::new().then(ReadSource);
    pipeline.run(&mut env).unwrap();

    // Running the read phase again finds units already at READ.
    let err = pipeline.run(&mut env).unwrap_err();
    assert_eq!(err.to_diagnostic().code, diagnostic_codes::INTERNAL);
}
