//! Pass 1 — declaration and scoping skeleton.
//!
//! Walks a unit's roots, opening and closing lexical scopes exactly
//! where Pass 2 will, and introduces every `let` binding and lambda
//! parameter into the symbol table. Types are attached eagerly where the
//! initializer makes them obvious (literals, lambdas with fully declared
//! signatures); everything else is declared `Undefined` and finalized by
//! Pass 2.

use rbc_ast::{Ast, Expr, Lambda, LetStmt, Node, Stmt, TypeRef, Value};
use rbc_common::CompileError;
use rbc_solver::{LangType, TypeTable};
use tracing::{Level, debug, span};

use crate::env::ModuleEnv;
use crate::symbol::{SymbolData, SymbolKind};
use crate::table::SymbolTable;

/// Pass 1 driver for one namespace.
///
/// The caller resets the shared `ModuleEnv` once per pass and feeds the
/// namespace's units in a deterministic order, so scope ids are
/// namespace-wide and reproducible.
pub struct DeclarePass<'a> {
    table: &'a mut SymbolTable,
    types: &'a mut TypeTable,
    env: &'a mut ModuleEnv,
}

impl<'a> DeclarePass<'a> {
    pub fn new(
        table: &'a mut SymbolTable,
        types: &'a mut TypeTable,
        env: &'a mut ModuleEnv,
    ) -> Self {
        Self { table, types, env }
    }

    /// Declare every binding in one unit's roots.
    pub fn declare_unit(&mut self, ast: &Ast) -> Result<(), CompileError> {
        let _span = span!(Level::DEBUG, "declare_unit", ns = self.env.ns().0).entered();
        for node in &ast.roots {
            self.declare_node(node, ast)?;
        }
        Ok(())
    }

    fn declare_node(&mut self, node: &Node, ast: &Ast) -> Result<(), CompileError> {
        match node {
            Node::Stmt(Stmt::Let(stmt)) => self.declare_let(stmt, ast),
            Node::Stmt(Stmt::Assign(stmt)) => self.declare_expr(&stmt.value, ast),
            Node::Expr(expr) => self.declare_expr(expr, ast),
        }
    }

    fn declare_expr(&mut self, expr: &Expr, ast: &Ast) -> Result<(), CompileError> {
        match expr {
            Expr::S(call) => {
                self.declare_expr(&call.callee, ast)?;
                for operand in &call.operands {
                    self.declare_expr(operand, ast)?;
                }
                Ok(())
            }
            Expr::M(chain) => {
                for accessor in &chain.accessors {
                    if let rbc_ast::Accessor::Call { args, .. } = accessor {
                        for arg in args {
                            self.declare_expr(arg, ast)?;
                        }
                    }
                }
                Ok(())
            }
            Expr::O(op) => {
                for operand in &op.operands {
                    self.declare_expr(operand, ast)?;
                }
                Ok(())
            }
            Expr::B(block) => {
                self.env.enter_scope();
                for item in &block.items {
                    self.declare_node(item, ast)?;
                }
                self.env.exit_scope()?;
                Ok(())
            }
            Expr::V(value) => match &value.value {
                Value::Array(elems) | Value::Tuple(elems) => {
                    for elem in elems {
                        self.declare_expr(elem, ast)?;
                    }
                    Ok(())
                }
                // Quoted code is data; its interior is not resolved.
                _ => Ok(()),
            },
            Expr::P(pred) => {
                self.declare_expr(&pred.condition, ast)?;
                if let Some(then) = &pred.form.then_branch {
                    self.declare_expr(then, ast)?;
                }
                if let Some(otherwise) = &pred.form.else_branch {
                    self.declare_expr(otherwise, ast)?;
                }
                Ok(())
            }
            Expr::L(lambda) => self.declare_lambda(lambda, ast),
        }
    }

    fn declare_let(&mut self, stmt: &LetStmt, ast: &Ast) -> Result<(), CompileError> {
        // A declared type wins; otherwise infer eagerly from the
        // initializer where its type is obvious.
        let type_ref = match &stmt.declared_ty {
            Some(ty) => self.resolve_or_defer(ty),
            None => self.eager_type(&stmt.value),
        };
        let kind = if matches!(*stmt.value, Expr::L(_)) {
            SymbolKind::Function
        } else {
            SymbolKind::Field
        };

        let data = SymbolData {
            name: stmt.name.clone(),
            modifiers: stmt.modifiers,
            type_ref,
            kind,
            loc: ast.meta.loc(stmt.meta),
            ns_scope: self.env.current_ns_scope(),
        };
        let id = self.env.define(self.table, data)?;
        debug!(name = %stmt.name, id = id.0, "declared let binding");

        self.declare_expr(&stmt.value, ast)
    }

    fn declare_lambda(&mut self, lambda: &Lambda, ast: &Ast) -> Result<(), CompileError> {
        self.env.enter_scope();
        for param in &lambda.params {
            let data = SymbolData {
                name: param.name.clone(),
                modifiers: param.modifiers,
                type_ref: self.resolve_or_defer(&param.ty),
                kind: SymbolKind::Field,
                loc: param.loc,
                ns_scope: self.env.current_ns_scope(),
            };
            self.env.define(self.table, data)?;
        }
        self.declare_expr(&lambda.body, ast)?;
        self.env.exit_scope()?;
        Ok(())
    }

    /// Intern a written type now if every leaf is known, else carry it
    /// unresolved for Pass 2.
    fn resolve_or_defer(&mut self, ty: &LangType) -> TypeRef {
        match self.types.resolve_id(ty) {
            Some(id) => TypeRef::Resolved(id),
            None => TypeRef::Unresolved(ty.clone()),
        }
    }

    /// Eager Pass-1 inference: literals and fully-annotated lambdas.
    fn eager_type(&mut self, expr: &Expr) -> TypeRef {
        let ty = match expr {
            Expr::V(value) => match &value.value {
                Value::I32(_) => LangType::I32,
                Value::I64(_) => LangType::I64,
                Value::F32(_) => LangType::F32,
                Value::F64(_) => LangType::F64,
                Value::Bool(_) => LangType::BOOL,
                Value::Str(_) => LangType::STR,
                Value::Nil => LangType::NIL,
                Value::Quote(_) => LangType::QUOTE,
                _ => LangType::Undefined,
            },
            Expr::L(lambda) => {
                let fully_annotated = lambda.params.iter().all(|p| !p.ty.contains_undefined())
                    && lambda.ret.as_ref().is_some_and(|r| !r.contains_undefined());
                if fully_annotated {
                    let params = lambda.params.iter().map(|p| p.ty.clone()).collect();
                    let ret = lambda
                        .ret
                        .clone()
                        .unwrap_or_else(|| unreachable!("checked above"));
                    LangType::function(params, ret)
                } else {
                    LangType::Undefined
                }
            }
            _ => LangType::Undefined,
        };
        self.resolve_or_defer(&ty)
    }
}
