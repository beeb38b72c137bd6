//! AST construction.
//!
//! `AstBuilder` is the seam a parser collaborator targets: every node
//! constructor allocates the node's metadata slot and returns the typed
//! node. Tests build their scenario trees through the same API.

use crate::meta::{MetaArena, MetaId};
use crate::modifier::Modifiers;
use crate::node::{
    Accessor, AssignStmt, Block, Expr, Lambda, LetStmt, MemberChain, Node, OpExpr, Parameter,
    Predicate, PredicateForm, SExpr, Stmt, ValueExpr,
};
use crate::op::Op;
use crate::value::Value;
use rbc_common::SourceLoc;
use rbc_solver::LangType;

/// One unit's parsed tree plus its metadata arena.
#[derive(Clone, Debug, Default)]
pub struct Ast {
    pub roots: Vec<Node>,
    pub meta: MetaArena,
}

impl Ast {
    #[must_use]
    pub fn builder() -> AstBuilder {
        AstBuilder::new()
    }
}

/// Incremental `Ast` constructor.
#[derive(Debug, Default)]
pub struct AstBuilder {
    meta: MetaArena,
    roots: Vec<Node>,
}

impl AstBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            meta: MetaArena::new(),
            roots: Vec::new(),
        }
    }

    fn alloc(&mut self, loc: SourceLoc) -> MetaId {
        self.meta.alloc(loc)
    }

    // =========================================================================
    // Literals
    // =========================================================================

    pub fn value(&mut self, value: Value, loc: SourceLoc) -> Expr {
        let meta = self.alloc(loc);
        Expr::V(ValueExpr { meta, value })
    }

    pub fn int32(&mut self, v: i32, loc: SourceLoc) -> Expr {
        self.value(Value::I32(v), loc)
    }

    pub fn int64(&mut self, v: i64, loc: SourceLoc) -> Expr {
        self.value(Value::I64(v), loc)
    }

    pub fn float32(&mut self, v: f32, loc: SourceLoc) -> Expr {
        self.value(Value::F32(v), loc)
    }

    pub fn float64(&mut self, v: f64, loc: SourceLoc) -> Expr {
        self.value(Value::F64(v), loc)
    }

    pub fn boolean(&mut self, v: bool, loc: SourceLoc) -> Expr {
        self.value(Value::Bool(v), loc)
    }

    pub fn string(&mut self, v: impl Into<String>, loc: SourceLoc) -> Expr {
        self.value(Value::Str(v.into()), loc)
    }

    pub fn nil(&mut self, loc: SourceLoc) -> Expr {
        self.value(Value::Nil, loc)
    }

    pub fn identifier(&mut self, name: impl Into<String>, loc: SourceLoc) -> Expr {
        self.value(Value::Identifier(name.into()), loc)
    }

    pub fn array(&mut self, elems: Vec<Expr>, loc: SourceLoc) -> Expr {
        self.value(Value::Array(elems), loc)
    }

    pub fn tuple(&mut self, elems: Vec<Expr>, loc: SourceLoc) -> Expr {
        self.value(Value::Tuple(elems), loc)
    }

    pub fn quote(&mut self, node: Node, loc: SourceLoc) -> Expr {
        self.value(Value::Quote(Box::new(node)), loc)
    }

    // =========================================================================
    // Compound expressions
    // =========================================================================

    pub fn op(&mut self, op: Op, operands: Vec<Expr>, loc: SourceLoc) -> Expr {
        let meta = self.alloc(loc);
        Expr::O(OpExpr { meta, op, operands })
    }

    pub fn sexpr(&mut self, callee: Expr, operands: Vec<Expr>, loc: SourceLoc) -> Expr {
        let meta = self.alloc(loc);
        Expr::S(SExpr {
            meta,
            callee: Box::new(callee),
            operands,
        })
    }

    pub fn block(&mut self, items: Vec<Node>, loc: SourceLoc) -> Expr {
        let meta = self.alloc(loc);
        Expr::B(Block { meta, items })
    }

    pub fn member(&mut self, accessors: Vec<Accessor>, loc: SourceLoc) -> Expr {
        let meta = self.alloc(loc);
        Expr::M(MemberChain { meta, accessors })
    }

    /// `(<cond> -> <then> : <else>)`
    pub fn then_else(&mut self, cond: Expr, then: Expr, otherwise: Expr, loc: SourceLoc) -> Expr {
        let meta = self.alloc(loc);
        Expr::P(Predicate {
            meta,
            condition: Box::new(cond),
            form: PredicateForm {
                then_branch: Some(Box::new(then)),
                else_branch: Some(Box::new(otherwise)),
            },
        })
    }

    /// `(<cond> -> <then>)`
    pub fn match_form(&mut self, cond: Expr, then: Expr, loc: SourceLoc) -> Expr {
        let meta = self.alloc(loc);
        Expr::P(Predicate {
            meta,
            condition: Box::new(cond),
            form: PredicateForm {
                then_branch: Some(Box::new(then)),
                else_branch: None,
            },
        })
    }

    /// `(<cond> : <else>)`
    pub fn coalesce(&mut self, cond: Expr, otherwise: Expr, loc: SourceLoc) -> Expr {
        let meta = self.alloc(loc);
        Expr::P(Predicate {
            meta,
            condition: Box::new(cond),
            form: PredicateForm {
                then_branch: None,
                else_branch: Some(Box::new(otherwise)),
            },
        })
    }

    pub fn lambda(
        &mut self,
        params: Vec<Parameter>,
        ret: Option<LangType>,
        body: Expr,
        is_form: bool,
        loc: SourceLoc,
    ) -> Expr {
        let meta = self.alloc(loc);
        Expr::L(Lambda {
            meta,
            params,
            ret,
            body: Box::new(body),
            is_form,
        })
    }

    #[must_use]
    pub fn param(
        &self,
        name: impl Into<String>,
        ty: LangType,
        modifiers: Modifiers,
        loc: SourceLoc,
    ) -> Parameter {
        Parameter {
            modifiers,
            name: name.into(),
            ty,
            loc,
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    pub fn let_stmt(
        &mut self,
        name: impl Into<String>,
        modifiers: Modifiers,
        declared_ty: Option<LangType>,
        value: Expr,
        loc: SourceLoc,
    ) -> Stmt {
        let meta = self.alloc(loc);
        Stmt::Let(LetStmt {
            meta,
            name: name.into(),
            modifiers,
            declared_ty,
            value: Box::new(value),
        })
    }

    pub fn assign_stmt(&mut self, target: impl Into<String>, value: Expr, loc: SourceLoc) -> Stmt {
        let meta = self.alloc(loc);
        Stmt::Assign(AssignStmt {
            meta,
            target: target.into(),
            value: Box::new(value),
        })
    }

    // =========================================================================
    // Roots
    // =========================================================================

    pub fn push_root(&mut self, node: impl Into<Node>) {
        self.roots.push(node.into());
    }

    #[must_use]
    pub fn finish(self) -> Ast {
        Ast {
            roots: self.roots,
            meta: self.meta,
        }
    }
}

#[cfg(test)]
#[path = "../tests/builder_tests.rs"]
mod tests;
