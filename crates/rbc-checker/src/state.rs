//! Pass 2 state and dispatch.

use rbc_ast::{Ast, Expr, MetaArena, MetaId, Node, Stmt};
use rbc_binder::{ModuleEnv, NamespaceTree, SymbolTable};
use rbc_common::{CompileError, SourceLoc, limits};
use rbc_solver::{LangType, TypeId, TypeTable};
use tracing::{Level, span};

/// The outcome of typing one node during an attempt.
///
/// `Unresolved` carries the best structural guess (possibly just
/// `Undefined`); the node is left pending and retried next attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum Ty {
    Known(TypeId),
    Unresolved(LangType),
}

impl Ty {
    #[must_use]
    pub const fn known(&self) -> Option<TypeId> {
        match self {
            Ty::Known(id) => Some(*id),
            Ty::Unresolved(_) => None,
        }
    }

    pub(crate) const PENDING: Ty = Ty::Unresolved(LangType::Undefined);
}

/// Pass 2 driver for one namespace attempt.
///
/// Walks each unit in the same order and with the same scope discipline
/// as `DeclarePass`, so `ModuleEnv` renumbering lands every lookup in
/// the scope Pass 1 declared into.
pub struct CheckPass<'a> {
    pub(crate) table: &'a mut SymbolTable,
    pub(crate) types: &'a mut TypeTable,
    pub(crate) tree: &'a NamespaceTree,
    pub(crate) env: &'a mut ModuleEnv,
    /// Nodes left unresolved this attempt.
    pending: u32,
    /// First missing symbol seen, for strict-mode reporting.
    first_unresolved: Option<(String, SourceLoc)>,
    depth: u32,
}

impl<'a> CheckPass<'a> {
    pub fn new(
        table: &'a mut SymbolTable,
        types: &'a mut TypeTable,
        tree: &'a NamespaceTree,
        env: &'a mut ModuleEnv,
    ) -> Self {
        Self {
            table,
            types,
            tree,
            env,
            pending: 0,
            first_unresolved: None,
            depth: 0,
        }
    }

    /// Nodes that stayed unresolved across the units checked so far.
    #[must_use]
    pub const fn pending(&self) -> u32 {
        self.pending
    }

    /// First missing symbol seen, if any.
    #[must_use]
    pub fn first_unresolved(&self) -> Option<&(String, SourceLoc)> {
        self.first_unresolved.as_ref()
    }

    /// Resolve references and types across one unit's roots.
    pub fn check_unit(&mut self, ast: &mut Ast) -> Result<(), CompileError> {
        let _span = span!(Level::DEBUG, "check_unit", ns = self.env.ns().0).entered();
        let Ast { roots, meta } = ast;
        for node in roots.iter() {
            self.check_node(node, meta)?;
        }
        Ok(())
    }

    pub(crate) fn check_node(
        &mut self,
        node: &Node,
        meta: &mut MetaArena,
    ) -> Result<Ty, CompileError> {
        match node {
            Node::Expr(expr) => self.check_expr(expr, meta),
            Node::Stmt(Stmt::Let(stmt)) => self.check_let(stmt, meta),
            Node::Stmt(Stmt::Assign(stmt)) => self.check_assign(stmt, meta),
        }
    }

    pub(crate) fn check_expr(
        &mut self,
        expr: &Expr,
        meta: &mut MetaArena,
    ) -> Result<Ty, CompileError> {
        self.depth += 1;
        if self.depth > limits::MAX_EXPR_CHECK_DEPTH {
            self.depth -= 1;
            return Err(CompileError::internal("expression nesting exceeds the check depth limit"));
        }
        let result = match expr {
            Expr::V(value) => self.check_value(value, meta),
            Expr::O(op) => self.check_op(op, meta),
            Expr::S(call) => self.check_sexpr(call, meta),
            Expr::M(chain) => self.check_member(chain, meta),
            Expr::B(block) => self.check_block(block, meta),
            Expr::P(pred) => self.check_predicate(pred, meta),
            Expr::L(lambda) => self.check_lambda(lambda, meta),
        };
        self.depth -= 1;
        result
    }

    // =========================================================================
    // Recording helpers
    // =========================================================================

    /// Write the attempt's verdict for a node into its metadata slot.
    ///
    /// A slot resolved by an earlier attempt (for example an empty list
    /// adopted by a declared `Array<T>`) wins over a recomputed
    /// unresolved guess, which keeps re-checking idempotent.
    pub(crate) fn record(
        &mut self,
        id: MetaId,
        ty: Ty,
        meta: &mut MetaArena,
    ) -> Result<Ty, CompileError> {
        match ty {
            Ty::Known(type_id) => {
                meta.resolve_type(id, type_id)?;
                Ok(Ty::Known(type_id))
            }
            Ty::Unresolved(lang) => {
                if let Some(existing) = meta.resolved_type(id) {
                    return Ok(Ty::Known(existing));
                }
                meta.note_unresolved_type(id, lang.clone())?;
                self.pending += 1;
                Ok(Ty::Unresolved(lang))
            }
        }
    }

    /// Note a missing symbol: pending, not an error — the multi-attempt
    /// loop retries, and strict mode surfaces the first one at the end.
    pub(crate) fn record_missing_symbol(&mut self, name: &str, loc: SourceLoc) {
        if self.first_unresolved.is_none() {
            self.first_unresolved = Some((name.to_string(), loc));
        }
    }

    /// A node counted pending earlier in this attempt was settled after
    /// all (deferred adoption by a declared type).
    pub(crate) fn settle_pending(&mut self) {
        self.pending = self.pending.saturating_sub(1);
    }

    /// Display form of a type the table knows.
    pub(crate) fn display_type(&self, ty: &Ty) -> String {
        match ty {
            Ty::Known(id) => self
                .types
                .lang_type(*id)
                .map_or_else(|| "<unknown>".to_string(), ToString::to_string),
            Ty::Unresolved(lang) => lang.to_string(),
        }
    }
}
