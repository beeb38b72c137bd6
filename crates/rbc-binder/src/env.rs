//! Per-namespace resolution context.

use rbc_ast::SymbolId;
use rbc_common::CompileError;
use smallvec::{SmallVec, smallvec};
use tracing::trace;

use crate::namespace::NamespaceId;
use crate::symbol::{NsScope, ScopeId};
use crate::table::SymbolTable;

/// Scope bookkeeping for one namespace during a resolver pass.
///
/// The stack tracks the active lexical chain; the counter assigns scope
/// ids monotonically. Both passes call `reset` before walking, so a
/// scope opened at the same traversal point gets the same id in Pass 1
/// and Pass 2 — that determinism is what lets Pass 2 find what Pass 1
/// defined without any per-node scope annotations.
#[derive(Clone, Debug)]
pub struct ModuleEnv {
    ns: NamespaceId,
    scope_stack: SmallVec<[ScopeId; 8]>,
    next_scope: u32,
}

impl ModuleEnv {
    #[must_use]
    pub fn new(ns: NamespaceId) -> Self {
        Self {
            ns,
            scope_stack: smallvec![ScopeId::GLOBAL],
            next_scope: 0,
        }
    }

    #[must_use]
    pub const fn ns(&self) -> NamespaceId {
        self.ns
    }

    /// Restore the global chain and zero the counter. Called at the
    /// start of every pass.
    pub fn reset(&mut self) {
        self.scope_stack.clear();
        self.scope_stack.push(ScopeId::GLOBAL);
        self.next_scope = 0;
    }

    /// Open a new lexical scope and make it current.
    pub fn enter_scope(&mut self) -> ScopeId {
        self.next_scope += 1;
        let id = ScopeId(self.next_scope);
        self.scope_stack.push(id);
        trace!(ns = self.ns.0, scope = id.0, "enter scope");
        id
    }

    /// Close the current scope. Popping the namespace-global scope is an
    /// internal-invariant error.
    pub fn exit_scope(&mut self) -> Result<ScopeId, CompileError> {
        if self.scope_stack.len() <= 1 {
            return Err(CompileError::internal("attempted to pop the global scope"));
        }
        let id = self
            .scope_stack
            .pop()
            .unwrap_or_else(|| unreachable!("stack length checked above"));
        trace!(ns = self.ns.0, scope = id.0, "exit scope");
        Ok(id)
    }

    /// The innermost active scope.
    #[must_use]
    pub fn current_scope(&self) -> ScopeId {
        *self
            .scope_stack
            .last()
            .unwrap_or_else(|| unreachable!("global scope is never popped"))
    }

    #[must_use]
    pub fn current_ns_scope(&self) -> NsScope {
        NsScope::new(self.ns, self.current_scope())
    }

    /// Active chain depth (1 = only the global scope).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.scope_stack.len()
    }

    /// Declare `data` in the current scope of this namespace.
    pub fn define(
        &self,
        table: &mut SymbolTable,
        mut data: crate::symbol::SymbolData,
    ) -> Result<SymbolId, CompileError> {
        data.ns_scope = self.current_ns_scope();
        table.define(data)
    }

    /// Chained lookup across the active scope stack, innermost first.
    #[must_use]
    pub fn lookup(&self, table: &SymbolTable, name: &str) -> Option<SymbolId> {
        table.lookup(self.ns, self.scope_stack.iter().rev(), name)
    }

    /// Qualified lookup into another namespace's global scope.
    #[must_use]
    pub fn lookup_global(
        &self,
        table: &SymbolTable,
        ns: NamespaceId,
        name: &str,
    ) -> Option<SymbolId> {
        table.lookup_in(NsScope::global(ns), name)
    }
}

#[cfg(test)]
#[path = "../tests/env_tests.rs"]
mod tests;
