//! The multi-attempt resolver.
//!
//! Each attempt runs Pass 1 (declarations) and Pass 2 (references and
//! types) over every unit of a namespace, with the scope counter reset
//! so numbering is identical across passes and attempts. Forward
//! references across top-level `let` chains settle over successive
//! attempts; the loop stops as soon as an attempt resolves nothing new.

use rbc_ast::Ast;
use rbc_binder::{DeclarePass, ModuleEnv, NamespaceId, NamespaceTree, SymbolTable};
use rbc_common::{CompileError, SourceLoc, limits};
use rbc_solver::TypeTable;
use tracing::{Level, debug, span};

use crate::state::CheckPass;

/// Tuning for a resolve run.
#[derive(Clone, Copy, Debug)]
pub struct ResolverOptions {
    /// Upper bound on Pass 1 + Pass 2 repetitions per namespace.
    pub max_attempts: u32,
    /// Report a partial result as an `UnresolvedSymbol` error instead of
    /// returning `fully_resolved = false`.
    pub strict: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            max_attempts: limits::DEFAULT_MAX_RESOLVE_ATTEMPTS,
            strict: false,
        }
    }
}

/// Counters reported by a resolve run.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResolutionStats {
    /// Attempts actually executed.
    pub attempts: u32,
    /// Nodes still unresolved after the final attempt.
    pub pending: u32,
    /// Symbols in the table after the run.
    pub symbols: usize,
}

/// What a resolve run produced.
#[derive(Clone, Copy, Debug)]
pub struct ResolveOutcome {
    pub fully_resolved: bool,
    pub stats: ResolutionStats,
}

/// Drives resolution for one namespace at a time.
#[derive(Clone, Copy, Debug, Default)]
pub struct Resolver {
    options: ResolverOptions,
}

impl Resolver {
    #[must_use]
    pub fn new(options: ResolverOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub const fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Resolve every unit of `ns`. Units must be supplied in a
    /// deterministic order — scope ids are namespace-wide, so the order
    /// is part of the numbering.
    pub fn resolve_namespace(
        &self,
        table: &mut SymbolTable,
        types: &mut TypeTable,
        tree: &NamespaceTree,
        ns: NamespaceId,
        asts: &mut [&mut Ast],
    ) -> Result<ResolveOutcome, CompileError> {
        let _span = span!(Level::DEBUG, "resolve_namespace", ns = ns.0).entered();
        let mut env = ModuleEnv::new(ns);
        let mut stats = ResolutionStats::default();
        let mut fully_resolved = false;
        let mut prev_pending = u32::MAX;
        let mut first_unresolved = None;

        for attempt in 1..=self.options.max_attempts.max(1) {
            stats.attempts = attempt;

            env.reset();
            let mut declare = DeclarePass::new(table, types, &mut env);
            for ast in asts.iter() {
                declare.declare_unit(ast)?;
            }

            env.reset();
            let mut check = CheckPass::new(table, types, tree, &mut env);
            for ast in asts.iter_mut() {
                check.check_unit(ast)?;
            }
            let pending = check.pending();
            first_unresolved = check.first_unresolved().cloned();

            debug!(attempt, pending, "resolve attempt finished");
            stats.pending = pending;
            if pending == 0 {
                fully_resolved = true;
                break;
            }
            if pending >= prev_pending {
                // No progress; more attempts cannot help.
                break;
            }
            prev_pending = pending;
        }

        stats.symbols = table.len();
        if !fully_resolved && self.options.strict {
            return Err(match first_unresolved {
                Some((name, loc)) => CompileError::unresolved_symbol(name, loc),
                None => CompileError::invalid_symbol(
                    format!("resolution incomplete: {} nodes unresolved", stats.pending),
                    SourceLoc::NONE,
                ),
            });
        }
        Ok(ResolveOutcome {
            fully_resolved,
            stats,
        })
    }

    /// Convenience for a single already-parsed unit.
    pub fn resolve_unit(
        &self,
        table: &mut SymbolTable,
        types: &mut TypeTable,
        tree: &NamespaceTree,
        ns: NamespaceId,
        ast: &mut Ast,
    ) -> Result<ResolveOutcome, CompileError> {
        self.resolve_namespace(table, types, tree, ns, &mut [ast])
    }
}
