//! Centralized limits and thresholds for the compiler core.
//!
//! Shared constants for recursion depths and iteration budgets used
//! throughout the codebase. Centralizing them prevents duplicate
//! definitions with inconsistent values and documents the rationale for
//! each limit.

/// Maximum depth for expression type checking.
///
/// Prevents stack overflow when the checker recursively resolves the
/// type of deeply nested expressions (nested s-expression calls,
/// operation operands, predicate branches). At 500 levels the checker
/// bails out with an internal error rather than overflowing.
pub const MAX_EXPR_CHECK_DEPTH: u32 = 500;

/// Maximum number of scopes walked during a single lexical lookup.
///
/// A lookup walks the scope chain innermost to outermost; the chain is
/// bounded by lexical nesting, so hitting this cap indicates a corrupted
/// scope stack rather than real code.
pub const MAX_SCOPE_WALK_ITERATIONS: usize = 10_000;

/// Default attempt budget for the multi-attempt resolver.
///
/// Each attempt re-runs Pass 1 and Pass 2 over a namespace; forward
/// references across top-level `let` chains settle in two or three
/// attempts in practice. The loop also exits as soon as an attempt makes
/// no progress, so the budget is a backstop, not a tuning knob.
pub const DEFAULT_MAX_RESOLVE_ATTEMPTS: u32 = 4;

/// Maximum number of accessors in a member/namespace chain.
///
/// Chains come from source text, so this is far above anything a real
/// program produces; it bounds work if a parser collaborator misbehaves.
pub const MAX_ACCESS_CHAIN_LEN: usize = 256;
