//! AST data model and per-node resolution metadata for the rbc compiler.
//!
//! This crate provides:
//! - The node sum types (`Node`, `Expr`, `Stmt`) the parser collaborator emits
//! - Value literals, built-in operations, and declaration modifiers
//! - `MetaArena` - the mutable side-channel holding each node's source
//!   location, resolved type, symbol link, and conversion annotation
//! - `AstBuilder` - the arena-construction API a parser targets
//!
//! Nodes are shape-immutable; every node carries a `MetaId` index into
//! its unit's `MetaArena`, and the arena slots are the only mutation
//! points during resolution.

pub mod builder;
pub mod meta;
pub mod modifier;
pub mod node;
pub mod op;
pub mod value;

pub use builder::{Ast, AstBuilder};
pub use meta::{Conversion, MetaArena, MetaData, MetaId, SymbolId, TypeRef};
pub use modifier::Modifiers;
pub use node::{
    Accessor, AssignStmt, Block, Expr, Lambda, LetStmt, MemberChain, Node, OpExpr, Parameter,
    Predicate, PredicateForm, PredicateKind, SExpr, Stmt, ValueExpr,
};
pub use op::{Op, OpCategory};
pub use value::Value;
