//! Symbol tables, namespace tree, and the declaration pass for the rbc
//! compiler.
//!
//! This crate provides:
//! - `SymbolTable` / `SymbolArena` - declaration storage keyed by
//!   `(namespace, scope, identifier)` with monotonic stub collapse
//! - `NamespaceTree` - the dotted-path namespace hierarchy
//! - `ModuleEnv` - per-namespace scope stack with deterministic
//!   renumbering across passes
//! - `DeclarePass` - Pass 1 of the resolver: introduces symbols in
//!   lexical scopes, with eager types where the initializer makes them
//!   obvious

pub mod declare;
pub mod env;
pub mod namespace;
pub mod symbol;
pub mod table;

pub use declare::DeclarePass;
pub use env::ModuleEnv;
pub use namespace::{NamespaceId, NamespaceNode, NamespaceTree};
pub use symbol::{NsScope, ScopeId, SymbolArena, SymbolData, SymbolEntry, SymbolKind, SymbolRef};
pub use table::{SymbolTable, ValidationError};

// The symbol id lives with the AST metadata so reference sites can link
// to declarations without a crate cycle; re-exported here as the arena's
// index type.
pub use rbc_ast::SymbolId;
