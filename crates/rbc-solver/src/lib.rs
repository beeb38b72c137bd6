//! Type table and widening rules for the rbc compiler.
//!
//! This crate provides:
//! - `LangType` - the structural type language (primitives, composites,
//!   user types)
//! - `TypeTable` - interning of `LangType` values to stable `TypeId`s,
//!   recursive resolution of composites, and compatibility/widening
//!   queries
//!
//! The table is append-only: entries are created on first encounter and
//! never mutated or destroyed, so ids are stable for the process
//! lifetime.

pub mod table;
pub mod types;

pub use table::{Compatibility, TypeEntry, TypeId, TypeTable, WideningConversion};
pub use types::{CompositeType, LangType, Primitive, TypeFlags};
