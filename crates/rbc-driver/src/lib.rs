//! Compilation driver for the rbc compiler.
//!
//! This crate provides:
//! - `Unit` and its stage machine
//!   (`Init -> Read -> Lexed -> Parsed -> PartiallyResolved -> FullyResolved`)
//! - `Environment` - the namespace tree, symbol table, type table, and
//!   units, populated from a root directory scan
//! - `UnitTransform` / `Pipeline` - composition of per-unit phases
//!   (read, then the external lex and parse collaborators) with the
//!   terminal resolve phase
//!
//! Per-unit phases run in parallel across independent files and are
//! joined before resolution, which mutates shared structures and runs
//! one namespace at a time.

pub mod environment;
pub mod pipeline;
pub mod unit;

pub use environment::Environment;
pub use pipeline::{Pipeline, PipelineError, PipelineReport, ReadSource, UnitTransform, compile_root};
pub use unit::{Unit, UnitStage};
