//! Common types and utilities for the rbc Rebec compiler.
//!
//! This crate provides foundational types used across all rbc crates:
//! - Source locations (`SourceLoc`)
//! - The compile error taxonomy (`CompileError` and friends)
//! - Rendered diagnostics (`Diagnostic`, `diagnostic_codes`)
//! - Compiler limits and thresholds

// Source location tracking (line/column)
pub mod loc;
pub use loc::{LineMap, SourceLoc};

// Error taxonomy and rendered diagnostics
pub mod diagnostics;
pub use diagnostics::{
    CompileError, Diagnostic, DiagnosticCategory, NamespaceError, NamespaceErrorKind,
    ResolutionError, ResolutionErrorKind, diagnostic_codes, format_message,
};

// Centralized limits and thresholds
pub mod limits;
