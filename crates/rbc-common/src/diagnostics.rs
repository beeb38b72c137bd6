//! Error taxonomy and rendered diagnostics.
//!
//! Resolver operations return `Result<T, CompileError>`; the first error
//! in a traversal short-circuits the containing node. Errors are values,
//! never unwinding panics, across the public surface — panics are
//! reserved for internal-invariant violations.
//!
//! `Diagnostic` is the rendered, serializable form the driver hands to
//! its callers; `diagnostic_codes` assigns each error kind a stable
//! numeric code.

use crate::loc::SourceLoc;
use serde::Serialize;

// =============================================================================
// Diagnostic Types
// =============================================================================

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Warning = 0,
    Error = 1,
    Message = 2,
}

/// A rendered diagnostic message.
#[derive(Clone, Debug, Serialize)]
pub struct Diagnostic {
    pub file: String,
    pub line: i32,
    pub column: i32,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    #[must_use]
    pub const fn error(file: String, loc: SourceLoc, message: String, code: u32) -> Self {
        Self {
            file,
            line: loc.line,
            column: loc.column,
            message_text: message,
            category: DiagnosticCategory::Error,
            code,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{} - error RB{}: {}",
            self.file, self.line, self.column, self.code, self.message_text
        )
    }
}

/// Format a diagnostic message by replacing {0}, {1}, etc. with arguments.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

/// Stable numeric codes for every error kind.
pub mod diagnostic_codes {
    pub const PARSE_ERROR: u32 = 1001;

    pub const UNRESOLVED_SYMBOL: u32 = 2001;
    pub const DUPLICATE_SYMBOL: u32 = 2002;
    pub const TYPE_MISMATCH: u32 = 2003;
    pub const INVALID_ASSIGNMENT: u32 = 2004;
    pub const INVALID_OPERATION: u32 = 2005;
    pub const INVALID_PARAMETER: u32 = 2006;
    pub const INVALID_SYMBOL: u32 = 2007;

    pub const INVALID_PATH: u32 = 3001;
    pub const PATH_NOT_FOUND: u32 = 3002;
    pub const CIRCULAR_REFERENCE: u32 = 3003;

    pub const INTERNAL: u32 = 9001;
}

// =============================================================================
// Resolution Errors
// =============================================================================

/// Positively wrong conditions found while resolving names and types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolutionErrorKind {
    UnresolvedSymbol { name: String },
    DuplicateSymbol { name: String },
    TypeMismatch { expected: String, actual: String },
    InvalidAssignment { reason: String },
    InvalidOperation { op: String, reason: String },
    InvalidParameter { reason: String },
    InvalidSymbol { reason: String },
}

impl ResolutionErrorKind {
    #[must_use]
    pub const fn code(&self) -> u32 {
        match self {
            Self::UnresolvedSymbol { .. } => diagnostic_codes::UNRESOLVED_SYMBOL,
            Self::DuplicateSymbol { .. } => diagnostic_codes::DUPLICATE_SYMBOL,
            Self::TypeMismatch { .. } => diagnostic_codes::TYPE_MISMATCH,
            Self::InvalidAssignment { .. } => diagnostic_codes::INVALID_ASSIGNMENT,
            Self::InvalidOperation { .. } => diagnostic_codes::INVALID_OPERATION,
            Self::InvalidParameter { .. } => diagnostic_codes::INVALID_PARAMETER,
            Self::InvalidSymbol { .. } => diagnostic_codes::INVALID_SYMBOL,
        }
    }
}

impl std::fmt::Display for ResolutionErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnresolvedSymbol { name } => {
                write!(f, "{}", format_message("Cannot resolve symbol '{0}'", &[name]))
            }
            Self::DuplicateSymbol { name } => {
                write!(f, "{}", format_message("Duplicate symbol '{0}'", &[name]))
            }
            Self::TypeMismatch { expected, actual } => write!(
                f,
                "{}",
                format_message("Type mismatch: expected '{0}', found '{1}'", &[expected, actual])
            ),
            Self::InvalidAssignment { reason } => {
                write!(f, "{}", format_message("Invalid assignment: {0}", &[reason]))
            }
            Self::InvalidOperation { op, reason } => {
                write!(f, "{}", format_message("Invalid operation '{0}': {1}", &[op, reason]))
            }
            Self::InvalidParameter { reason } => {
                write!(f, "{}", format_message("Invalid parameter: {0}", &[reason]))
            }
            Self::InvalidSymbol { reason } => {
                write!(f, "{}", format_message("Invalid symbol: {0}", &[reason]))
            }
        }
    }
}

/// A resolution error with its source position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolutionError {
    pub kind: ResolutionErrorKind,
    pub loc: SourceLoc,
}

// =============================================================================
// Namespace Errors
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NamespaceErrorKind {
    InvalidPath,
    PathNotFound,
    CircularReference,
}

impl NamespaceErrorKind {
    #[must_use]
    pub const fn code(&self) -> u32 {
        match self {
            Self::InvalidPath => diagnostic_codes::INVALID_PATH,
            Self::PathNotFound => diagnostic_codes::PATH_NOT_FOUND,
            Self::CircularReference => diagnostic_codes::CIRCULAR_REFERENCE,
        }
    }
}

/// A namespace-tree error carrying the offending dotted path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamespaceError {
    pub kind: NamespaceErrorKind,
    pub path: String,
    pub loc: SourceLoc,
}

impl std::fmt::Display for NamespaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            NamespaceErrorKind::InvalidPath => {
                write!(f, "{}", format_message("Invalid namespace path '{0}'", &[&self.path]))
            }
            NamespaceErrorKind::PathNotFound => {
                write!(f, "{}", format_message("Namespace path '{0}' not found", &[&self.path]))
            }
            NamespaceErrorKind::CircularReference => write!(
                f,
                "{}",
                format_message("Circular reference through namespace '{0}'", &[&self.path])
            ),
        }
    }
}

// =============================================================================
// CompileError
// =============================================================================

/// The error sum every core operation propagates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompileError {
    /// Surfaced unchanged from the parser collaborator.
    Parse { message: String, loc: SourceLoc },
    Resolution(ResolutionError),
    Namespace(NamespaceError),
    /// Invariant violation inside the core. Location is always `-1:-1`.
    Internal { message: String },
}

impl CompileError {
    #[must_use]
    pub fn unresolved_symbol(name: impl Into<String>, loc: SourceLoc) -> Self {
        Self::Resolution(ResolutionError {
            kind: ResolutionErrorKind::UnresolvedSymbol { name: name.into() },
            loc,
        })
    }

    #[must_use]
    pub fn duplicate_symbol(name: impl Into<String>, loc: SourceLoc) -> Self {
        Self::Resolution(ResolutionError {
            kind: ResolutionErrorKind::DuplicateSymbol { name: name.into() },
            loc,
        })
    }

    #[must_use]
    pub fn type_mismatch(
        expected: impl Into<String>,
        actual: impl Into<String>,
        loc: SourceLoc,
    ) -> Self {
        Self::Resolution(ResolutionError {
            kind: ResolutionErrorKind::TypeMismatch {
                expected: expected.into(),
                actual: actual.into(),
            },
            loc,
        })
    }

    #[must_use]
    pub fn invalid_assignment(reason: impl Into<String>, loc: SourceLoc) -> Self {
        Self::Resolution(ResolutionError {
            kind: ResolutionErrorKind::InvalidAssignment { reason: reason.into() },
            loc,
        })
    }

    #[must_use]
    pub fn invalid_operation(op: impl Into<String>, reason: impl Into<String>, loc: SourceLoc) -> Self {
        Self::Resolution(ResolutionError {
            kind: ResolutionErrorKind::InvalidOperation {
                op: op.into(),
                reason: reason.into(),
            },
            loc,
        })
    }

    #[must_use]
    pub fn invalid_parameter(reason: impl Into<String>, loc: SourceLoc) -> Self {
        Self::Resolution(ResolutionError {
            kind: ResolutionErrorKind::InvalidParameter { reason: reason.into() },
            loc,
        })
    }

    #[must_use]
    pub fn invalid_symbol(reason: impl Into<String>, loc: SourceLoc) -> Self {
        Self::Resolution(ResolutionError {
            kind: ResolutionErrorKind::InvalidSymbol { reason: reason.into() },
            loc,
        })
    }

    #[must_use]
    pub fn namespace(kind: NamespaceErrorKind, path: impl Into<String>, loc: SourceLoc) -> Self {
        Self::Namespace(NamespaceError {
            kind,
            path: path.into(),
            loc,
        })
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// The source position, or `SourceLoc::NONE` for internal errors.
    #[must_use]
    pub const fn loc(&self) -> SourceLoc {
        match self {
            Self::Parse { loc, .. } => *loc,
            Self::Resolution(err) => err.loc,
            Self::Namespace(err) => err.loc,
            Self::Internal { .. } => SourceLoc::NONE,
        }
    }

    /// Stable numeric code for this error.
    #[must_use]
    pub const fn code(&self) -> u32 {
        match self {
            Self::Parse { .. } => diagnostic_codes::PARSE_ERROR,
            Self::Resolution(err) => err.kind.code(),
            Self::Namespace(err) => err.kind.code(),
            Self::Internal { .. } => diagnostic_codes::INTERNAL,
        }
    }

    /// Render into a `Diagnostic` attributed to `file`.
    #[must_use]
    pub fn to_diagnostic(&self, file: impl Into<String>) -> Diagnostic {
        Diagnostic::error(file.into(), self.loc(), self.to_string(), self.code())
    }
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse { message, .. } => write!(f, "{message}"),
            Self::Resolution(err) => write!(f, "{}", err.kind),
            Self::Namespace(err) => write!(f, "{err}"),
            Self::Internal { message } => write!(f, "internal error: {message}"),
        }
    }
}

impl std::error::Error for CompileError {}

#[cfg(test)]
#[path = "../tests/diagnostics_tests.rs"]
mod tests;
