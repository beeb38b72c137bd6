use super::*;
use crate::loc::SourceLoc;

#[test]
fn format_message_replaces_placeholders() {
    assert_eq!(
        format_message("expected '{0}', found '{1}'", &["I32", "F64"]),
        "expected 'I32', found 'F64'"
    );
}

#[test]
fn resolution_error_carries_location_and_code() {
    let err = CompileError::type_mismatch("I32", "F64", SourceLoc::new(4, 8));
    assert_eq!(err.loc(), SourceLoc::new(4, 8));
    assert_eq!(err.code(), diagnostic_codes::TYPE_MISMATCH);
    assert_eq!(err.to_string(), "Type mismatch: expected 'I32', found 'F64'");
}

#[test]
fn internal_error_has_no_location() {
    let err = CompileError::internal("metadata re-resolved to a different type");
    assert_eq!(err.loc(), SourceLoc::NONE);
    assert_eq!(err.code(), diagnostic_codes::INTERNAL);
}

#[test]
fn invalid_operation_message_shape() {
    let err = CompileError::invalid_operation("assignment", "Symbol is not mutable", SourceLoc::new(2, 0));
    assert_eq!(
        err.to_string(),
        "Invalid operation 'assignment': Symbol is not mutable"
    );
}

#[test]
fn diagnostic_rendering() {
    let err = CompileError::unresolved_symbol("foo", SourceLoc::new(7, 2));
    let diag = err.to_diagnostic("main/app.rbc");
    assert_eq!(diag.line, 7);
    assert_eq!(diag.column, 2);
    assert_eq!(diag.code, diagnostic_codes::UNRESOLVED_SYMBOL);
    assert_eq!(diag.category, DiagnosticCategory::Error);
    assert_eq!(
        diag.to_string(),
        "main/app.rbc:7:2 - error RB2001: Cannot resolve symbol 'foo'"
    );
}

#[test]
fn namespace_error_display() {
    let err = CompileError::namespace(NamespaceErrorKind::PathNotFound, "a.b.c", SourceLoc::NONE);
    assert_eq!(err.to_string(), "Namespace path 'a.b.c' not found");
    assert_eq!(err.code(), diagnostic_codes::PATH_NOT_FOUND);
}
