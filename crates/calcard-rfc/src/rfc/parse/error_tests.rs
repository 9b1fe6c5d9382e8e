//! Tests for format errors.

use super::*;

#[test]
fn test_format_error_new() {
    let error = FormatError::new(FormatErrorKind::MissingColon, 10, 5);
    assert_eq!(error.kind, FormatErrorKind::MissingColon);
    assert_eq!(error.line, 10);
    assert_eq!(error.column, 5);
    assert!(error.context.is_none());
}

#[test]
fn test_format_error_with_context() {
    let error = FormatError::new(FormatErrorKind::MismatchedComponent, 3, 1)
        .with_context("expected END:VEVENT, found END:VCARD");

    assert_eq!(error.kind, FormatErrorKind::MismatchedComponent);
    assert_eq!(
        error.context.as_deref(),
        Some("expected END:VEVENT, found END:VCARD")
    );
}

#[test]
fn test_format_error_display() {
    let error = FormatError::new(FormatErrorKind::MissingColon, 1, 10);
    let display = format!("{error}");
    assert!(display.contains("missing colon separator"));
    assert!(display.contains("line 1"));
    assert!(display.contains("column 10"));
}

#[test]
fn test_format_error_display_with_context() {
    let error = FormatError::new(FormatErrorKind::InvalidParameter, 5, 15)
        .with_context("NAME=VALUE expected");
    let display = format!("{error}");
    assert!(display.contains("invalid parameter format"));
    assert!(display.contains("line 5"));
    assert!(display.contains("NAME=VALUE expected"));
}

#[test]
fn test_structural_kinds_display() {
    let kinds = [
        (FormatErrorKind::EmptyDocument, "document contains no component"),
        (FormatErrorKind::UnmatchedEnd, "END without matching BEGIN"),
        (FormatErrorKind::MismatchedComponent, "mismatched BEGIN/END"),
        (FormatErrorKind::UnterminatedComponent, "component was never closed"),
        (
            FormatErrorKind::LineOutsideComponent,
            "content line outside any component",
        ),
    ];

    for (kind, expected) in kinds {
        assert_eq!(kind.to_string(), expected);
    }
}
