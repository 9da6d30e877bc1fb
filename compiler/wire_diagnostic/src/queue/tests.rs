use super::*;
use crate::{ElementRef, ErrorCode};

fn demo() -> TypeName {
    TypeName::new("com.example", "DemoActivity")
}

fn field_error(field: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1001)
        .with_message(format!("bad field {field}"))
        .with_element(ElementRef::member(&demo(), field))
}

#[test]
fn test_error_marks_owner_failed() {
    let mut queue = DiagnosticQueue::new();
    let _ = queue.emit_error(field_error("title"));

    assert!(queue.is_type_failed(&demo()));
    assert!(!queue.is_type_failed(&TypeName::new("com.example", "Other")));
    assert!(queue.has_errors().is_some());
}

#[test]
fn test_notes_do_not_fail_types() {
    let mut queue = DiagnosticQueue::new();
    assert!(queue.add(
        Diagnostic::note(ErrorCode::E1007).with_element(ElementRef::member(&demo(), "x"))
    ));

    assert_eq!(queue.error_count(), 0);
    assert!(!queue.is_type_failed(&demo()));
    assert!(queue.has_errors().is_none());
}

#[test]
fn test_duplicates_dropped_but_counted() {
    let mut queue = DiagnosticQueue::new();
    assert!(queue.add(field_error("a")));
    assert!(!queue.add(field_error("a")));

    assert_eq!(queue.peek().count(), 1);
    assert_eq!(queue.error_count(), 2);
}

#[test]
fn test_unlimited_keeps_duplicates() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    queue.add(field_error("a"));
    queue.add(field_error("a"));
    assert_eq!(queue.peek().count(), 2);
}

#[test]
fn test_error_limit_still_fails_type() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig {
        error_limit: 1,
        deduplicate: false,
    });
    assert!(queue.add(field_error("a")));
    let other = Diagnostic::error(ErrorCode::E1001)
        .with_element(ElementRef::Type(TypeName::new("com.example", "Other")));
    assert!(!queue.add(other));

    assert!(queue.is_type_failed(&TypeName::new("com.example", "Other")));
    assert_eq!(queue.peek().count(), 1);
}

#[test]
fn test_flush_preserves_order_and_resets() {
    let mut queue = DiagnosticQueue::new();
    queue.add(field_error("b"));
    queue.add(field_error("a"));

    let flushed = queue.flush();
    assert_eq!(flushed[0].message, "bad field b");
    assert_eq!(flushed[1].message, "bad field a");
    assert_eq!(queue.error_count(), 0);
    assert!(!queue.is_type_failed(&demo()));
}
