//! Tests for audit sink

use job_publisher::core::{AuditAction, AuditSink, InMemoryAuditSink, build_audit_event};

#[test]
fn test_in_memory_audit_sink() {
    let sink = InMemoryAuditSink::new(10);

    let event = build_audit_event(1, AuditAction::Failed, Some("disk full".to_string()));
    sink.record(event.clone());
    assert_eq!(sink.events().len(), 1);

    let events = sink.events();
    assert_eq!(events[0].work_id, 1);
    assert_eq!(events[0].action, AuditAction::Failed);
    assert_eq!(events[0].detail.as_deref(), Some("disk full"));
    assert!(events[0].created_at_ms > 0);
}

#[test]
fn test_audit_sink_overflow() {
    let sink = InMemoryAuditSink::new(2);

    sink.record(build_audit_event(1, AuditAction::Submitted, None));
    sink.record(build_audit_event(2, AuditAction::Submitted, None));
    sink.record(build_audit_event(3, AuditAction::Submitted, None));

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].work_id, 2); // First one popped
    assert_eq!(events[1].work_id, 3);
}

#[test]
fn test_audit_history_and_counts() {
    let sink = InMemoryAuditSink::new(16);
    for action in [AuditAction::Submitted, AuditAction::Dispatched, AuditAction::Failed, AuditAction::Retried] {
        sink.record(build_audit_event(5, action, None));
    }
    sink.record(build_audit_event(6, AuditAction::Submitted, None));

    assert_eq!(
        sink.history(5),
        vec![AuditAction::Submitted, AuditAction::Dispatched, AuditAction::Failed, AuditAction::Retried]
    );
    assert_eq!(sink.count(AuditAction::Submitted), 2);
    assert_eq!(sink.count(AuditAction::Orphaned), 0);
}

#[test]
fn test_audit_action_display() {
    assert_eq!(AuditAction::Dispatched.to_string(), "dispatched");
    assert_eq!(AuditAction::Orphaned.to_string(), "orphaned");
}
