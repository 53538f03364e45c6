//! Work lifecycle journal.
//!
//! The publisher records every transition of a work item when a sink is
//! attached. Sinks are observability only; nothing reads them back to make
//! scheduling decisions.

use std::collections::VecDeque;
use std::fmt;

use parking_lot::Mutex;

use crate::core::work::WorkId;
use crate::util::clock::now_ms;

/// Lifecycle transition of a work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditAction {
    /// Entered the pending store from a submission.
    Submitted,
    /// Moved from pending to active on a manager's request.
    Dispatched,
    /// Finished successfully and left the active store.
    Completed,
    /// Failed and left the active store.
    Failed,
    /// Re-entered the pending store ahead of fresh arrivals.
    Retried,
    /// Reported but not found in the active store.
    Orphaned,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Submitted => "submitted",
            Self::Dispatched => "dispatched",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Retried => "retried",
            Self::Orphaned => "orphaned",
        };
        f.write_str(name)
    }
}

/// Audit event structure.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    /// Related work item.
    pub work_id: WorkId,
    /// Transition taken.
    pub action: AuditAction,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
    /// Additional context, e.g. the failure message.
    pub detail: Option<String>,
}

/// Audit sink abstraction.
pub trait AuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: AuditEvent);
}

/// In-memory audit sink for testing and dev.
pub struct InMemoryAuditSink {
    events: Mutex<VecDeque<AuditEvent>>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink with a bounded buffer.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::with_capacity(max_events.min(1024))),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().iter().cloned().collect()
    }

    /// Actions recorded for one work item, oldest first.
    pub fn history(&self, work_id: WorkId) -> Vec<AuditAction> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.work_id == work_id)
            .map(|e| e.action)
            .collect()
    }

    /// Number of retained events carrying `action`.
    pub fn count(&self, action: AuditAction) -> usize {
        self.events.lock().iter().filter(|e| e.action == action).count()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&self, event: AuditEvent) {
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(event);
    }
}

/// Helper to build an audit event stamped with the current time.
pub fn build_audit_event(
    work_id: WorkId,
    action: AuditAction,
    detail: Option<String>,
) -> AuditEvent {
    AuditEvent {
        work_id,
        action,
        created_at_ms: now_ms(),
        detail,
    }
}
