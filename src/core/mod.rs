//! Core dispatch abstractions: work items, stores, workers, managers and the publisher.

pub mod audit;
pub mod error;
pub mod executor;
pub mod manager;
pub mod publisher;
pub mod store;
pub mod work;
pub mod worker;

pub use audit::{build_audit_event, AuditAction, AuditEvent, AuditSink, InMemoryAuditSink};
pub use error::{AppResult, AssignError, DispatchError, InvariantViolation, WorkError};
pub use manager::{spawn_manager, ExecutorPoolManager, Manager, SlotTableManager, WorkSource};
pub use publisher::{Publisher, PublisherStats};
pub use store::WorkStore;
pub use work::{FnAction, NewWork, SleepAction, WorkAction, WorkId, WorkItem};
pub use worker::{WorkReport, Worker};
