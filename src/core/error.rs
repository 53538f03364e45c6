//! Error types for dispatch operations.

use thiserror::Error;

use crate::core::work::WorkId;

/// Errors produced while building or driving a publisher.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Manager/worker counts or bounds are unusable.
    #[error("invalid configuration: {0}")]
    Configuration(String),
    /// Work was submitted after `shutdown()`.
    #[error("publisher has been shut down")]
    Shutdown,
    /// An OS thread could not be started.
    #[error("failed to spawn thread `{name}`: {source}")]
    Spawn {
        /// Name the thread would have carried.
        name: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },
    /// A worker's single-threaded runtime could not be built.
    #[error("failed to build worker runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Contract violations signalled by `Worker::assign`.
///
/// These indicate a bug in the caller, not a runtime condition to retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignError {
    /// The worker still holds an outstanding item.
    #[error("{worker} assigned work before previous work completed")]
    Busy {
        /// Label of the worker, `Worker[manager,slot]`.
        worker: String,
    },
    /// The worker was told to die.
    #[error("{worker} instructed to die while being assigned new work")]
    Killed {
        /// Label of the worker, `Worker[manager,slot]`.
        worker: String,
    },
}

/// Failure raised by a work action.
///
/// Caught at the worker boundary and carried as data to the publisher, which
/// always schedules the item for retry.
#[derive(Debug, Error)]
pub enum WorkError {
    /// The action reported a failure.
    #[error("{0}")]
    Failed(String),
    /// The action panicked; the payload message is preserved when it is a string.
    #[error("work panicked: {0}")]
    Panicked(String),
    /// Any other error surfaced by the action.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Accounting desyncs. Always recovered locally and logged, never returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// A completion or failure was reported for an item missing from the active store.
    #[error("{report} reported for Work[{id}] not found in active store")]
    UnknownActiveWork {
        /// Identifier of the reported item.
        id: WorkId,
        /// Which report found it missing.
        report: &'static str,
    },
    /// The busy counter claimed a free slot but the slot scan found none.
    #[error("Manager[{manager}] busy count {busy} out of sync with slot table")]
    SlotDesync {
        /// Manager whose accounting disagreed.
        manager: usize,
        /// Busy counter at the time of the scan.
        busy: usize,
    },
    /// A worker freed a slot that was not marked busy.
    #[error("Worker[{manager},{slot}] freed while not busy")]
    SlotNotBusy {
        /// Owning manager.
        manager: usize,
        /// Slot index reported by the worker.
        slot: usize,
    },
    /// A worker refused an assignment its slot said it could take.
    #[error("Work[{id}] rejected by worker: {reason}")]
    AssignRejected {
        /// Identifier of the rejected item.
        id: WorkId,
        /// Reason given by the worker.
        reason: AssignError,
    },
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
