//! A single execution slot owned by a manager.
//!
//! Each worker runs one dedicated OS thread for its whole lifetime. The thread
//! sleeps on the worker's own condition variable until it is assigned an item
//! or told to die, runs the item to completion, and reports the outcome.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex};
use tokio::runtime::Runtime;
use tracing::{debug, warn};

use crate::core::executor::{execute, execution_runtime};
use crate::core::{AssignError, DispatchError, WorkError, WorkItem};

/// Receiver of worker outcomes, implemented by the owning manager.
///
/// Called from the worker's thread with none of the worker's locks held.
pub trait WorkReport: Send + Sync {
    /// The item finished successfully.
    fn work_done(&self, item: WorkItem, slot: usize);
    /// The item did not finish; `error` is `None` when it never ran.
    fn work_not_done(&self, item: WorkItem, slot: usize, error: Option<WorkError>);
}

struct WorkerState {
    /// Outstanding assignment; cleared before the outcome is reported.
    assigned: Option<WorkItem>,
    kill: bool,
}

struct WorkerShared {
    state: Mutex<WorkerState>,
    signal: Condvar,
}

/// Execution slot running at most one item at a time.
pub struct Worker {
    label: String,
    shared: Arc<WorkerShared>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Worker {
    /// Start a worker thread for slot `slot` of manager `manager_id`.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::Runtime` if the execution runtime cannot be
    /// built, or `DispatchError::Spawn` if the OS refuses the thread.
    pub fn spawn(
        manager_id: usize,
        slot: usize,
        reporter: Arc<dyn WorkReport>,
        stack_size: usize,
    ) -> Result<Self, DispatchError> {
        let label = format!("Worker[{manager_id},{slot}]");
        let runtime = execution_runtime()?;
        let shared = Arc::new(WorkerShared {
            state: Mutex::new(WorkerState {
                assigned: None,
                kill: false,
            }),
            signal: Condvar::new(),
        });

        let name = format!("jp-worker-{manager_id}-{slot}");
        let thread_shared = Arc::clone(&shared);
        let thread_label = label.clone();
        let handle = thread::Builder::new()
            .name(name.clone())
            .stack_size(stack_size)
            .spawn(move || run(slot, &thread_label, &thread_shared, reporter.as_ref(), &runtime))
            .map_err(|source| DispatchError::Spawn { name, source })?;

        Ok(Self {
            label,
            shared,
            handle: Mutex::new(Some(handle)),
        })
    }

    /// `Worker[manager,slot]` label used in logs and errors.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Hand an item to this worker.
    ///
    /// # Errors
    ///
    /// Rejects the item if one is already outstanding or the worker was
    /// killed. Either indicates a bug in the caller's slot accounting.
    pub fn assign(&self, item: WorkItem) -> Result<(), AssignError> {
        let mut state = self.shared.state.lock();
        if state.kill {
            return Err(AssignError::Killed {
                worker: self.label.clone(),
            });
        }
        if state.assigned.is_some() {
            return Err(AssignError::Busy {
                worker: self.label.clone(),
            });
        }

        debug!(worker = %self.label, work_id = item.id(), "assigning work");
        state.assigned = Some(item);
        self.shared.signal.notify_one();
        Ok(())
    }

    /// Ask the worker to exit once idle. Never interrupts a running item.
    pub fn kill(&self) {
        let mut state = self.shared.state.lock();
        state.kill = true;
        self.shared.signal.notify_one();
    }

    /// Whether an assignment is outstanding.
    pub fn is_busy(&self) -> bool {
        self.shared.state.lock().assigned.is_some()
    }

    /// Wait for the worker thread to exit. Only returns after `kill`.
    pub fn join(&self) {
        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!(worker = %self.label, "worker thread panicked");
            }
        }
    }
}

fn run(
    slot: usize,
    label: &str,
    shared: &WorkerShared,
    reporter: &dyn WorkReport,
    runtime: &Runtime,
) {
    debug!(worker = %label, "worker thread started");
    loop {
        let item = {
            let mut state = shared.state.lock();
            loop {
                if state.kill {
                    // an assignment that raced the kill has not run; hand it back
                    let lingering = state.assigned.take();
                    drop(state);
                    if let Some(item) = lingering {
                        reporter.work_not_done(item, slot, None);
                    }
                    debug!(worker = %label, "worker killed");
                    return;
                }
                if let Some(item) = state.assigned.as_ref() {
                    break item.clone();
                }
                shared.signal.wait(&mut state);
            }
        };

        debug!(worker = %label, work_id = item.id(), "doing work");
        let outcome = execute(runtime, &item);

        // clear first so the manager never frees a slot this worker still holds
        shared.state.lock().assigned = None;

        match outcome {
            Ok(()) => {
                debug!(worker = %label, work_id = item.id(), "completed work");
                reporter.work_done(item, slot);
            }
            Err(error) => {
                debug!(worker = %label, work_id = item.id(), %error, "failed to complete work");
                reporter.work_not_done(item, slot, Some(error));
            }
        }
    }
}
