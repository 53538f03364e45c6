//! Managers: match free execution capacity to pending work.
//!
//! A manager owns a fixed set of execution slots and one dispatch thread. The
//! thread repeatedly pulls work from its [`WorkSource`] while a slot is free,
//! then sleeps until new work is announced, a slot frees up after the manager
//! was full, or it is killed.
//!
//! Two realizations share the same loop and contract:
//!
//! - [`SlotTableManager`]: one [`Worker`](crate::core::Worker) per slot, busy
//!   flags scanned linearly.
//! - [`ExecutorPoolManager`]: a capacity-bounded pool of threads fed through a
//!   channel; only a counter of in-flight items is kept.
//!
//! # Locking
//!
//! The manager's slot accounting and wake flags sit behind one mutex that is
//! never held while calling into the work source or a worker.

mod pool;
mod slot_table;

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, error};

use crate::config::ManagerKind;
use crate::core::{DispatchError, InvariantViolation, WorkError, WorkItem, WorkReport};

pub use pool::ExecutorPoolManager;
pub use slot_table::SlotTableManager;

/// Where managers pull work from and report outcomes to.
///
/// Implemented by the publisher; each call is atomic with respect to the
/// stores involved.
pub trait WorkSource: Send + Sync {
    /// Move the next pending item to the active store and return it.
    fn fetch_work(&self) -> Option<WorkItem>;
    /// The item finished; drop it from the active store.
    fn complete_work(&self, item: WorkItem);
    /// The item did not finish; move it back to the pending store for retry.
    fn fail_work(&self, item: WorkItem, error: Option<WorkError>);
}

/// Publisher-facing contract shared by every manager realization.
pub trait Manager: Send + Sync {
    /// Manager identifier.
    fn id(&self) -> usize;
    /// Number of execution slots.
    fn worker_count(&self) -> usize;
    /// Slots currently occupied.
    fn busy_count(&self) -> usize;
    /// Announce that the pending store went from empty to non-empty.
    fn notify_work(&self);
    /// Stop dispatching and retire the slots once idle. Idempotent.
    fn kill(&self);
    /// Wait for the dispatch thread to exit.
    fn join(&self);
    /// Wait for every execution thread to finish its work and exit.
    fn join_workers(&self);
}

/// Start a manager of the configured kind.
///
/// # Errors
///
/// Fails if any of the manager's threads or runtimes cannot be created; no
/// thread started by this call is left running in that case.
pub fn spawn_manager(
    kind: ManagerKind,
    id: usize,
    worker_count: usize,
    source: Arc<dyn WorkSource>,
    stack_size: usize,
) -> Result<Arc<dyn Manager>, DispatchError> {
    let manager: Arc<dyn Manager> = match kind {
        ManagerKind::SlotTable => {
            Arc::new(SlotTableManager::spawn(id, worker_count, source, stack_size)?)
        }
        ManagerKind::ExecutorPool => {
            Arc::new(ExecutorPoolManager::spawn(id, worker_count, source, stack_size)?)
        }
    };
    Ok(manager)
}

/// Capacity bookkeeping behind a manager's lock.
pub(crate) trait SlotAccounting: Send + 'static {
    /// Total slots.
    fn capacity(&self) -> usize;
    /// Occupied slots.
    fn busy(&self) -> usize;
    /// Occupy a free slot and return its index.
    fn claim(&mut self) -> Option<usize>;
    /// Free `slot`. Returns `false` if it was not occupied.
    fn release(&mut self, slot: usize) -> bool;

    fn has_free(&self) -> bool {
        self.busy() < self.capacity()
    }
}

struct ManagerState<A> {
    accounting: A,
    wake: bool,
    kill: bool,
}

/// Slot accounting plus wake/kill flags, guarded by the manager's own lock.
pub(crate) struct ManagerMonitor<A> {
    id: usize,
    state: Mutex<ManagerState<A>>,
    wakeup: Condvar,
}

impl<A: SlotAccounting> ManagerMonitor<A> {
    pub(crate) fn new(id: usize, accounting: A) -> Self {
        Self {
            id,
            state: Mutex::new(ManagerState {
                accounting,
                wake: false,
                kill: false,
            }),
            wakeup: Condvar::new(),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.state.lock().accounting.capacity()
    }

    pub(crate) fn busy(&self) -> usize {
        self.state.lock().accounting.busy()
    }

    pub(crate) fn notify_work(&self) {
        let mut state = self.state.lock();
        state.wake = true;
        self.wakeup.notify_one();
    }

    pub(crate) fn kill(&self) {
        let mut state = self.state.lock();
        state.kill = true;
        self.wakeup.notify_one();
    }

    /// A slot is free and the manager is still alive.
    fn can_dispatch(&self) -> bool {
        let state = self.state.lock();
        !state.kill && state.accounting.has_free()
    }

    fn claim(&self) -> Result<usize, InvariantViolation> {
        let mut state = self.state.lock();
        let busy = state.accounting.busy();
        state.accounting.claim().ok_or(InvariantViolation::SlotDesync {
            manager: self.id,
            busy,
        })
    }

    /// Free a slot, waking the dispatch thread if the manager was full.
    pub(crate) fn release(&self, slot: usize) {
        let mut state = self.state.lock();
        let was_full = !state.accounting.has_free();
        if !state.accounting.release(slot) {
            drop(state);
            let violation = InvariantViolation::SlotNotBusy {
                manager: self.id,
                slot,
            };
            error!(manager = self.id, %violation, "invariant violation");
            return;
        }
        debug!(
            manager = self.id,
            slot,
            busy = state.accounting.busy(),
            capacity = state.accounting.capacity(),
            "slot freed"
        );
        if was_full {
            state.wake = true;
            self.wakeup.notify_one();
        }
    }

    /// Block until woken. Returns `false` once the manager has been killed.
    fn wait(&self) -> bool {
        let mut state = self.state.lock();
        while !state.wake && !state.kill {
            self.wakeup.wait(&mut state);
        }
        state.wake = false;
        !state.kill
    }
}

/// Routes a slot's outcome to the work source, then frees the slot.
pub(crate) struct ManagerReporter<A> {
    pub(crate) monitor: Arc<ManagerMonitor<A>>,
    pub(crate) source: Arc<dyn WorkSource>,
}

impl<A: SlotAccounting> WorkReport for ManagerReporter<A> {
    fn work_done(&self, item: WorkItem, slot: usize) {
        self.source.complete_work(item);
        self.monitor.release(slot);
    }

    fn work_not_done(&self, item: WorkItem, slot: usize, error: Option<WorkError>) {
        self.source.fail_work(item, error);
        self.monitor.release(slot);
    }
}

/// The dispatch thread body shared by every realization.
///
/// `hand_off` receives each fetched item together with the slot claimed for
/// it. Returns once the manager is killed.
pub(crate) fn dispatch_loop<A, F>(monitor: &ManagerMonitor<A>, source: &dyn WorkSource, mut hand_off: F)
where
    A: SlotAccounting,
    F: FnMut(usize, WorkItem),
{
    loop {
        while monitor.can_dispatch() {
            let Some(item) = source.fetch_work() else {
                break;
            };
            match monitor.claim() {
                Ok(slot) => hand_off(slot, item),
                Err(violation) => {
                    error!(manager = monitor.id, work_id = item.id(), %violation, "invariant violation");
                    source.fail_work(item, None);
                    // the retry sits at the head again; wait for the next wake
                    break;
                }
            }
        }

        debug!(manager = monitor.id, "manager waiting");
        if !monitor.wait() {
            debug!(manager = monitor.id, "manager killed");
            return;
        }
        debug!(manager = monitor.id, "manager woke");
    }
}
