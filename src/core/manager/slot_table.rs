//! Manager with one dedicated worker per slot.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use tracing::{error, info, warn};

use super::{dispatch_loop, Manager, ManagerMonitor, ManagerReporter, SlotAccounting, WorkSource};
use crate::core::{DispatchError, InvariantViolation, WorkReport, Worker};

/// Busy flag per slot plus a running count, so the full check is O(1).
pub(crate) struct SlotTable {
    busy: Vec<bool>,
    busy_count: usize,
}

impl SlotTable {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            busy: vec![false; capacity],
            busy_count: 0,
        }
    }
}

impl SlotAccounting for SlotTable {
    fn capacity(&self) -> usize {
        self.busy.len()
    }

    fn busy(&self) -> usize {
        self.busy_count
    }

    fn claim(&mut self) -> Option<usize> {
        let slot = self.busy.iter().position(|busy| !busy)?;
        self.busy[slot] = true;
        self.busy_count += 1;
        Some(slot)
    }

    fn release(&mut self, slot: usize) -> bool {
        match self.busy.get_mut(slot) {
            Some(busy) if *busy => {
                *busy = false;
                self.busy_count -= 1;
                true
            }
            _ => false,
        }
    }
}

/// Manager owning a fixed table of [`Worker`]s.
pub struct SlotTableManager {
    id: usize,
    monitor: Arc<ManagerMonitor<SlotTable>>,
    workers: Arc<Vec<Worker>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl SlotTableManager {
    /// Spawn `worker_count` workers and the dispatch thread.
    ///
    /// # Errors
    ///
    /// Returns the first spawn failure; workers already started are killed.
    pub fn spawn(
        id: usize,
        worker_count: usize,
        source: Arc<dyn WorkSource>,
        stack_size: usize,
    ) -> Result<Self, DispatchError> {
        let monitor = Arc::new(ManagerMonitor::new(id, SlotTable::new(worker_count)));
        let reporter: Arc<dyn WorkReport> = Arc::new(ManagerReporter {
            monitor: Arc::clone(&monitor),
            source: Arc::clone(&source),
        });

        let mut workers = Vec::with_capacity(worker_count);
        for slot in 0..worker_count {
            match Worker::spawn(id, slot, Arc::clone(&reporter), stack_size) {
                Ok(worker) => workers.push(worker),
                Err(err) => {
                    workers.iter().for_each(Worker::kill);
                    return Err(err);
                }
            }
        }
        let workers = Arc::new(workers);

        let name = format!("jp-manager-{id}");
        let thread_monitor = Arc::clone(&monitor);
        let thread_workers = Arc::clone(&workers);
        let spawned = thread::Builder::new()
            .name(name.clone())
            .stack_size(stack_size)
            .spawn(move || run(id, &thread_monitor, source.as_ref(), &thread_workers));
        let handle = match spawned {
            Ok(handle) => handle,
            Err(source) => {
                workers.iter().for_each(Worker::kill);
                return Err(DispatchError::Spawn { name, source });
            }
        };

        info!(manager = id, workers = worker_count, "slot table manager started");
        Ok(Self {
            id,
            monitor,
            workers,
            handle: Mutex::new(Some(handle)),
        })
    }
}

fn run(id: usize, monitor: &ManagerMonitor<SlotTable>, source: &dyn WorkSource, workers: &[Worker]) {
    dispatch_loop(monitor, source, |slot, item| {
        let work_id = item.id();
        // the slot stays claimed: a rejecting worker still owes a report for it
        let worker = &workers[slot];
        if let Err(reason) = worker.assign(item.clone()) {
            let violation = InvariantViolation::AssignRejected { id: work_id, reason };
            error!(manager = id, worker = worker.label(), %violation, "invariant violation");
            source.fail_work(item, None);
        }
    });

    workers.iter().for_each(Worker::kill);
    info!(manager = id, "manager terminated");
}

impl Manager for SlotTableManager {
    fn id(&self) -> usize {
        self.id
    }

    fn worker_count(&self) -> usize {
        self.monitor.capacity()
    }

    fn busy_count(&self) -> usize {
        self.monitor.busy()
    }

    fn notify_work(&self) {
        self.monitor.notify_work();
    }

    fn kill(&self) {
        self.monitor.kill();
    }

    fn join(&self) {
        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!(manager = self.id, "manager thread panicked");
            }
        }
    }

    fn join_workers(&self) {
        self.workers.iter().for_each(Worker::join);
    }
}
