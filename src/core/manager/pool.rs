//! Manager backed by a capacity-bounded thread pool.
//!
//! Execution threads block on a shared channel; dropping the sender when the
//! manager is killed lets them finish whatever was already dispatched and
//! exit. The manager itself only counts items in flight.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, TrySendError};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use super::{dispatch_loop, Manager, ManagerMonitor, ManagerReporter, SlotAccounting, WorkSource};
use crate::core::executor::{execute, execution_runtime};
use crate::core::{DispatchError, WorkItem, WorkReport};

/// In-flight counter; slot indices are only tickets.
pub(crate) struct InFlight {
    capacity: usize,
    active: usize,
}

impl SlotAccounting for InFlight {
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn busy(&self) -> usize {
        self.active
    }

    fn claim(&mut self) -> Option<usize> {
        if self.active >= self.capacity {
            return None;
        }
        self.active += 1;
        Some(self.active - 1)
    }

    fn release(&mut self, _slot: usize) -> bool {
        if self.active == 0 {
            return false;
        }
        self.active -= 1;
        true
    }
}

/// Manager feeding a fixed pool of execution threads.
pub struct ExecutorPoolManager {
    id: usize,
    monitor: Arc<ManagerMonitor<InFlight>>,
    handle: Mutex<Option<JoinHandle<()>>>,
    threads: Mutex<Vec<JoinHandle<()>>>,
}

impl ExecutorPoolManager {
    /// Spawn `capacity` execution threads and the dispatch thread.
    ///
    /// # Errors
    ///
    /// Returns the first spawn or runtime failure; threads already started
    /// exit once the channel closes.
    pub fn spawn(
        id: usize,
        capacity: usize,
        source: Arc<dyn WorkSource>,
        stack_size: usize,
    ) -> Result<Self, DispatchError> {
        let monitor = Arc::new(ManagerMonitor::new(id, InFlight { capacity, active: 0 }));
        let reporter: Arc<dyn WorkReport> = Arc::new(ManagerReporter {
            monitor: Arc::clone(&monitor),
            source: Arc::clone(&source),
        });

        // bounded to capacity: a claimed slot always has room in the channel
        let (task_tx, task_rx) = bounded::<(usize, WorkItem)>(capacity);

        let mut threads = Vec::with_capacity(capacity);
        for idx in 0..capacity {
            threads.push(spawn_pool_thread(
                id,
                idx,
                task_rx.clone(),
                Arc::clone(&reporter),
                stack_size,
            )?);
        }
        drop(task_rx);

        let name = format!("jp-manager-{id}");
        let thread_monitor = Arc::clone(&monitor);
        let handle = thread::Builder::new()
            .name(name.clone())
            .stack_size(stack_size)
            .spawn(move || {
                dispatch_loop(&*thread_monitor, source.as_ref(), |slot, item| {
                    match task_tx.try_send((slot, item)) {
                        Ok(()) => {}
                        Err(TrySendError::Full((slot, item)) | TrySendError::Disconnected((slot, item))) => {
                            error!(manager = id, work_id = item.id(), "execution pool rejected work");
                            source.fail_work(item, None);
                            thread_monitor.release(slot);
                        }
                    }
                });
                // closing the channel lets the pool drain and exit
                drop(task_tx);
                info!(manager = id, "manager terminated");
            })
            .map_err(|source| DispatchError::Spawn { name, source })?;

        info!(manager = id, workers = capacity, "executor pool manager started");
        Ok(Self {
            id,
            monitor,
            handle: Mutex::new(Some(handle)),
            threads: Mutex::new(threads),
        })
    }
}

fn spawn_pool_thread(
    manager_id: usize,
    idx: usize,
    task_rx: Receiver<(usize, WorkItem)>,
    reporter: Arc<dyn WorkReport>,
    stack_size: usize,
) -> Result<JoinHandle<()>, DispatchError> {
    let runtime = execution_runtime()?;
    let name = format!("jp-pool-{manager_id}-{idx}");
    thread::Builder::new()
        .name(name.clone())
        .stack_size(stack_size)
        .spawn(move || {
            debug!(manager = manager_id, worker = idx, "pool thread started");
            while let Ok((slot, item)) = task_rx.recv() {
                debug!(manager = manager_id, worker = idx, work_id = item.id(), "doing work");
                match execute(&runtime, &item) {
                    Ok(()) => reporter.work_done(item, slot),
                    Err(error) => {
                        debug!(manager = manager_id, work_id = item.id(), %error, "failed to complete work");
                        reporter.work_not_done(item, slot, Some(error));
                    }
                }
            }
            debug!(manager = manager_id, worker = idx, "pool channel closed, exiting");
        })
        .map_err(|source| DispatchError::Spawn { name, source })
}

impl Manager for ExecutorPoolManager {
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
        let threads: Vec<_> = self.threads.lock().drain(..).collect();
        for (idx, handle) in threads.into_iter().enumerate() {
            if handle.join().is_err() {
                warn!(manager = self.id, worker = idx, "pool thread panicked");
            }
        }
    }
}
