//! The publisher: owns the pending and active stores and the managers.
//!
//! Submissions land in the pending store. Managers pull items through
//! [`WorkSource::fetch_work`], which moves each one into the active store, and
//! report back through `complete_work` / `fail_work`. A failed item always
//! leaves the active store and, when it was found there, is reinserted at the
//! head of the pending store for retry.
//!
//! Managers are woken only on the pending store's empty to non-empty edge,
//! whether caused by a submission or a retry.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, RwLock};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, info, warn};

use crate::config::PublisherConfig;
use crate::core::audit::{build_audit_event, AuditAction, AuditSink};
use crate::core::manager::{spawn_manager, Manager, WorkSource};
use crate::core::{DispatchError, InvariantViolation, NewWork, WorkError, WorkId, WorkItem, WorkStore};

/// Lifecycle counters, updated lock-free.
#[derive(Default)]
struct PublisherCounters {
    submitted: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    retried: AtomicU64,
    /// Submitted items not yet completed.
    outstanding: AtomicU64,
}

/// Point-in-time view of a publisher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublisherStats {
    /// Number of managers.
    pub managers: usize,
    /// Workers owned by each manager.
    pub workers_per_manager: usize,
    /// Items waiting in the pending store.
    pub pending: usize,
    /// Items in the active store.
    pub active: usize,
    /// Occupied slots across all managers.
    pub busy_slots: usize,
    /// Items ever submitted.
    pub submitted: u64,
    /// Items completed.
    pub completed: u64,
    /// Failure reports received, including ones for unknown items.
    pub failed: u64,
    /// Items put back into the pending store.
    pub retried: u64,
}

/// State shared between the publisher handle and the manager threads.
pub(crate) struct PublisherCore {
    pending: Box<dyn WorkStore>,
    active: Box<dyn WorkStore>,
    managers: RwLock<Vec<Arc<dyn Manager>>>,
    shutdown: AtomicBool,
    counters: PublisherCounters,
    audit: RwLock<Option<Arc<dyn AuditSink>>>,
    idle_lock: Mutex<()>,
    idle: Condvar,
}

impl PublisherCore {
    fn new(pending: Box<dyn WorkStore>, active: Box<dyn WorkStore>) -> Self {
        Self {
            pending,
            active,
            managers: RwLock::new(Vec::new()),
            shutdown: AtomicBool::new(false),
            counters: PublisherCounters::default(),
            audit: RwLock::new(None),
            idle_lock: Mutex::new(()),
            idle: Condvar::new(),
        }
    }

    fn record(&self, work_id: WorkId, action: AuditAction, detail: Option<String>) {
        if let Some(sink) = self.audit.read().as_ref() {
            sink.record(build_audit_event(work_id, action, detail));
        }
    }

    fn broadcast(&self) {
        for manager in self.managers.read().iter() {
            manager.notify_work();
        }
    }

    fn is_idle(&self) -> bool {
        self.counters.outstanding.load(Ordering::Acquire) == 0
    }

    fn notify_idle(&self) {
        if self.is_idle() {
            let _guard = self.idle_lock.lock();
            self.idle.notify_all();
        }
    }
}

impl WorkSource for PublisherCore {
    fn fetch_work(&self) -> Option<WorkItem> {
        if self.shutdown.load(Ordering::Acquire) {
            return None;
        }
        let item = self.pending.take_next()?;
        self.active.insert(item.clone());
        debug!(work_id = item.id(), duration_ms = item.duration_ms(), "work dispatched");
        self.record(item.id(), AuditAction::Dispatched, None);
        Some(item)
    }

    fn complete_work(&self, item: WorkItem) {
        if !self.active.remove(&item) {
            let violation = InvariantViolation::UnknownActiveWork {
                id: item.id(),
                report: "completion",
            };
            error!(work_id = item.id(), %violation, "invariant violation");
            self.record(item.id(), AuditAction::Orphaned, Some(violation.to_string()));
            return;
        }

        info!(work_id = item.id(), duration_ms = item.duration_ms(), "work done");
        self.counters.completed.fetch_add(1, Ordering::Relaxed);
        self.record(item.id(), AuditAction::Completed, None);
        self.counters.outstanding.fetch_sub(1, Ordering::AcqRel);
        self.notify_idle();
    }

    fn fail_work(&self, item: WorkItem, error: Option<WorkError>) {
        self.counters.failed.fetch_add(1, Ordering::Relaxed);
        let detail = error.as_ref().map(ToString::to_string);
        self.record(item.id(), AuditAction::Failed, detail.clone());

        if !self.active.remove(&item) {
            let violation = InvariantViolation::UnknownActiveWork {
                id: item.id(),
                report: "failure",
            };
            error!(work_id = item.id(), %violation, "invariant violation");
            self.record(item.id(), AuditAction::Orphaned, Some(violation.to_string()));
            return;
        }

        match &detail {
            Some(reason) => warn!(work_id = item.id(), error = %reason, "work not done, retrying"),
            None => info!(work_id = item.id(), "work not done, retrying"),
        }
        // recorded first: once reinserted another manager may dispatch it at once
        self.counters.retried.fetch_add(1, Ordering::Relaxed);
        self.record(item.id(), AuditAction::Retried, None);
        if self.pending.insert_first(item) {
            self.broadcast();
        }
    }
}

/// Entry point of the engine.
///
/// Construct with [`build_publisher`](crate::builders::build_publisher) or
/// [`Publisher::new`]; managers and workers start immediately.
pub struct Publisher {
    core: Arc<PublisherCore>,
    next_id: AtomicU64,
    rng: Mutex<StdRng>,
    max_work_millis: u64,
    workers_per_manager: usize,
}

impl Publisher {
    /// Start `config.managers` managers over the given stores.
    ///
    /// # Errors
    ///
    /// `DispatchError::Configuration` for an invalid config, or the first
    /// thread/runtime failure. Managers already started are shut down.
    pub fn new(
        config: &PublisherConfig,
        pending: Box<dyn WorkStore>,
        active: Box<dyn WorkStore>,
    ) -> Result<Self, DispatchError> {
        config.validate().map_err(DispatchError::Configuration)?;

        let core = Arc::new(PublisherCore::new(pending, active));
        let source: Arc<dyn WorkSource> = core.clone();
        for id in 0..config.managers {
            let spawned = spawn_manager(
                config.manager_kind,
                id,
                config.workers_per_manager,
                Arc::clone(&source),
                config.thread_stack_size,
            );
            match spawned {
                Ok(manager) => core.managers.write().push(manager),
                Err(err) => {
                    core.shutdown.store(true, Ordering::Release);
                    let managers = core.managers.read().clone();
                    managers.iter().for_each(|m| m.kill());
                    managers.iter().for_each(|m| m.join());
                    return Err(err);
                }
            }
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        info!(
            managers = config.managers,
            workers = config.workers_per_manager,
            store = ?config.store,
            kind = ?config.manager_kind,
            "publisher started"
        );
        Ok(Self {
            core,
            next_id: AtomicU64::new(0),
            rng: Mutex::new(rng),
            max_work_millis: config.max_work_millis,
            workers_per_manager: config.workers_per_manager,
        })
    }

    /// Attach an audit sink recording every lifecycle transition.
    #[must_use]
    pub fn with_audit(self, sink: Arc<dyn AuditSink>) -> Self {
        *self.core.audit.write() = Some(sink);
        self
    }

    /// Submit work items, returning their identifiers in submission order.
    ///
    /// # Errors
    ///
    /// `DispatchError::Shutdown` once [`shutdown`](Self::shutdown) was called.
    pub fn submit<I>(&self, works: I) -> Result<Vec<WorkId>, DispatchError>
    where
        I: IntoIterator<Item = NewWork>,
    {
        if self.is_shut_down() {
            return Err(DispatchError::Shutdown);
        }

        let items: Vec<WorkItem> = works
            .into_iter()
            .map(|work| {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                WorkItem::new(id, work.duration_ms, work.action)
            })
            .collect();
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<WorkId> = items.iter().map(WorkItem::id).collect();
        for item in &items {
            info!(work_id = item.id(), duration_ms = item.duration_ms(), "work enqueued");
            self.core.record(item.id(), AuditAction::Submitted, None);
        }

        let count = items.len() as u64;
        self.core.counters.submitted.fetch_add(count, Ordering::Relaxed);
        self.core.counters.outstanding.fetch_add(count, Ordering::AcqRel);
        if self.core.pending.insert_all(items) {
            self.core.broadcast();
        }
        Ok(ids)
    }

    /// Submit `n` sleep items with durations uniform in `[1, max_work_millis]`.
    ///
    /// # Errors
    ///
    /// `DispatchError::Shutdown` once [`shutdown`](Self::shutdown) was called.
    pub fn submit_batch(&self, n: usize) -> Result<Vec<WorkId>, DispatchError> {
        let durations: Vec<u64> = {
            let mut rng = self.rng.lock();
            (0..n).map(|_| rng.random_range(1..=self.max_work_millis)).collect()
        };
        self.submit(durations.into_iter().map(NewWork::sleep))
    }

    /// Counters and store sizes.
    pub fn stats(&self) -> PublisherStats {
        let managers = self.core.managers.read();
        let counters = &self.core.counters;
        PublisherStats {
            managers: managers.len(),
            workers_per_manager: self.workers_per_manager,
            pending: self.core.pending.len(),
            active: self.core.active.len(),
            busy_slots: managers.iter().map(|m| m.busy_count()).sum(),
            submitted: counters.submitted.load(Ordering::Relaxed),
            completed: counters.completed.load(Ordering::Relaxed),
            failed: counters.failed.load(Ordering::Relaxed),
            retried: counters.retried.load(Ordering::Relaxed),
        }
    }

    /// Identifiers in the pending store, in the order they would be served.
    pub fn pending_ids(&self) -> Vec<WorkId> {
        self.core.pending.ids()
    }

    /// Identifiers in the active store.
    pub fn active_ids(&self) -> Vec<WorkId> {
        self.core.active.ids()
    }

    /// Block until every submitted item has completed or `timeout` elapses.
    ///
    /// Returns whether the publisher is idle.
    pub fn wait_until_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut guard = self.core.idle_lock.lock();
        while !self.core.is_idle() {
            if self.core.idle.wait_until(&mut guard, deadline).timed_out() {
                return self.core.is_idle();
            }
        }
        true
    }

    /// Whether [`shutdown`](Self::shutdown) has been called.
    pub fn is_shut_down(&self) -> bool {
        self.core.shutdown.load(Ordering::Acquire)
    }

    /// Kill every manager and wait for their dispatch threads to exit.
    ///
    /// In-flight work keeps running and is still reported. Idempotent.
    pub fn shutdown(&self) {
        if !self.core.shutdown.swap(true, Ordering::AcqRel) {
            info!("publisher shutting down");
        }
        let managers = self.core.managers.read().clone();
        managers.iter().for_each(|m| m.kill());
        managers.iter().for_each(|m| m.join());
    }

    /// Shut down, then wait for every execution thread to finish and exit.
    pub fn await_termination(&self) {
        self.shutdown();
        let managers = self.core.managers.read().clone();
        managers.iter().for_each(|m| m.join_workers());
        info!("publisher terminated");
    }
}

impl Drop for Publisher {
    fn drop(&mut self) {
        self.core.shutdown.store(true, Ordering::Release);
        for manager in self.core.managers.read().iter() {
            manager.kill();
        }
    }
}
