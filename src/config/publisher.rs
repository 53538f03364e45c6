//! Publisher configuration structures.

use serde::{Deserialize, Serialize};

/// Default number of managers created.
pub const DEFAULT_MANAGERS: usize = 3;
/// Default number of workers per manager.
pub const DEFAULT_WORKERS_PER_MANAGER: usize = 10;
/// Default upper bound for generated work durations, in milliseconds.
pub const DEFAULT_MAX_WORK_MILLIS: u64 = 5_000;
/// Default stack size for manager and worker threads.
pub const DEFAULT_THREAD_STACK_SIZE: usize = 2 * 1024 * 1024;

/// Selection policy for the pending and active stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorePolicy {
    /// Arrival order; retried work is served ahead of fresh arrivals.
    #[default]
    Fifo,
    /// Maximum duration first (longest-processing-time-first).
    LongestFirst,
}

/// How a manager tracks its execution capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagerKind {
    /// One dedicated worker per slot, busy flags scanned linearly.
    #[default]
    SlotTable,
    /// Capacity-bounded thread pool fed by a channel; only a counter is kept.
    ExecutorPool,
}

/// Publisher configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    /// Number of managers.
    pub managers: usize,
    /// Workers owned by each manager.
    pub workers_per_manager: usize,
    /// Store policy shared by the pending and active stores.
    pub store: StorePolicy,
    /// Manager capacity realization.
    pub manager_kind: ManagerKind,
    /// Upper bound (inclusive) for generated durations.
    pub max_work_millis: u64,
    /// Seed for generated durations; entropy when absent.
    pub seed: Option<u64>,
    /// Stack size for spawned threads.
    pub thread_stack_size: usize,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            managers: DEFAULT_MANAGERS,
            workers_per_manager: DEFAULT_WORKERS_PER_MANAGER,
            store: StorePolicy::default(),
            manager_kind: ManagerKind::default(),
            max_work_millis: DEFAULT_MAX_WORK_MILLIS,
            seed: None,
            thread_stack_size: DEFAULT_THREAD_STACK_SIZE,
        }
    }
}

impl PublisherConfig {
    /// Defaults: 3 managers of 10 workers, FIFO stores, slot tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of managers.
    #[must_use]
    pub const fn with_managers(mut self, managers: usize) -> Self {
        self.managers = managers;
        self
    }

    /// Set the number of workers per manager.
    #[must_use]
    pub const fn with_workers_per_manager(mut self, workers: usize) -> Self {
        self.workers_per_manager = workers;
        self
    }

    /// Set the store policy.
    #[must_use]
    pub const fn with_store(mut self, store: StorePolicy) -> Self {
        self.store = store;
        self
    }

    /// Set the manager realization.
    #[must_use]
    pub const fn with_manager_kind(mut self, kind: ManagerKind) -> Self {
        self.manager_kind = kind;
        self
    }

    /// Set the upper bound for generated durations.
    #[must_use]
    pub const fn with_max_work_millis(mut self, millis: u64) -> Self {
        self.max_work_millis = millis;
        self
    }

    /// Fix the duration generator seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the thread stack size.
    #[must_use]
    pub const fn with_thread_stack_size(mut self, size: usize) -> Self {
        self.thread_stack_size = size;
        self
    }

    /// Total execution slots across all managers.
    #[must_use]
    pub const fn total_workers(&self) -> usize {
        self.managers * self.workers_per_manager
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.managers == 0 {
            return Err("managers must be greater than 0".into());
        }
        if self.workers_per_manager == 0 {
            return Err("workers_per_manager must be greater than 0".into());
        }
        if self.max_work_millis == 0 {
            return Err("max_work_millis must be greater than 0".into());
        }
        if self.thread_stack_size == 0 {
            return Err("thread_stack_size must be greater than 0".into());
        }
        Ok(())
    }

    /// Validate, additionally enforcing the startup minimums of
    /// [`DEFAULT_MANAGERS`] managers and [`DEFAULT_WORKERS_PER_MANAGER`] workers.
    pub fn validate_minimums(&self) -> Result<(), String> {
        self.validate()?;
        if self.managers < DEFAULT_MANAGERS {
            return Err(format!(
                "number of managers must be at least {DEFAULT_MANAGERS}: {}",
                self.managers
            ));
        }
        if self.workers_per_manager < DEFAULT_WORKERS_PER_MANAGER {
            return Err(format!(
                "number of workers per manager must be at least {DEFAULT_WORKERS_PER_MANAGER}: {}",
                self.workers_per_manager
            ));
        }
        Ok(())
    }

    /// Parse publisher configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
