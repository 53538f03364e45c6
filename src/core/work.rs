//! Work items and the actions they carry.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::core::WorkError;

/// Process-unique, monotonic work identifier assigned by the publisher.
pub type WorkId = u64;

/// Abstraction for the task a work item performs.
///
/// The action runs on the worker's own thread, driven to completion by that
/// thread's single-threaded runtime, so awaiting inside `perform` blocks only
/// the owning worker. A failed action is retried verbatim; making a retry safe
/// is the implementor's job.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use job_publisher::core::{WorkAction, WorkError};
///
/// struct Upload { path: std::path::PathBuf }
///
/// #[async_trait]
/// impl WorkAction for Upload {
///     async fn perform(&self) -> Result<(), WorkError> {
///         push(&self.path).await.map_err(|e| WorkError::Failed(e.to_string()))
///     }
/// }
/// ```
#[async_trait]
pub trait WorkAction: Send + Sync + 'static {
    /// Perform the work once.
    async fn perform(&self) -> Result<(), WorkError>;
}

/// A unit of schedulable work.
///
/// Cloning yields another handle to the same item; stores and workers track
/// the item by its identifier, never by handle.
#[derive(Clone)]
pub struct WorkItem {
    id: WorkId,
    duration_ms: u64,
    action: Arc<dyn WorkAction>,
}

impl WorkItem {
    /// Create a work item. Identifiers must be unique for the process lifetime.
    pub fn new(id: WorkId, duration_ms: u64, action: Arc<dyn WorkAction>) -> Self {
        Self {
            id,
            duration_ms,
            action,
        }
    }

    /// Identifier assigned at submission.
    #[must_use]
    pub const fn id(&self) -> WorkId {
        self.id
    }

    /// Duration/weight in milliseconds, used by the longest-first store.
    #[must_use]
    pub const fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// The action to execute.
    #[must_use]
    pub fn action(&self) -> &dyn WorkAction {
        self.action.as_ref()
    }
}

impl fmt::Debug for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkItem")
            .field("id", &self.id)
            .field("duration_ms", &self.duration_ms)
            .finish_non_exhaustive()
    }
}

/// Work awaiting an identifier; the publisher turns it into a [`WorkItem`].
#[derive(Clone)]
pub struct NewWork {
    /// Duration/weight in milliseconds.
    pub duration_ms: u64,
    /// Action to run.
    pub action: Arc<dyn WorkAction>,
}

impl NewWork {
    /// Wrap an action with its weight.
    pub fn new(duration_ms: u64, action: impl WorkAction) -> Self {
        Self {
            duration_ms,
            action: Arc::new(action),
        }
    }

    /// Timed placeholder work that sleeps for `duration_ms`.
    #[must_use]
    pub fn sleep(duration_ms: u64) -> Self {
        Self::new(duration_ms, SleepAction::new(Duration::from_millis(duration_ms)))
    }
}

/// Demonstration payload: sleeps for a fixed time, never fails.
#[derive(Debug, Clone, Copy)]
pub struct SleepAction {
    duration: Duration,
}

impl SleepAction {
    /// Create a sleep of the given length.
    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

#[async_trait]
impl WorkAction for SleepAction {
    async fn perform(&self) -> Result<(), WorkError> {
        tokio::time::sleep(self.duration).await;
        Ok(())
    }
}

/// Adapter running a synchronous closure as a work action.
pub struct FnAction<F>(F);

impl<F> FnAction<F>
where
    F: Fn() -> Result<(), WorkError> + Send + Sync + 'static,
{
    /// Wrap `f`.
    pub const fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> WorkAction for FnAction<F>
where
    F: Fn() -> Result<(), WorkError> + Send + Sync + 'static,
{
    async fn perform(&self) -> Result<(), WorkError> {
        (self.0)()
    }
}
