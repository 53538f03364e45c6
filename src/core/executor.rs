//! Running work actions on dedicated threads.
//!
//! Every execution thread owns a single-threaded tokio runtime and drives the
//! item's action to completion with `block_on`. Waiting inside an action thus
//! parks only that thread, never a manager or the publisher.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tokio::runtime::{Builder, Runtime};

use crate::core::{DispatchError, WorkError, WorkItem};

/// Build the runtime an execution thread uses for its whole lifetime.
///
/// # Errors
///
/// Returns `DispatchError::Runtime` if the runtime cannot be created.
pub fn execution_runtime() -> Result<Runtime, DispatchError> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(DispatchError::Runtime)
}

/// Execute `item` once on the calling thread.
///
/// A panicking action is caught here and turned into `WorkError::Panicked` so
/// that the execution thread survives and the item can be retried.
pub fn execute(runtime: &Runtime, item: &WorkItem) -> Result<(), WorkError> {
    panic::catch_unwind(AssertUnwindSafe(|| runtime.block_on(item.action().perform())))
        .unwrap_or_else(|payload| Err(WorkError::Panicked(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
