//! Builders to construct a publisher from configuration.

use crate::config::{PublisherConfig, StorePolicy};
use crate::core::{DispatchError, Publisher, WorkStore};
use crate::infra::{FifoStore, LongestFirstStore};

/// Store factory for a selection policy.
#[must_use]
pub fn build_store(policy: StorePolicy) -> Box<dyn WorkStore> {
    match policy {
        StorePolicy::Fifo => Box::new(FifoStore::new()),
        StorePolicy::LongestFirst => Box::new(LongestFirstStore::new()),
    }
}

/// Validate `cfg` and start a publisher with its managers and workers.
///
/// The pending and active stores share the configured policy.
pub fn build_publisher(cfg: &PublisherConfig) -> Result<Publisher, DispatchError> {
    cfg.validate()
        .map_err(|e| DispatchError::Configuration(format!("config invalid: {e}")))?;

    Publisher::new(cfg, build_store(cfg.store), build_store(cfg.store))
}
