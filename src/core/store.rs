//! Work store abstraction shared by the pending and active collections.

use crate::core::work::{WorkId, WorkItem};

/// A synchronized collection of work items guarded by its own lock.
///
/// Every method is atomic with respect to concurrent callers. Insertions
/// report whether the store was empty immediately before they ran, which is
/// what the publisher's edge-triggered wake-up keys on.
pub trait WorkStore: Send + Sync {
    /// Append items in order. Returns `true` if the store was empty beforehand.
    fn insert_all(&self, items: Vec<WorkItem>) -> bool;

    /// Add a single item. Returns `true` if the store was empty beforehand.
    fn insert(&self, item: WorkItem) -> bool {
        self.insert_all(vec![item])
    }

    /// Add an item ahead of fresh arrivals, used for retries.
    ///
    /// Stores without arrival order treat this as a plain insert.
    fn insert_first(&self, item: WorkItem) -> bool;

    /// Remove and return the next item per the store's policy.
    fn take_next(&self) -> Option<WorkItem>;

    /// Remove the entry keyed like `item`. Returns whether it was present.
    fn remove(&self, item: &WorkItem) -> bool;

    /// Whether an item with this identifier is stored.
    fn contains(&self, id: WorkId) -> bool;

    /// Identifiers in the order `take_next` would yield them.
    fn ids(&self) -> Vec<WorkId>;

    /// Current number of items.
    fn len(&self) -> usize;

    /// O(1) emptiness check.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
