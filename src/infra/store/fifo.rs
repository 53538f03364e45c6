//! Arrival-ordered store with head insertion for retries.

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::core::{WorkId, WorkItem, WorkStore};

/// FIFO store: oldest item first, retries jump the line.
///
/// Append, prepend and pop are O(1); removal by identifier is a linear scan.
#[derive(Default)]
pub struct FifoStore {
    items: Mutex<VecDeque<WorkItem>>,
}

impl FifoStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl WorkStore for FifoStore {
    fn insert_all(&self, items: Vec<WorkItem>) -> bool {
        let mut queue = self.items.lock();
        let was_empty = queue.is_empty();
        queue.extend(items);
        was_empty
    }

    fn insert_first(&self, item: WorkItem) -> bool {
        let mut queue = self.items.lock();
        let was_empty = queue.is_empty();
        queue.push_front(item);
        was_empty
    }

    fn take_next(&self) -> Option<WorkItem> {
        self.items.lock().pop_front()
    }

    fn remove(&self, item: &WorkItem) -> bool {
        let mut queue = self.items.lock();
        match queue.iter().position(|stored| stored.id() == item.id()) {
            Some(idx) => queue.remove(idx).is_some(),
            None => false,
        }
    }

    fn contains(&self, id: WorkId) -> bool {
        self.items.lock().iter().any(|stored| stored.id() == id)
    }

    fn ids(&self) -> Vec<WorkId> {
        self.items.lock().iter().map(WorkItem::id).collect()
    }

    fn len(&self) -> usize {
        self.items.lock().len()
    }

    fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}
