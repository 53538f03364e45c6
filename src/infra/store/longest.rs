//! Longest-processing-time-first store.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use parking_lot::Mutex;

use crate::core::{WorkId, WorkItem, WorkStore};

/// Ordering key: duration first, then the lower identifier wins a tie.
///
/// Keying on the identifier as well keeps equal durations from colliding.
type LongestKey = (u64, Reverse<WorkId>);

fn key_of(item: &WorkItem) -> LongestKey {
    (item.duration_ms(), Reverse(item.id()))
}

/// Priority store handing out the maximum-duration item next.
///
/// Backed by a balanced tree: insert, take and remove are O(log n).
#[derive(Default)]
pub struct LongestFirstStore {
    tree: Mutex<BTreeMap<LongestKey, WorkItem>>,
}

impl LongestFirstStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl WorkStore for LongestFirstStore {
    fn insert_all(&self, items: Vec<WorkItem>) -> bool {
        let mut tree = self.tree.lock();
        let was_empty = tree.is_empty();
        for item in items {
            tree.insert(key_of(&item), item);
        }
        was_empty
    }

    fn insert_first(&self, item: WorkItem) -> bool {
        self.insert(item)
    }

    fn take_next(&self) -> Option<WorkItem> {
        self.tree.lock().pop_last().map(|(_, item)| item)
    }

    fn remove(&self, item: &WorkItem) -> bool {
        self.tree.lock().remove(&key_of(item)).is_some()
    }

    fn contains(&self, id: WorkId) -> bool {
        self.tree.lock().keys().any(|(_, Reverse(stored))| *stored == id)
    }

    fn ids(&self) -> Vec<WorkId> {
        self.tree.lock().keys().rev().map(|(_, Reverse(id))| *id).collect()
    }

    fn len(&self) -> usize {
        self.tree.lock().len()
    }

    fn is_empty(&self) -> bool {
        self.tree.lock().is_empty()
    }
}
