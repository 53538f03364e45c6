//! Tests for work store policies

use std::sync::Arc;
use std::thread;

use job_publisher::core::{NewWork, WorkItem, WorkStore};
use job_publisher::infra::{FifoStore, LongestFirstStore};

fn item(id: u64, duration_ms: u64) -> WorkItem {
    WorkItem::new(id, duration_ms, NewWork::sleep(duration_ms).action)
}

fn drain(store: &dyn WorkStore) -> Vec<u64> {
    std::iter::from_fn(|| store.take_next().map(|i| i.id())).collect()
}

#[test]
fn test_fifo_serves_submission_order() {
    let store = FifoStore::new();
    assert!(store.insert_all((0..5).map(|id| item(id, 10)).collect()));
    assert!(!store.insert(item(5, 10)));
    assert_eq!(drain(&store), vec![0, 1, 2, 3, 4, 5]);
    assert!(store.is_empty());
}

#[test]
fn test_fifo_retry_precedes_later_arrivals() {
    let store = FifoStore::new();
    store.insert_all(vec![item(0, 1), item(1, 1)]);
    let failed = store.take_next().unwrap();

    store.insert_first(failed);
    store.insert(item(2, 1));
    assert_eq!(drain(&store), vec![0, 1, 2]);
}

#[test]
fn test_longest_first_scenario() {
    let store = LongestFirstStore::new();
    store.insert_all(vec![item(0, 5), item(1, 1), item(2, 3)]);

    let durations: Vec<u64> =
        std::iter::from_fn(|| store.take_next().map(|i| i.duration_ms())).collect();
    assert_eq!(durations, vec![5, 3, 1]);
}

#[test]
fn test_longest_first_ties_and_duplicates() {
    let store = LongestFirstStore::new();
    store.insert_all(vec![item(4, 7), item(2, 7), item(9, 7)]);
    assert_eq!(store.len(), 3);
    assert_eq!(drain(&store), vec![2, 4, 9]);
}

#[test]
fn test_remove_by_key() {
    for store in [
        Box::new(FifoStore::new()) as Box<dyn WorkStore>,
        Box::new(LongestFirstStore::new()),
    ] {
        let target = item(1, 20);
        store.insert_all(vec![item(0, 10), target.clone(), item(2, 30)]);

        assert!(store.contains(1));
        assert!(store.remove(&target));
        assert!(!store.remove(&target));
        assert!(!store.contains(1));
        assert_eq!(store.len(), 2);
    }
}

#[test]
fn test_concurrent_takes_never_duplicate() {
    let store = Arc::new(FifoStore::new());
    store.insert_all((0..1_000).map(|id| item(id, 1)).collect());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || drain(store.as_ref()))
        })
        .collect();

    let mut taken: Vec<u64> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
    taken.sort_unstable();
    assert_eq!(taken, (0..1_000).collect::<Vec<_>>());
}
