//! Tests for builder modules

use std::time::Duration;

use job_publisher::builders::{build_publisher, build_store};
use job_publisher::config::{PublisherConfig, StorePolicy};
use job_publisher::core::{DispatchError, NewWork, WorkItem};

fn item(id: u64, duration_ms: u64) -> WorkItem {
    WorkItem::new(id, duration_ms, NewWork::sleep(duration_ms).action)
}

#[test]
fn test_build_store_policies() {
    let fifo = build_store(StorePolicy::Fifo);
    let longest = build_store(StorePolicy::LongestFirst);
    for id in 0..3 {
        fifo.insert(item(id, id + 1));
        longest.insert(item(id, id + 1));
    }
    assert_eq!(fifo.ids(), vec![0, 1, 2]);
    assert_eq!(longest.ids(), vec![2, 1, 0]);
}

#[test]
fn test_build_publisher_rejects_invalid_config() {
    let result = build_publisher(&PublisherConfig::new().with_managers(0));
    match result {
        Err(DispatchError::Configuration(msg)) => assert!(msg.contains("managers")),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected configuration error"),
    }
}

#[test]
fn test_build_publisher_starts_managers() {
    let cfg = PublisherConfig::new()
        .with_managers(2)
        .with_workers_per_manager(3)
        .with_max_work_millis(5);
    let publisher = build_publisher(&cfg).unwrap();

    let stats = publisher.stats();
    assert_eq!(stats.managers, 2);
    assert_eq!(stats.workers_per_manager, 3);
    assert_eq!(stats.pending, 0);

    publisher.submit_batch(4).unwrap();
    assert!(publisher.wait_until_idle(Duration::from_secs(5)));
    publisher.await_termination();
}
