//! Tests for configuration validation

use job_publisher::config::{
    ManagerKind, PublisherConfig, StorePolicy, DEFAULT_MANAGERS, DEFAULT_MAX_WORK_MILLIS,
    DEFAULT_WORKERS_PER_MANAGER,
};

#[test]
fn test_publisher_config_defaults() {
    let cfg = PublisherConfig::default();
    assert_eq!(cfg.managers, DEFAULT_MANAGERS);
    assert_eq!(cfg.workers_per_manager, DEFAULT_WORKERS_PER_MANAGER);
    assert_eq!(cfg.max_work_millis, DEFAULT_MAX_WORK_MILLIS);
    assert_eq!(cfg.store, StorePolicy::Fifo);
    assert_eq!(cfg.manager_kind, ManagerKind::SlotTable);
    assert_eq!(cfg.seed, None);
    assert_eq!(cfg.total_workers(), 30);
    assert!(cfg.validate().is_ok());
    assert!(cfg.validate_minimums().is_ok());
}

#[test]
fn test_publisher_config_builder() {
    let cfg = PublisherConfig::new()
        .with_managers(2)
        .with_workers_per_manager(4)
        .with_store(StorePolicy::LongestFirst)
        .with_manager_kind(ManagerKind::ExecutorPool)
        .with_max_work_millis(20)
        .with_seed(9)
        .with_thread_stack_size(512 * 1024);

    assert_eq!(cfg.total_workers(), 8);
    assert_eq!(cfg.seed, Some(9));
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_publisher_config_invalid_counts() {
    assert!(PublisherConfig::new().with_managers(0).validate().is_err());
    assert!(PublisherConfig::new().with_workers_per_manager(0).validate().is_err());
    assert!(PublisherConfig::new().with_max_work_millis(0).validate().is_err());
    assert!(PublisherConfig::new().with_thread_stack_size(0).validate().is_err());
}

#[test]
fn test_publisher_config_minimums() {
    let err = PublisherConfig::new().with_managers(2).validate_minimums().unwrap_err();
    assert_eq!(err, "number of managers must be at least 3: 2");

    let err = PublisherConfig::new()
        .with_workers_per_manager(9)
        .validate_minimums()
        .unwrap_err();
    assert_eq!(err, "number of workers per manager must be at least 10: 9");

    // small counts are fine for library use, only the startup convention rejects them
    assert!(PublisherConfig::new().with_managers(1).validate().is_ok());
}

#[test]
fn test_publisher_config_from_json() {
    let cfg = PublisherConfig::from_json_str(
        r#"{"managers": 4, "store": "longest_first", "manager_kind": "executor_pool", "seed": 42}"#,
    )
    .unwrap();
    assert_eq!(cfg.managers, 4);
    assert_eq!(cfg.workers_per_manager, DEFAULT_WORKERS_PER_MANAGER);
    assert_eq!(cfg.store, StorePolicy::LongestFirst);
    assert_eq!(cfg.manager_kind, ManagerKind::ExecutorPool);
    assert_eq!(cfg.seed, Some(42));
}

#[test]
fn test_publisher_config_from_json_rejects() {
    assert!(PublisherConfig::from_json_str("{not json").unwrap_err().starts_with("parse error"));
    assert!(PublisherConfig::from_json_str(r#"{"managers": 0}"#).is_err());
    assert!(PublisherConfig::from_json_str(r#"{"store": "random"}"#).is_err());
}
