//! Tests for error types

use job_publisher::core::{AssignError, DispatchError, InvariantViolation, WorkError};

#[test]
fn test_configuration_error() {
    let err = DispatchError::Configuration("managers must be greater than 0".to_string());
    assert_eq!(format!("{}", err), "invalid configuration: managers must be greater than 0");
}

#[test]
fn test_shutdown_error() {
    assert_eq!(format!("{}", DispatchError::Shutdown), "publisher has been shut down");
}

#[test]
fn test_spawn_error_keeps_source() {
    let err = DispatchError::Spawn {
        name: "jp-worker-0-1".to_string(),
        source: std::io::Error::other("no threads left"),
    };
    assert!(format!("{}", err).contains("jp-worker-0-1"));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn test_assign_errors() {
    let busy = AssignError::Busy { worker: "Worker[0,2]".to_string() };
    assert_eq!(
        format!("{}", busy),
        "Worker[0,2] assigned work before previous work completed"
    );

    let killed = AssignError::Killed { worker: "Worker[1,0]".to_string() };
    assert_eq!(
        format!("{}", killed),
        "Worker[1,0] instructed to die while being assigned new work"
    );
}

#[test]
fn test_work_errors() {
    assert_eq!(format!("{}", WorkError::Failed("disk full".into())), "disk full");
    assert_eq!(format!("{}", WorkError::Panicked("boom".into())), "work panicked: boom");

    let other: WorkError = anyhow::anyhow!("upstream timed out").into();
    assert_eq!(format!("{}", other), "upstream timed out");
}

#[test]
fn test_invariant_violation_messages() {
    let unknown = InvariantViolation::UnknownActiveWork { id: 7, report: "completion" };
    assert_eq!(format!("{}", unknown), "completion reported for Work[7] not found in active store");

    let not_busy = InvariantViolation::SlotNotBusy { manager: 1, slot: 4 };
    assert_eq!(format!("{}", not_busy), "Worker[1,4] freed while not busy");

    let rejected = InvariantViolation::AssignRejected {
        id: 3,
        reason: AssignError::Killed { worker: "Worker[0,0]".into() },
    };
    assert!(format!("{}", rejected).starts_with("Work[3] rejected by worker"));
}
