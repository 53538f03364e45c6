//! Configuration models for the publisher, its stores and managers.

pub mod publisher;

pub use publisher::{
    ManagerKind, PublisherConfig, StorePolicy, DEFAULT_MANAGERS,
    DEFAULT_MAX_WORK_MILLIS, DEFAULT_THREAD_STACK_SIZE, DEFAULT_WORKERS_PER_MANAGER,
};
