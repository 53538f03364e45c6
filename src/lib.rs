//! # Job Publisher
//!
//! A two-level job distribution engine: a publisher owns pending and active
//! work stores, managers match their free execution slots to pending work, and
//! workers execute one item at a time on dedicated OS threads.
//!
//! ## Core Problem Solved
//!
//! Discrete units of work must be spread over a bounded pool of concurrent
//! execution slots without losing or duplicating any of them:
//!
//! - **Back-pressure**: a manager only pulls work while it has a free slot
//! - **Retry**: a failed item goes back to the head of the pending store
//! - **No lost wakeups**: every wait re-checks its predicate; wake signals are sticky
//! - **Orderly shutdown**: running work is never interrupted and is always reported
//!
//! ## Key Features
//!
//! - **Two store policies**: arrival order (FIFO) or longest duration first
//! - **Two manager realizations**: a slot table of dedicated workers, or a
//!   capacity-bounded executor pool fed by a channel
//! - **Async actions on sync threads**: each execution thread drives its
//!   action on its own single-threaded tokio runtime
//! - **Lifecycle journal**: optional audit sink recording every transition
//!
//! ```rust,ignore
//! use job_publisher::builders::build_publisher;
//! use job_publisher::config::{PublisherConfig, StorePolicy};
//! use std::time::Duration;
//!
//! let publisher = build_publisher(
//!     &PublisherConfig::new()
//!         .with_managers(3)
//!         .with_workers_per_manager(10)
//!         .with_store(StorePolicy::LongestFirst),
//! )?;
//!
//! publisher.submit_batch(50)?;
//! publisher.wait_until_idle(Duration::from_secs(30));
//! publisher.await_termination();
//! ```
//!
//! For complete examples, see:
//! - `tests/publisher_test.rs` - End-to-end scenarios
//! - `src/bin/job_publisher.rs` - The interactive driver

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core dispatch abstractions: work, stores, workers, managers, publisher.
pub mod core;
/// Configuration models for the publisher and its managers.
pub mod config;
/// Builders to construct a publisher from configuration.
pub mod builders;
/// Storage backends for pending and active work.
pub mod infra;
/// Interactive driver surface.
pub mod runtime;
/// Shared utilities.
pub mod util;
