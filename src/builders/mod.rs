//! Builders to construct dispatch components from configuration.

pub mod publisher_builder;

pub use publisher_builder::{build_publisher, build_store};
