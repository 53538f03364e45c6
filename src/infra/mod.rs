//! Storage backends for pending and active work.

pub mod store;

pub use store::{FifoStore, LongestFirstStore};
