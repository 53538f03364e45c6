//! Work store backends.

pub mod fifo;
pub mod longest;

pub use fifo::FifoStore;
pub use longest::LongestFirstStore;
