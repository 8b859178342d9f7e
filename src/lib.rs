//! stepper-bridge-benchmark library
//!
//! Benchmark harness measuring the overhead of four strategies for
//! driving a blocking row iterator from a worker thread while a
//! controller consumes per-batch completion notifications.

pub mod bridge;
pub mod config;
pub mod source;
pub mod utils;
