//! Utility modules

pub mod error;
pub mod semaphore;

pub use error::{BenchmarkError, Result, SourceError};
pub use semaphore::Semaphore;
