//! Error types for stepper-bridge-benchmark

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum BenchmarkError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Worker error: {0}")]
    Worker(String),
}

/// Row-source errors
///
/// Both variants are fatal: an open failure ends the run before the first
/// row, a step failure discards the run mid-flight (no retry, no partial
/// result delivery).
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to open row source {path}: {source}")]
    OpenFailed { path: PathBuf, source: io::Error },

    #[error("Row step failed after {rows} rows: {source}")]
    StepFailed { rows: u64, source: io::Error },
}

pub type Result<T> = std::result::Result<T, BenchmarkError>;
