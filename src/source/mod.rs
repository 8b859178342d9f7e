//! Blocking row sources
//!
//! The bridges only need one capability from the data they drive: a
//! blocking "produce the next row" primitive with a tri-state outcome
//! (row available, exhausted, error). The traits here keep the bridge
//! code independent of where rows actually come from; the binary uses
//! [`FileSource`], tests use scripted in-memory sources.

pub mod file;
#[cfg(test)]
pub mod script;

use crate::utils::Result;

pub use file::FileSource;

/// Outcome of a single successful stepper invocation.
///
/// Row payloads are deliberately not surfaced: the harness measures
/// synchronization cost, so every strategy spends the same (zero) time on
/// output handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A row was produced and discarded.
    Row,
    /// The source has no more rows; the run is complete.
    Exhausted,
}

/// Blocking "next row" primitive.
///
/// A stepper is created by [`RowSource::open`] on the thread that will
/// drive it and never leaves that thread, so implementations do not need
/// interior thread safety. Dropping the stepper closes the underlying
/// resource.
pub trait Stepper {
    /// Produce the next row, blocking as needed.
    ///
    /// Errors are fatal to the run; the caller never retries.
    fn step(&mut self) -> Result<StepOutcome>;
}

/// Factory for steppers.
///
/// The source is constructed on the controller side from configuration
/// and moved to the worker, which opens it exactly once at the start of
/// the run. Open failures are fatal.
pub trait RowSource {
    type Stepper: Stepper;

    /// Open the underlying resource and return a stepper over its rows.
    fn open(&self) -> Result<Self::Stepper>;
}
