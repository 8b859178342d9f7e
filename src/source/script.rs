//! Scripted in-memory row sources for bridge tests

use std::io;

use super::{RowSource, StepOutcome, Stepper};
use crate::utils::{Result, SourceError};

/// Deterministic source producing a fixed number of rows, with optional
/// injected failures.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    rows: u64,
    fail_open: bool,
    /// 1-based step call at which to report an error.
    fail_at_step: Option<u64>,
    panic_at_step: Option<u64>,
}

impl ScriptedSource {
    pub fn with_rows(rows: u64) -> Self {
        Self {
            rows,
            fail_open: false,
            fail_at_step: None,
            panic_at_step: None,
        }
    }

    pub fn failing_open() -> Self {
        Self {
            fail_open: true,
            ..Self::with_rows(0)
        }
    }

    pub fn failing_at_step(rows: u64, step: u64) -> Self {
        Self {
            fail_at_step: Some(step),
            ..Self::with_rows(rows)
        }
    }

    pub fn panicking_at_step(rows: u64, step: u64) -> Self {
        Self {
            panic_at_step: Some(step),
            ..Self::with_rows(rows)
        }
    }
}

impl RowSource for ScriptedSource {
    type Stepper = ScriptedStepper;

    fn open(&self) -> Result<ScriptedStepper> {
        if self.fail_open {
            return Err(SourceError::OpenFailed {
                path: "<scripted>".into(),
                source: io::Error::new(io::ErrorKind::NotFound, "injected open failure"),
            }
            .into());
        }

        Ok(ScriptedStepper {
            remaining: self.rows,
            calls: 0,
            fail_at_step: self.fail_at_step,
            panic_at_step: self.panic_at_step,
        })
    }
}

#[derive(Debug)]
pub struct ScriptedStepper {
    remaining: u64,
    calls: u64,
    fail_at_step: Option<u64>,
    panic_at_step: Option<u64>,
}

impl Stepper for ScriptedStepper {
    fn step(&mut self) -> Result<StepOutcome> {
        self.calls += 1;

        if self.panic_at_step == Some(self.calls) {
            panic!("injected stepper panic at call {}", self.calls);
        }
        if self.fail_at_step == Some(self.calls) {
            return Err(SourceError::StepFailed {
                rows: self.calls - 1,
                source: io::Error::new(io::ErrorKind::InvalidData, "injected step failure"),
            }
            .into());
        }

        if self.remaining > 0 {
            self.remaining -= 1;
            Ok(StepOutcome::Row)
        } else {
            Ok(StepOutcome::Exhausted)
        }
    }
}
