//! Batch-stepping state machine shared by every bridge
//!
//! One `run_batch` call is the unit of work per synchronization round:
//! it advances the run through `Init -> Continue -> (Continue)* -> Done`,
//! stepping the row source up to `batch_size` times per round. All four
//! bridge strategies drive this same machine and differ only in how the
//! resulting state is communicated to the controller.

use crate::source::{RowSource, StepOutcome, Stepper};
use crate::utils::Result;

/// Controller-visible run state.
///
/// Strictly monotonic: `Init` is observed exactly once (by the worker, as
/// the state it starts from), `Continue` repeats once per non-final
/// round, `Done` is terminal and absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    Continue,
    Done,
}

impl RunState {
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Done)
    }
}

/// Internal state, carrying the opened stepper by ownership.
///
/// Dropping the `Continue` payload closes the underlying resource, so the
/// transitions to `Done` double as cleanup.
enum RunnerState<T> {
    Init,
    Continue(T),
    Done,
}

/// How a `Continue` round ended.
enum BatchEnd {
    BudgetSpent,
    Exhausted,
    Failed(crate::utils::BenchmarkError),
}

/// Drives a [`RowSource`] to completion in bounded batches.
pub struct BatchRunner<S: RowSource> {
    source: S,
    batch_size: u64,
    state: RunnerState<S::Stepper>,
    rows_total: u64,
    rounds: u64,
}

impl<S: RowSource> BatchRunner<S> {
    /// Create a runner stepping at most `batch_size` rows per round.
    ///
    /// # Panics
    ///
    /// Panics if `batch_size` is 0: a zero budget would spin forever
    /// without progress. Configuration validation rejects this before a
    /// runner is ever built.
    pub fn new(source: S, batch_size: u64) -> Self {
        assert!(batch_size >= 1, "batch_size must be positive");
        Self {
            source,
            batch_size,
            state: RunnerState::Init,
            rows_total: 0,
            rounds: 0,
        }
    }

    /// Total rows stepped so far.
    #[inline]
    pub fn rows_total(&self) -> u64 {
        self.rows_total
    }

    /// Rounds executed so far (terminal no-op calls not counted).
    #[inline]
    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    /// Execute one round and return the resulting state.
    ///
    /// `Init` opens the source and falls through into its first batch in
    /// the same call, so the open cost is absorbed into the first round
    /// rather than spending a synchronization round of its own. Once the
    /// run is `Done` this is an idempotent no-op.
    ///
    /// A step or open error tears the stepper down and is returned to the
    /// caller; the caller treats it as fatal for the whole run.
    pub fn run_batch(&mut self) -> Result<RunState> {
        if let RunnerState::Init = self.state {
            let stepper = self.source.open()?;
            self.state = RunnerState::Continue(stepper);
        }

        let RunnerState::Continue(stepper) = &mut self.state else {
            return Ok(RunState::Done);
        };

        self.rounds += 1;

        let mut rows = 0u64;
        let mut end = BatchEnd::BudgetSpent;
        while rows < self.batch_size {
            match stepper.step() {
                Ok(StepOutcome::Row) => rows += 1,
                Ok(StepOutcome::Exhausted) => {
                    end = BatchEnd::Exhausted;
                    break;
                }
                Err(err) => {
                    end = BatchEnd::Failed(err);
                    break;
                }
            }
        }
        self.rows_total += rows;

        match end {
            BatchEnd::BudgetSpent => Ok(RunState::Continue),
            BatchEnd::Exhausted => {
                self.state = RunnerState::Done;
                Ok(RunState::Done)
            }
            BatchEnd::Failed(err) => {
                self.state = RunnerState::Done;
                Err(err)
            }
        }
    }
}
