//! Synchronous bridge (`base` mode)
//!
//! No worker thread, no synchronization objects: the batch runner
//! executes on the calling thread with an unbounded batch budget, so the
//! whole run is one uninterrupted stepping loop. This is the reference
//! point for zero synchronization overhead.

use std::time::Instant;

use crate::bridge::{BatchRunner, RunReport};
use crate::config::BridgeMode;
use crate::source::RowSource;
use crate::utils::Result;

pub fn run<S: RowSource>(source: S) -> Result<RunReport> {
    let mut runner = BatchRunner::new(source, u64::MAX);
    let mut report = RunReport::new(BridgeMode::Sync);
    let start = Instant::now();

    // With an unbounded budget a single round runs to exhaustion; the
    // loop only guards the degenerate case and keeps the terminal
    // handling identical to the threaded bridges.
    loop {
        let state = runner.run_batch()?;
        if state.is_terminal() {
            break;
        }
    }

    report.duration = start.elapsed();
    report.rows = runner.rows_total();
    report.rounds = runner.rounds();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::script::ScriptedSource;

    #[test]
    fn test_runs_to_completion_in_one_round() {
        let report = run(ScriptedSource::with_rows(1000)).unwrap();
        assert_eq!(report.rows, 1000);
        assert_eq!(report.rounds, 1);
        assert_eq!(report.notifications, 0);
    }

    #[test]
    fn test_empty_source_completes() {
        let report = run(ScriptedSource::with_rows(0)).unwrap();
        assert_eq!(report.rows, 0);
        assert_eq!(report.rounds, 1);
    }

    #[test]
    fn test_step_error_propagates() {
        let err = run(ScriptedSource::failing_at_step(10, 3)).unwrap_err();
        assert!(err.to_string().contains("Row step failed"));
    }

    #[test]
    fn test_open_error_propagates() {
        let err = run(ScriptedSource::failing_open()).unwrap_err();
        assert!(err.to_string().contains("Failed to open row source"));
    }
}
