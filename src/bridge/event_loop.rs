//! Event-loop bridge (`uvpthread` mode)
//!
//! The worker thread is gated by an input semaphore exactly as in the
//! semaphore bridge, but batch completions are announced through a
//! `mio::Waker` into a poll loop instead of an output semaphore. The
//! controller blocks only inside the loop's wait, which keeps it
//! compatible with other loop-driven work.
//!
//! The input gate is re-signaled only from inside the wake handling, so
//! the worker cannot start a round before the controller has processed
//! the previous one: the same at-most-one-round-in-flight property as
//! the semaphore bridge. The waker coalesces, so the handler re-reads
//! the round record and uses its counter to tell fresh rounds from
//! spurious deliveries.

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use mio::{Events, Poll, Token, Waker};
use parking_lot::Mutex;

use crate::bridge::{
    drive_worker, finish_failed, join_worker, spawn_worker, BatchRunner, RunReport, SharedRound,
    WorkerProtocol,
};
use crate::config::BridgeMode;
use crate::source::RowSource;
use crate::utils::{Result, Semaphore};

/// Registration token for the wake handle.
const WAKE: Token = Token(0);

/// Poll backstop so a silently dead worker cannot strand the loop.
const POLL_BACKSTOP: Duration = Duration::from_millis(100);

/// Worker half of the loop protocol: gated by `in`, announces by waking
/// the poll loop.
struct WakeGate {
    sem_in: Arc<Semaphore>,
    waker: Arc<Waker>,
}

impl WorkerProtocol for WakeGate {
    fn wait_work(&self) {
        self.sem_in.acquire();
    }

    fn signal_done(&self) -> Result<()> {
        self.waker.wake().map_err(Into::into)
    }
}

pub fn run<S>(source: S, batch_size: u64) -> Result<RunReport>
where
    S: RowSource + Send + 'static,
    S::Stepper: Send,
{
    let mut poll = Poll::new()?;
    let waker = Arc::new(Waker::new(poll.registry(), WAKE)?);
    let mut events = Events::with_capacity(8);

    let shared = Arc::new(Mutex::new(SharedRound::new()));
    let sem_in = Arc::new(Semaphore::new(1));

    let mut report = RunReport::new(BridgeMode::EventLoop);
    let start = Instant::now();

    let handle = {
        let shared = Arc::clone(&shared);
        let protocol = WakeGate {
            sem_in: Arc::clone(&sem_in),
            waker: Arc::clone(&waker),
        };
        let runner = BatchRunner::new(source, batch_size);
        spawn_worker("bridge-worker", move || {
            drive_worker(runner, &shared, &protocol)
        })?
    };

    let mut acked_rounds = 0u64;
    let mut last = Instant::now();
    loop {
        if let Err(err) = poll.poll(&mut events, Some(POLL_BACKSTOP)) {
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err.into());
        }

        // Wake handler: re-read the record whether we were woken or the
        // backstop fired; the round counter filters both coalesced and
        // spurious passes.
        let (state, rounds, failed) = {
            let round = shared.lock();
            (round.state, round.rounds, round.error.is_some())
        };
        if failed {
            return Err(finish_failed(&shared, handle));
        }

        if rounds > acked_rounds {
            let now = Instant::now();
            report.record_notification(now - last);
            last = now;
            acked_rounds = rounds;

            if state.is_terminal() {
                break;
            }
            sem_in.release();
        } else if handle.is_finished() {
            return Err(finish_failed(&shared, handle));
        }
    }

    join_worker(handle)?;
    report.duration = start.elapsed();
    let round = shared.lock();
    report.rows = round.rows;
    report.rounds = round.rounds;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::script::ScriptedSource;

    #[test]
    fn test_five_rows_batch_two_notifies_three_times() {
        let report = run(ScriptedSource::with_rows(5), 2).unwrap();
        assert_eq!(report.rows, 5);
        assert_eq!(report.rounds, 3);
        assert_eq!(report.notifications, 3);
    }

    #[test]
    fn test_empty_source_notifies_once() {
        let report = run(ScriptedSource::with_rows(0), 4).unwrap();
        assert_eq!(report.rows, 0);
        assert_eq!(report.notifications, 1);
    }

    #[test]
    fn test_batch_larger_than_total_notifies_once() {
        let report = run(ScriptedSource::with_rows(3), 64).unwrap();
        assert_eq!(report.rows, 3);
        assert_eq!(report.notifications, 1);
    }

    #[test]
    fn test_long_run_notification_count() {
        let report = run(ScriptedSource::with_rows(1000), 7).unwrap();
        assert_eq!(report.rows, 1000);
        assert_eq!(report.notifications, 143);
    }

    #[test]
    fn test_step_error_is_fatal() {
        let err = run(ScriptedSource::failing_at_step(10, 3), 2).unwrap_err();
        assert!(err.to_string().contains("Row step failed"));
    }

    #[test]
    fn test_open_error_is_fatal() {
        let err = run(ScriptedSource::failing_open(), 2).unwrap_err();
        assert!(err.to_string().contains("Failed to open row source"));
    }

    #[test]
    fn test_worker_panic_surfaces_as_error() {
        let err = run(ScriptedSource::panicking_at_step(10, 3), 2).unwrap_err();
        assert!(err.to_string().contains("worker thread panicked"));
    }
}
