//! Semaphore bridge (`pthread` mode)
//!
//! The batch runner executes on a dedicated worker thread; a pair of
//! counting semaphores implements strict ping-pong turn-taking with the
//! controller thread:
//!
//! 1. Worker: wait on `in`, run one batch, publish, signal `out`.
//! 2. Controller: wait on `out`, inspect the round, then either signal
//!    `in` for the next round or finish.
//!
//! `in` starts signaled and `out` unsignaled, so at most one round is in
//! flight and the controller sees exactly one notification per round.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::bridge::{
    drive_worker, finish_failed, join_worker, spawn_worker, BatchRunner, RunReport, SharedRound,
    WorkerProtocol,
};
use crate::config::BridgeMode;
use crate::source::RowSource;
use crate::utils::{Result, Semaphore};

/// How often the controller wakes from its gate to check worker health.
const CONTROLLER_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Worker half of the semaphore pair: gated by `in`, announces on `out`.
struct SemaphorePair {
    sem_in: Arc<Semaphore>,
    sem_out: Arc<Semaphore>,
}

impl WorkerProtocol for SemaphorePair {
    fn wait_work(&self) {
        self.sem_in.acquire();
    }

    fn signal_done(&self) -> Result<()> {
        self.sem_out.release();
        Ok(())
    }
}

pub fn run<S>(source: S, batch_size: u64) -> Result<RunReport>
where
    S: RowSource + Send + 'static,
    S::Stepper: Send,
{
    let shared = Arc::new(Mutex::new(SharedRound::new()));
    let sem_in = Arc::new(Semaphore::new(1));
    let sem_out = Arc::new(Semaphore::new(0));

    let mut report = RunReport::new(BridgeMode::Semaphore);
    let start = Instant::now();

    let handle = {
        let shared = Arc::clone(&shared);
        let protocol = SemaphorePair {
            sem_in: Arc::clone(&sem_in),
            sem_out: Arc::clone(&sem_out),
        };
        let runner = BatchRunner::new(source, batch_size);
        spawn_worker("bridge-worker", move || {
            drive_worker(runner, &shared, &protocol)
        })?
    };

    let mut last = Instant::now();
    loop {
        if !sem_out.acquire_timeout(CONTROLLER_POLL_INTERVAL) {
            // No notification pending. A finished worker can only have
            // gone silently (panic before publishing); surface that
            // instead of waiting forever.
            if handle.is_finished() {
                return Err(finish_failed(&shared, handle));
            }
            continue;
        }

        let now = Instant::now();
        report.record_notification(now - last);
        last = now;

        let (state, failed) = {
            let round = shared.lock();
            (round.state, round.error.is_some())
        };
        if failed {
            return Err(finish_failed(&shared, handle));
        }
        if state.is_terminal() {
            break;
        }
        sem_in.release();
    }

    join_worker(handle)?;
    report.duration = start.elapsed();
    let round = shared.lock();
    report.rows = round.rows;
    report.rounds = round.rounds;
    Ok(report)
}
