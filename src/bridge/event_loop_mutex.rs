//! Free-running event-loop bridge (`uvpthreadcont` mode)
//!
//! Variant of the event-loop bridge with two differences: the shared
//! round record's mutex is the only synchronization (no semaphore pair),
//! and the worker never waits for the controller to acknowledge a round.
//! It publishes the round under the lock, sends a wake, and immediately
//! starts the next batch.
//!
//! Wakes can therefore be produced faster than the loop consumes them,
//! and the waker coalesces pending wakes into one delivery, so the
//! controller may observe fewer wake-ups than rounds. That is the
//! intended trade: the wake is advisory, and because the handler always
//! re-reads the record under the lock it still detects the terminal
//! state. The worker wakes after every round including the terminal one,
//! so at least one delivery always lands after `Done` is published.

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
use crate::utils::Result;

const WAKE: Token = Token(0);
const POLL_BACKSTOP: Duration = Duration::from_millis(100);

/// Worker half of the free-running protocol: never gated, announces by
/// waking the poll loop. The gate being a no-op is the whole point of
/// this mode; only the shared record's lock orders the two sides.
struct FreeRunningWake {
    waker: Arc<Waker>,
}

impl WorkerProtocol for FreeRunningWake {
    fn wait_work(&self) {
        // No acknowledgment wait: straight into the next batch.
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

    let mut report = RunReport::new(BridgeMode::EventLoopMutex);
    let start = Instant::now();

    let handle = {
        let shared = Arc::clone(&shared);
        let protocol = FreeRunningWake {
            waker: Arc::clone(&waker),
        };
        let runner = BatchRunner::new(source, batch_size);
        spawn_worker("bridge-worker", move || {
            drive_worker(runner, &shared, &protocol)
        })?
    };

    let mut last = Instant::now();
    loop {
        if let Err(err) = poll.poll(&mut events, Some(POLL_BACKSTOP)) {
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err.into());
        }

        let woken = events.iter().any(|event| event.token() == WAKE);
        if woken {
            // One wake delivery = one handler invocation, however many
            // worker rounds it coalesced.
            let now = Instant::now();
            report.record_notification(now - last);
            last = now;
        }

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
        if !woken && handle.is_finished() {
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
