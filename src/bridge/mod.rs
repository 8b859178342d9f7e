//! Bridge strategies between the stepping worker and its controller
//!
//! Four interchangeable strategies drive the same [`BatchRunner`] to
//! completion and differ only in how batch completions reach the
//! controller:
//! - `sync`: no concurrency, reference for zero synchronization overhead
//! - `semaphore`: worker thread + semaphore pair, strict ping-pong
//! - `event_loop`: worker thread + wake into a mio poll loop, still
//!   strictly alternating
//! - `event_loop_mutex`: free-running worker, mutex-guarded state,
//!   advisory wakes

pub mod event_loop;
pub mod event_loop_mutex;
pub mod report;
pub mod runner;
pub mod semaphore;
pub mod sync;

use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use tracing::debug;

use crate::config::{BenchmarkConfig, BridgeMode};
use crate::source::{FileSource, RowSource};
use crate::utils::{BenchmarkError, Result};

pub use report::RunReport;
pub use runner::{BatchRunner, RunState};

/// Round record published by the worker after every batch.
///
/// `state` and `error` are what the controller acts on; `rounds` lets it
/// tell a fresh round apart from a spurious or coalesced wake-up, and
/// `rows` feeds the final report. For the strictly alternating bridges
/// the guarding mutex is uncontended by construction; for the mutex
/// bridge it is the protocol lock itself.
#[derive(Debug)]
pub(crate) struct SharedRound {
    pub state: RunState,
    pub rows: u64,
    pub rounds: u64,
    pub error: Option<BenchmarkError>,
}

impl SharedRound {
    pub fn new() -> Self {
        Self {
            state: RunState::Init,
            rows: 0,
            rounds: 0,
            error: None,
        }
    }
}

/// Publish one round's outcome. Returns `true` if the run is over.
///
/// A fatal error never surfaces as `Done`: the previous state is left in
/// place and the error is stored alongside it for the controller to take.
pub(crate) fn publish_round(
    shared: &Mutex<SharedRound>,
    result: Result<RunState>,
    rows: u64,
    rounds: u64,
) -> bool {
    let mut round = shared.lock();
    round.rows = rows;
    round.rounds = rounds;
    match result {
        Ok(state) => {
            round.state = state;
            state.is_terminal()
        }
        Err(err) => {
            round.error = Some(err);
            true
        }
    }
}

/// Worker-side half of a bridge's synchronization protocol.
///
/// The three threaded strategies run the identical worker loop
/// ([`drive_worker`]) and differ only in this object: how the worker is
/// gated before a round and how a finished round is announced.
pub(crate) trait WorkerProtocol: Send + 'static {
    /// Block until the controller has granted the next round.
    fn wait_work(&self);

    /// Announce a completed round to the controller.
    fn signal_done(&self) -> Result<()>;
}

/// Shared worker loop: gate, run one batch, publish, announce, repeat
/// until the terminal transition.
///
/// A failing announcement is recorded for the controller and ends the
/// loop; everything else the worker learns travels through the shared
/// round record.
pub(crate) fn drive_worker<S, P>(
    mut runner: BatchRunner<S>,
    shared: &Mutex<SharedRound>,
    protocol: &P,
) where
    S: RowSource,
    P: WorkerProtocol,
{
    loop {
        protocol.wait_work();
        let result = runner.run_batch();
        let terminal = publish_round(shared, result, runner.rows_total(), runner.rounds());
        if let Err(err) = protocol.signal_done() {
            shared.lock().error.get_or_insert(err);
            break;
        }
        if terminal {
            break;
        }
    }
}

/// Spawn a named worker thread.
pub(crate) fn spawn_worker<F>(name: &str, body: F) -> Result<JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    thread::Builder::new()
        .name(name.to_string())
        .spawn(body)
        .map_err(|err| BenchmarkError::Worker(format!("failed to spawn {name} thread: {err}")))
}

/// Join a worker, mapping a panic into a fatal error.
pub(crate) fn join_worker(handle: JoinHandle<()>) -> Result<()> {
    handle
        .join()
        .map_err(|_| BenchmarkError::Worker("worker thread panicked".to_string()))
}

/// Take the fatal error out of the shared record, if any, after joining
/// the worker. Join errors win only when the worker died silently.
pub(crate) fn finish_failed(shared: &Mutex<SharedRound>, handle: JoinHandle<()>) -> BenchmarkError {
    let join_result = join_worker(handle);
    if let Some(err) = shared.lock().error.take() {
        return err;
    }
    match join_result {
        Err(err) => err,
        Ok(()) => BenchmarkError::Worker("worker stopped without reporting a state".to_string()),
    }
}

/// Run one bridging session with the strategy selected in `config`.
///
/// Exactly one session per call: the bridge owns its synchronization
/// objects for the duration of the run and tears them down on the
/// terminal transition.
pub fn run_mode(config: &BenchmarkConfig) -> Result<RunReport> {
    debug!(
        "starting {} bridge over {} (batch size {})",
        config.mode.as_str(),
        config.path.display(),
        config.batch_size
    );

    let source = FileSource::new(&config.path);
    match config.mode {
        BridgeMode::Sync => sync::run(source),
        BridgeMode::Semaphore => semaphore::run(source, config.batch_size),
        BridgeMode::EventLoop => event_loop::run(source, config.batch_size),
        BridgeMode::EventLoopMutex => event_loop_mutex::run(source, config.batch_size),
    }
}
