//! Counting semaphore for worker/controller turn-taking
//!
//! The bridge protocols need a classic blocking semaphore pair. Uses
//! Mutex + Condvar (not atomics) because:
//! - The waits bracket rounds of blocking row I/O, so the semaphore is
//!   never the hot path
//! - Condvar provides efficient blocking (no spin-wait)

use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Blocking counting semaphore.
///
/// Safe to share across threads via `Arc<Semaphore>`. The bridges use
/// pairs of these with initial counts 1 (`in`, worker gate) and 0
/// (`out`, controller gate), which bounds each to 0/1 by construction.
#[derive(Debug)]
pub struct Semaphore {
    permits: Mutex<usize>,
    cv: Condvar,
}

impl Semaphore {
    /// Create a semaphore holding `permits` initial permits.
    pub fn new(permits: usize) -> Self {
        Self {
            permits: Mutex::new(permits),
            cv: Condvar::new(),
        }
    }

    /// Lock the permit count with poison recovery.
    ///
    /// A panicking holder must not strand the peer thread; the count
    /// itself is always valid, so the poisoned state can be recovered.
    fn lock_permits(&self) -> MutexGuard<'_, usize> {
        match self.permits.lock() {
            Ok(guard) => guard,
            Err(poison) => poison.into_inner(),
        }
    }

    /// Block until a permit is available, then take it.
    pub fn acquire(&self) {
        let mut permits = self.lock_permits();
        while *permits == 0 {
            permits = match self.cv.wait(permits) {
                Ok(guard) => guard,
                Err(poison) => poison.into_inner(),
            };
        }
        *permits -= 1;
    }

    /// Take a permit, waiting at most `timeout`.
    ///
    /// Returns `true` if a permit was taken. Used by controller loops so
    /// they can periodically check whether the worker is still alive.
    pub fn acquire_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut permits = self.lock_permits();

        while *permits == 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            let (guard, result) = match self.cv.wait_timeout(permits, remaining) {
                Ok(pair) => pair,
                Err(poison) => poison.into_inner(),
            };
            permits = guard;
            if result.timed_out() && *permits == 0 {
                return false;
            }
        }

        *permits -= 1;
        true
    }

    /// Release one permit.
    pub fn release(&self) {
        let mut permits = self.lock_permits();
        *permits += 1;
        self.cv.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_initial_permits() {
        let sem = Semaphore::new(1);
        sem.acquire();
        assert!(!sem.acquire_timeout(Duration::from_millis(10)));
        sem.release();
        assert!(sem.acquire_timeout(Duration::from_millis(10)));
    }

    #[test]
    fn test_release_unblocks_waiter() {
        let sem = Arc::new(Semaphore::new(0));
        let waiter = {
            let sem = Arc::clone(&sem);
            thread::spawn(move || sem.acquire())
        };
        sem.release();
        waiter.join().unwrap();
    }

    #[test]
    fn test_ping_pong_alternation() {
        let sem_in = Arc::new(Semaphore::new(1));
        let sem_out = Arc::new(Semaphore::new(0));
        let rounds = 100;

        let worker = {
            let sem_in = Arc::clone(&sem_in);
            let sem_out = Arc::clone(&sem_out);
            thread::spawn(move || {
                for _ in 0..rounds {
                    sem_in.acquire();
                    sem_out.release();
                }
            })
        };

        for _ in 0..rounds {
            sem_out.acquire();
            sem_in.release();
        }
        worker.join().unwrap();

        // Both gates are back at their post-round counts: out drained,
        // in holding the final release.
        assert!(!sem_out.acquire_timeout(Duration::from_millis(10)));
        assert!(sem_in.acquire_timeout(Duration::from_millis(10)));
    }

    #[test]
    fn test_acquire_timeout_expires() {
        let sem = Semaphore::new(0);
        let start = Instant::now();
        assert!(!sem.acquire_timeout(Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
