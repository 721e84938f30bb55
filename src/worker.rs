//! Deadlines for blocking work that cannot be interrupted.
//!
//! Work runs on a detached thread while the caller waits at most `timeout`.
//! A thread that misses its deadline is abandoned, not killed: it keeps its
//! slot until the work returns, so at most `limit` threads ever exist and
//! callers fail fast with [`RunError::Busy`] once they are all taken.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    Busy(usize),
    TimedOut(Duration),
    Failed(String),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Busy(limit) => write!(f, "all {} worker threads are busy", limit),
            RunError::TimedOut(timeout) => write!(f, "time budget of {:?} exceeded", timeout),
            RunError::Failed(msg) => write!(f, "worker failed: {}", msg),
        }
    }
}

/// Releases a worker slot when the thread holding it ends.
struct Slot(Arc<AtomicUsize>);

impl Drop for Slot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone)]
pub struct DeadlineRunner {
    name: &'static str,
    limit: usize,
    running: Arc<AtomicUsize>,
}

impl DeadlineRunner {
    pub fn new(name: &'static str, limit: usize) -> Self {
        Self {
            name,
            limit: limit.max(1),
            running: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Threads alive right now, abandoned ones included.
    pub fn running(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    pub fn run<T, F>(&self, timeout: Duration, work: F) -> Result<T, RunError>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        self.running
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| (n < self.limit).then_some(n + 1))
            .map_err(|_| RunError::Busy(self.limit))?;
        let slot = Slot(Arc::clone(&self.running));

        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name(self.name.into())
            .spawn(move || {
                let _slot = slot;
                let _ = tx.send(work());
            })
            .map_err(|e| RunError::Failed(e.to_string()))?;

        match rx.recv_timeout(timeout) {
            Ok(value) => Ok(value),
            Err(RecvTimeoutError::Timeout) => Err(RunError::TimedOut(timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(RunError::Failed(format!("{} thread panicked", self.name))),
        }
    }
}
