//! Debounced persistence.
//!
//! Mutations call [`PersistScheduler::schedule`]. A background task waits
//! until no new request has arrived for the debounce delay and then runs the
//! write once, so a burst of mutations costs a single storage write.

use std::future::Future;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use super::storage::StorageError;

/// Configuration for debounced persistence.
#[derive(Debug, Clone)]
pub struct PersistConfig {
    /// Quiet period after the last mutation before writing.
    pub debounce: Duration,
}

impl PersistConfig {
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
        }
    }
}

enum Command {
    Schedule,
    Flush(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<()>),
}

/// Handle to a debounced writer task. Clones share the task.
#[derive(Debug, Clone)]
pub struct PersistScheduler {
    tx: mpsc::UnboundedSender<Command>,
}

impl PersistScheduler {
    /// Spawn the writer task. Must be called inside a tokio runtime.
    ///
    /// `write` takes a fresh snapshot of the whole state and stores it.
    pub fn spawn<F, Fut>(debounce: Duration, write: F) -> Self
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), StorageError>> + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(rx, debounce, write));
        Self { tx }
    }

    /// Request a write after the debounce delay, restarting the delay if a
    /// write is already pending.
    pub fn schedule(&self) {
        if self.tx.send(Command::Schedule).is_err() {
            debug!("persist requested after shutdown");
        }
    }

    /// Write any pending state now and wait for it to finish.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(Command::Flush(ack)).is_ok() {
            let _ = done.await;
        }
    }

    /// Write any pending state and stop the task. Later requests are ignored.
    pub async fn shutdown(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(Command::Shutdown(ack)).is_ok() {
            let _ = done.await;
        }
    }
}

async fn run<F, Fut>(mut rx: mpsc::UnboundedReceiver<Command>, debounce: Duration, write: F)
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<(), StorageError>>,
{
    // `pending`: a write is scheduled and the timer is running.
    // `dirty`: the last write failed, so the next flush must retry it.
    let mut pending = false;
    let mut dirty = false;

    let attempt = |dirty: &mut bool, result: Result<(), StorageError>| match result {
        Ok(()) => *dirty = false,
        Err(e) => {
            warn!(error = %e, "failed to persist navigation state");
            *dirty = true;
        }
    };

    loop {
        let command = if pending {
            tokio::select! {
                command = rx.recv() => command,
                _ = tokio::time::sleep(debounce) => {
                    pending = false;
                    attempt(&mut dirty, write().await);
                    continue;
                }
            }
        } else {
            rx.recv().await
        };

        match command {
            Some(Command::Schedule) => pending = true,
            Some(Command::Flush(ack)) => {
                if pending || dirty {
                    pending = false;
                    attempt(&mut dirty, write().await);
                }
                let _ = ack.send(());
            }
            Some(Command::Shutdown(ack)) => {
                if pending || dirty {
                    attempt(&mut dirty, write().await);
                }
                let _ = ack.send(());
                break;
            }
            None => {
                if pending || dirty {
                    attempt(&mut dirty, write().await);
                }
                break;
            }
        }
    }
    debug!("persist scheduler stopped");
}
