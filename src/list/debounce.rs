//! Debounced search input.
//!
//! Raw keystrokes go into a `watch` channel. A background task waits for the
//! first change, keeps extending the idle window while further changes arrive,
//! and commits the latest raw value once the window elapses.
//!
//! Commits run as their own tasks so a slow commit never holds back the next
//! one. They are aborted together with the debouncer.

use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};

/// Default idle window before a search commits
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Owns the debounce task; dropping it cancels any pending commit.
pub struct Debouncer {
    tx: watch::Sender<String>,
    task: JoinHandle<()>,
}

impl Debouncer {
    /// Start the debounce task. Must be called inside a tokio runtime.
    pub fn spawn<F>(delay: Duration, on_commit: F) -> Self
    where
        F: Fn(String) -> BoxFuture<'static, ()> + Send + Sync + 'static,
    {
        let (tx, rx) = watch::channel(String::new());
        let task = tokio::spawn(run_debounce_loop(rx, delay, on_commit));
        Self { tx, task }
    }

    /// Record a raw keystroke value. Never blocks.
    pub fn set(&self, raw: impl Into<String>) {
        self.tx.send_replace(raw.into());
    }

    /// The latest raw value, committed or not
    pub fn raw(&self) -> String {
        self.tx.borrow().clone()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_debounce_loop<F>(mut rx: watch::Receiver<String>, delay: Duration, on_commit: F)
where
    F: Fn(String) -> BoxFuture<'static, ()> + Send + Sync + 'static,
{
    let mut commits = JoinSet::new();
    loop {
        // Wait for the first change of a new burst
        if rx.changed().await.is_err() {
            return;
        }

        // Extend the window while changes keep arriving
        loop {
            match tokio::time::timeout(delay, rx.changed()).await {
                Ok(Ok(())) => continue,
                Ok(Err(_)) => return,
                Err(_) => break,
            }
        }

        let value = rx.borrow_and_update().clone();
        tracing::debug!(value = %value, "debounced search committed");
        while commits.try_join_next().is_some() {}
        commits.spawn(on_commit(value));
    }
}
