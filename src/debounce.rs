//! Coalescing of rapid value changes.

use std::time::Duration;
use tokio::time::{Instant, sleep_until};

/// Quiet period after which a burst of limit edits is applied.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(300);

/// Trailing-edge coalescer: of a burst of pushed values only the last one is
/// delivered, once a full window has passed without another push.
///
/// The pending value lives in the coalescer, not in the future returned by
/// [`Coalescer::settled`], so dropping that future (e.g. a losing
/// `tokio::select!` branch) loses nothing.
pub struct Coalescer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Coalescer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Replace any pending value and restart the window.
    pub fn push(&mut self, value: T) {
        self.pending = Some((value, Instant::now() + self.window));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending value without waiting for the window.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    /// Wait for the pending value to settle. Never resolves while idle.
    pub async fn settled(&mut self) -> T {
        loop {
            match self.pending.as_ref().map(|(_, deadline)| *deadline) {
                Some(deadline) => {
                    sleep_until(deadline).await;
                    if let Some(value) = self.flush() {
                        return value;
                    }
                }
                None => std::future::pending::<()>().await,
            }
        }
    }
}

impl<T> Default for Coalescer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}
