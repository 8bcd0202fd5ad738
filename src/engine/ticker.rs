//! Live-adjustable rotation ticker.
//!
//! The ticker is created once and re-armed in place whenever the interval
//! changes. A zero interval pauses it: `tick` blocks on a change
//! notification instead of polling until the interval becomes non-zero
//! again. Interval updates use a watch channel so a change can never be
//! lost between reading the interval and starting to wait.

use std::time::Duration;

use tokio::sync::watch;
use tracing::debug;

/// Shared, resettable interval timer.
#[derive(Debug)]
pub struct Ticker {
    interval: watch::Sender<Duration>,
}

impl Ticker {
    /// Create a ticker. A zero `interval` starts it paused.
    pub fn new(interval: Duration) -> Self {
        let (tx, _rx) = watch::channel(interval);
        Self { interval: tx }
    }

    /// The currently configured interval.
    pub fn interval(&self) -> Duration {
        *self.interval.borrow()
    }

    /// True when the ticker is stopped (interval of zero).
    pub fn is_paused(&self) -> bool {
        self.interval().is_zero()
    }

    /// Re-arm the ticker with a new interval.
    ///
    /// Zero pauses it. Setting the same value again, or pausing an already
    /// paused ticker, is a safe no-op for waiters: they re-read the interval
    /// and wait out the full new duration.
    pub fn set(&self, interval: Duration) {
        debug!(interval_secs = interval.as_secs(), "ticker re-armed");
        self.interval.send_replace(interval);
    }

    /// Wait for the next tick.
    ///
    /// Completes after one full interval has elapsed without an interval
    /// change. Changes re-arm the wait; a zero interval suspends it until
    /// the ticker is re-armed with a non-zero interval.
    pub async fn tick(&self) {
        let mut rx = self.interval.subscribe();
        loop {
            let interval = *rx.borrow_and_update();

            if interval.is_zero() {
                // Paused. The sender lives as long as self, so changed()
                // cannot fail while we are borrowed from it.
                if rx.changed().await.is_err() {
                    return;
                }
                continue;
            }

            tokio::select! {
                () = tokio::time::sleep(interval) => return,
                changed = rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    // Interval changed mid-wait: re-arm with the new value.
                }
            }
        }
    }
}
