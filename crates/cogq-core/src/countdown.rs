//! Quiz countdown.
//!
//! A background task ticks once per second, publishes the remaining time, and
//! raises an expiry flag when it reaches zero. Cancelling it (or dropping the
//! handle) stops the task, so a finished quiz never sees a late expiry.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tokio_util::sync::CancellationToken;

const TICK: Duration = Duration::from_secs(1);

/// Handle to a running countdown
///
/// Must be started inside a tokio runtime.
#[derive(Debug)]
pub struct Countdown {
    token: CancellationToken,
    remaining: watch::Receiver<u64>,
    expired: watch::Receiver<bool>,
    handle: JoinHandle<()>,
}

impl Countdown {
    /// Start counting down from `duration`, rounded up to whole seconds.
    pub fn start(duration: Duration) -> Self {
        let total = duration.as_secs() + u64::from(duration.subsec_nanos() > 0);
        let token = CancellationToken::new();
        let (remaining_tx, remaining) = watch::channel(total);
        let (expired_tx, expired) = watch::channel(total == 0);

        let handle = tokio::spawn(run_countdown(
            total,
            token.clone(),
            remaining_tx,
            expired_tx,
        ));

        Self {
            token,
            remaining,
            expired,
            handle,
        }
    }

    /// Seconds left on the clock.
    pub fn remaining_secs(&self) -> u64 {
        *self.remaining.borrow()
    }

    /// Receiver for the remaining seconds, updated every tick.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.remaining.clone()
    }

    pub fn is_expired(&self) -> bool {
        *self.expired.borrow()
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves when time runs out. Never resolves for a cancelled countdown.
    pub async fn expired(&mut self) {
        if self.token.is_cancelled() {
            return std::future::pending().await;
        }

        if self.expired.wait_for(|expired| *expired).await.is_err() {
            // Task stopped without expiring, i.e. cancelled.
            std::future::pending::<()>().await;
        }
    }

    pub fn cancel(&self) {
        if !self.token.is_cancelled() {
            tracing::debug!(remaining = self.remaining_secs(), "Countdown cancelled");
            self.token.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn run_countdown(
    total: u64,
    token: CancellationToken,
    remaining_tx: watch::Sender<u64>,
    expired_tx: watch::Sender<bool>,
) {
    let mut ticker = interval_at(Instant::now() + TICK, TICK);
    let mut left = total;

    while left > 0 {
        tokio::select! {
            () = token.cancelled() => return,
            _ = ticker.tick() => {
                left -= 1;
                remaining_tx.send_replace(left);
            }
        }
    }

    tracing::info!(total_secs = total, "Quiz time expired");
    expired_tx.send_replace(true);
}
