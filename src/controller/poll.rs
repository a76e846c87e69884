//! Auto-refresh status poller
//!
//! One repeating timer in a spawned task. Starting cancels any prior timer;
//! stopping cancels the timer cooperatively, so an in-flight fetch finishes
//! and may deliver at most one more result. Failed cycles are logged and
//! otherwise ignored.

use crate::controller::manager::ControllerEvent;
use crate::error::ControllerError;
use giza_shared::DeviceStatus;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Owns the single auto-refresh timer
#[derive(Default)]
pub struct StatusPoller {
    cancel: Option<CancellationToken>,
}

impl StatusPoller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a poll timer is currently live
    pub fn is_running(&self) -> bool {
        self.cancel.is_some()
    }

    /// Start polling, replacing any prior timer.
    ///
    /// `fetch` is called once per cycle; successful results are reported on
    /// `events`. The fetch is injected so the cadence can be tested without
    /// a device.
    pub fn start<F, Fut>(
        &mut self,
        interval: Duration,
        fetch: F,
        events: mpsc::Sender<ControllerEvent>,
    ) where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<DeviceStatus, ControllerError>> + Send + 'static,
    {
        self.stop();

        let token = CancellationToken::new();
        self.cancel = Some(token.clone());

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first interval tick is immediate; consume it so the first
            // fetch lands one full period after the toggle, like a plain
            // repeating timer.
            ticker.tick().await;

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => match fetch().await {
                        Ok(status) => {
                            if events.send(ControllerEvent::StatusUpdated(status)).await.is_err() {
                                break;
                            }
                        }
                        Err(err) => debug!("Refresh cycle failed: {}", err),
                    },
                }
            }
        });
    }

    /// Cancel the timer. In-flight fetches are not aborted; their results
    /// are simply the last to arrive.
    pub fn stop(&mut self) {
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    const INTERVAL: Duration = Duration::from_millis(1500);

    fn counting_fetch(counter: Arc<AtomicU32>) -> impl Fn() -> std::pin::Pin<Box<dyn Future<Output = Result<DeviceStatus, ControllerError>> + Send>> {
        move || {
            let counter = counter.clone();
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(DeviceStatus::default())
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_reports_each_cycle() {
        let (tx, mut rx) = mpsc::channel(16);
        let counter = Arc::new(AtomicU32::new(0));
        let mut poller = StatusPoller::new();

        poller.start(INTERVAL, counting_fetch(counter.clone()), tx);
        for _ in 0..3 {
            let event = rx.recv().await.unwrap();
            assert!(matches!(event, ControllerEvent::StatusUpdated(_)));
        }
        assert!(counter.load(Ordering::SeqCst) >= 3);
        assert!(poller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_ends_fetching() {
        let (tx, mut rx) = mpsc::channel(64);
        let counter = Arc::new(AtomicU32::new(0));
        let mut poller = StatusPoller::new();

        poller.start(INTERVAL, counting_fetch(counter.clone()), tx);
        rx.recv().await.unwrap();
        poller.stop();
        assert!(!poller.is_running());

        // One already-selected cycle may still land, then nothing.
        tokio::time::sleep(INTERVAL * 10).await;
        let settled = counter.load(Ordering::SeqCst);
        tokio::time::sleep(INTERVAL * 10).await;
        assert_eq!(counter.load(Ordering::SeqCst), settled);
        assert!(settled <= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_replaces_prior_timer() {
        let (tx, mut rx) = mpsc::channel(64);
        let first = Arc::new(AtomicU32::new(0));
        let second = Arc::new(AtomicU32::new(0));
        let mut poller = StatusPoller::new();

        poller.start(INTERVAL, counting_fetch(first.clone()), tx.clone());
        poller.start(INTERVAL, counting_fetch(second.clone()), tx);

        for _ in 0..3 {
            rx.recv().await.unwrap();
        }

        // Only the replacement timer fetched; the first was cancelled
        // before its initial cycle came due.
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert!(second.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test]
    async fn test_stop_without_start_is_noop() {
        let mut poller = StatusPoller::new();
        poller.stop();
        assert!(!poller.is_running());
    }
}
