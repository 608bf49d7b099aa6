//! Bounded monotonic progress counters for indeterminate-duration work
//!
//! Size checks and store writes give no real completion signal, so the UI
//! progress bars are driven by a ticker that steps a value towards a cap
//! below 100. The owning operation sets 100 explicitly on success; on
//! failure or cancellation the value is simply discarded. Stopping the
//! handle joins the ticker task, so no tick is ever delivered after
//! `stop()` returns.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

/// Ticker profile: step size, cap, and tick interval
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSimulator {
    step: u8,
    cap: u8,
    interval: Duration,
}

impl ProgressSimulator {
    pub fn new(step: u8, cap: u8, interval: Duration) -> Self {
        Self {
            step,
            cap,
            interval,
        }
    }

    /// Profile used while verifying a file size (10%/tick, capped at 90%)
    pub fn checking() -> Self {
        Self::new(10, 90, Duration::from_millis(300))
    }

    /// Profile used while a store write is in flight (10%/tick, capped at 90%)
    pub fn uploading() -> Self {
        Self::new(10, 90, Duration::from_millis(500))
    }

    /// Start ticking into `values`, resetting it to 0 first
    ///
    /// The returned handle must be stopped (or dropped) when the owning
    /// operation finishes; the value never reaches the cap on its own.
    pub fn start(&self, values: Arc<watch::Sender<u8>>) -> ProgressHandle {
        let step = self.step;
        let cap = self.cap;
        let period = self.interval;
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let _ = values.send(0);
            let mut ticker = tokio::time::interval(period);
            // interval fires immediately; the first step should come one period in
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        let next = values.borrow().saturating_add(step).min(cap);
                        let _ = values.send(next);
                    }
                }
            }
        });

        ProgressHandle {
            stop: Some(stop_tx),
            task: Some(task),
        }
    }
}

/// Handle reclaiming a running ticker
pub struct ProgressHandle {
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl ProgressHandle {
    /// Stop ticking; after this returns no further value is delivered
    pub async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for ProgressHandle {
    fn drop(&mut self) {
        // Teardown safety: a dropped handle must not leave a ticker
        // mutating the value channel behind the owner's back.
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    fn channel() -> (Arc<watch::Sender<u8>>, watch::Receiver<u8>) {
        let (tx, rx) = watch::channel(0u8);
        (Arc::new(tx), rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_steps_on_each_tick() {
        let (tx, rx) = channel();
        let handle = ProgressSimulator::checking().start(tx);

        sleep(Duration::from_millis(1550)).await;
        assert_eq!(*rx.borrow(), 50);

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_exceeds_cap_while_active() {
        let (tx, rx) = channel();
        let handle = ProgressSimulator::uploading().start(tx);

        sleep(Duration::from_secs(30)).await;
        assert_eq!(*rx.borrow(), 90);

        sleep(Duration::from_secs(30)).await;
        assert_eq!(*rx.borrow(), 90);

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_ticks_after_stop() {
        let (tx, rx) = channel();
        let handle = ProgressSimulator::checking().start(tx.clone());

        sleep(Duration::from_millis(950)).await;
        handle.stop().await;
        let frozen = *rx.borrow();

        sleep(Duration::from_secs(10)).await;
        assert_eq!(*rx.borrow(), frozen);

        // the owner finalizes explicitly on success
        let _ = tx.send(100);
        assert_eq!(*rx.borrow(), 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_ticker() {
        let (tx, rx) = channel();
        let handle = ProgressSimulator::checking().start(tx);

        sleep(Duration::from_millis(650)).await;
        let before = *rx.borrow();
        drop(handle);

        // let the abort take effect before advancing time
        tokio::task::yield_now().await;
        sleep(Duration::from_secs(10)).await;
        assert_eq!(*rx.borrow(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resets_to_zero_on_start() {
        let (tx, rx) = channel();
        let _ = tx.send(77);

        let handle = ProgressSimulator::checking().start(tx);
        tokio::task::yield_now().await;
        assert_eq!(*rx.borrow(), 0);

        handle.stop().await;
    }
}
