//! Periodic background refresh.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// A cache that can rebuild itself from upstream.
///
/// `refresh` must swallow its own per-item failures; the scheduler only
/// measures and logs the pass.
#[async_trait]
pub trait Refreshable: Send + Sync + 'static {
    /// Short name used in logs.
    fn label(&self) -> &str;

    async fn refresh(&self);
}

/// One background loop driving a single [`Refreshable`].
///
/// The first tick is skipped: the startup pass has already filled the cache.
/// A tick that overruns delays the next one instead of bursting.
pub struct RefreshScheduler {
    label: String,
    handle: JoinHandle<()>,
}

impl RefreshScheduler {
    /// Spawn the loop. It exits once `shutdown` carries `true` or its sender is dropped.
    pub fn spawn(
        job: Arc<dyn Refreshable>,
        interval: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) -> Self {
        let label = job.label().to_string();
        let task_label = label.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            info!(job = %task_label, interval_secs = interval.as_secs(), "Refresh scheduler started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let started = Instant::now();
                        job.refresh().await;
                        info!(
                            job = %task_label,
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            "Refresh tick finished"
                        );
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }

            debug!(job = %task_label, "Refresh scheduler stopped");
        });

        Self { label, handle }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the loop to exit after shutdown was signalled.
    pub async fn join(self) {
        if let Err(e) = self.handle.await {
            tracing::error!(job = %self.label, error = %e, "Refresh scheduler task failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter {
        ticks: AtomicUsize,
    }

    #[async_trait]
    impl Refreshable for Counter {
        fn label(&self) -> &str {
            "counter"
        }

        async fn refresh(&self) {
            self.ticks.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_on_interval_after_skipping_first() {
        let counter = Arc::new(Counter { ticks: AtomicUsize::new(0) });
        let (tx, rx) = watch::channel(false);
        let scheduler = RefreshScheduler::spawn(counter.clone(), Duration::from_secs(600), rx);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(counter.ticks.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(1500)).await;
        assert_eq!(counter.ticks.load(Ordering::SeqCst), 2);

        tx.send(true).unwrap();
        scheduler.join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_loop() {
        let counter = Arc::new(Counter { ticks: AtomicUsize::new(0) });
        let (tx, rx) = watch::channel(false);
        let scheduler = RefreshScheduler::spawn(counter.clone(), Duration::from_secs(60), rx);
        assert_eq!(scheduler.label(), "counter");

        tx.send(true).unwrap();
        scheduler.join().await;

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(counter.ticks.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_sender_stops_loop() {
        let counter = Arc::new(Counter { ticks: AtomicUsize::new(0) });
        let (tx, rx) = watch::channel(false);
        let scheduler = RefreshScheduler::spawn(counter, Duration::from_secs(60), rx);

        drop(tx);
        scheduler.join().await;
    }
}
