use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// A callback invoked on a fixed interval until cancelled, dropped, or until
/// the callback returns `false`. Ticks that fall behind are skipped rather
/// than bunched up.
pub struct RepeatingTask {
    handle: JoinHandle<()>,
    period: Duration,
}

impl RepeatingTask {
    /// Spawns onto the current tokio runtime. The first tick fires
    /// immediately. `period` must be non-zero.
    pub fn spawn<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if !on_tick() {
                    break;
                }
            }
        });
        RepeatingTask { handle, period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Stops scheduling further ticks. A tick already running completes.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for RepeatingTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn ticks_until_callback_returns_false() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let task = RepeatingTask::spawn(Duration::from_millis(100), move || {
            counter.fetch_add(1, Ordering::SeqCst) + 1 < 3
        });
        tokio::time::sleep(Duration::from_millis(1_000)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(task.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_ticks() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let task = RepeatingTask::spawn(Duration::from_millis(100), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });
        tokio::time::sleep(Duration::from_millis(250)).await;
        task.cancel();
        let seen = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(1_000)).await;
        assert_eq!(count.load(Ordering::SeqCst), seen);
        assert!(seen >= 2);
    }
}
