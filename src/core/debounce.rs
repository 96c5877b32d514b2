use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::trace;

/// Quiet period used for search input unless configured otherwise.
pub const DEFAULT_SEARCH_DELAY: Duration = Duration::from_millis(300);

/// Delays a task until input has been quiet for `delay`.
///
/// At most one task is pending. Scheduling another aborts the pending one,
/// so only the last of a burst runs. Must be used inside a tokio runtime.
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancels any pending task and schedules `task` to run after the delay.
    pub fn schedule<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            sleep(delay).await;
            task.await;
        }));
    }

    /// Aborts the pending task, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            if !handle.is_finished() {
                trace!("Cancelling pending debounced task");
            }
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Waits for the pending task to finish; returns immediately if none.
    pub async fn flush(&mut self) {
        if let Some(handle) = self.pending.take() {
            let _ = handle.await;
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DELAY)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn only_last_of_a_burst_runs() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::default();
        for n in 1..=3 {
            let tx = tx.clone();
            debouncer.schedule(async move {
                let _ = tx.send(n);
            });
            tokio::time::advance(Duration::from_millis(100)).await;
        }
        assert_eq!(rx.recv().await, Some(3));
        sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_pending_task() {
        let (tx, mut rx) = mpsc::unbounded_channel::<u8>();
        let mut debouncer = Debouncer::new(Duration::from_millis(250));
        debouncer.schedule(async move {
            let _ = tx.send(1);
        });
        assert!(debouncer.is_pending());
        debouncer.cancel();
        assert!(!debouncer.is_pending());
        assert_eq!(rx.recv().await, None);
    }
}
