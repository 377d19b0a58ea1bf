use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Single-slot scheduler: scheduling new work cancels whatever is pending,
/// so at most one job waits for the quiet window at a time.
#[derive(Debug)]
pub struct DebounceScheduler {
    window: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl DebounceScheduler {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: Mutex::new(None),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Run `job` once the window elapses without another call to `schedule`.
    pub fn schedule<F>(&self, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let window = self.window;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            job.await;
        });

        if let Some(previous) = self.slot().replace(handle) {
            previous.abort();
        }
    }

    /// Drop the pending job, if any. Returns whether one was cancelled.
    pub fn cancel(&self) -> bool {
        match self.slot().take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.slot()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    fn slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for DebounceScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self
            .pending
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_job(counter: &Arc<AtomicUsize>) -> impl Future<Output = ()> + Send + 'static {
        let counter = Arc::clone(counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn burst_collapses_into_one_run() {
        let scheduler = DebounceScheduler::new(Duration::from_millis(500));
        let runs = Arc::new(AtomicUsize::new(0));

        for _ in 0..5 {
            scheduler.schedule(counting_job(&runs));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert!(scheduler.is_pending());

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(!scheduler.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn separated_calls_each_run() {
        let scheduler = DebounceScheduler::new(Duration::from_millis(500));
        let runs = Arc::new(AtomicUsize::new(0));

        scheduler.schedule(counting_job(&runs));
        tokio::time::sleep(Duration::from_millis(700)).await;
        scheduler.schedule(counting_job(&runs));
        tokio::time::sleep(Duration::from_millis(700)).await;

        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_discards_pending_job() {
        let scheduler = DebounceScheduler::new(Duration::from_millis(500));
        let runs = Arc::new(AtomicUsize::new(0));

        scheduler.schedule(counting_job(&runs));
        assert!(scheduler.cancel());
        assert!(!scheduler.cancel());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }
}
