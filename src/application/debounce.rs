//! Cancel-on-supersede debouncing.
//!
//! Every call to [`Debouncer::run`] takes a new generation. A call only
//! produces a result if no newer call started before it finished, both after
//! the delay and after the task itself.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum Debounced<T> {
    Completed(T),
    /// A newer request replaced this one
    Superseded,
}

impl<T> Debounced<T> {
    pub fn is_superseded(&self) -> bool {
        matches!(self, Debounced::Superseded)
    }
}

#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    generation: AtomicU64,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: AtomicU64::new(0),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Invalidate any request still waiting or in flight
    pub fn cancel_pending(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Wait out the delay, then run `task` unless superseded
    pub async fn run<F, Fut, T>(&self, task: F) -> Debounced<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        tokio::time::sleep(self.delay).await;
        if !self.is_current(generation) {
            tracing::debug!("Request {} superseded before it ran", generation);
            return Debounced::Superseded;
        }

        let value = task().await;
        if !self.is_current(generation) {
            tracing::debug!("Discarding stale result for request {}", generation);
            return Debounced::Superseded;
        }

        Debounced::Completed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_single_call_completes_after_delay() {
        let debouncer = Debouncer::new(Duration::from_millis(500));
        let start = tokio::time::Instant::now();

        let result = debouncer.run(|| async { 7 }).await;

        assert_eq!(result, Debounced::Completed(7));
        assert_eq!(start.elapsed(), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_call_supersedes_waiting_call() {
        let debouncer = Arc::new(Debouncer::new(Duration::from_millis(500)));
        let runs = Arc::new(AtomicU32::new(0));

        let first = {
            let debouncer = Arc::clone(&debouncer);
            let runs = Arc::clone(&runs);
            tokio::spawn(async move {
                debouncer
                    .run(|| async move {
                        runs.fetch_add(1, Ordering::SeqCst);
                        "first"
                    })
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(200)).await;
        let second = debouncer
            .run(|| async {
                runs.fetch_add(1, Ordering::SeqCst);
                "second"
            })
            .await;

        assert_eq!(first.await.unwrap(), Debounced::Superseded);
        assert_eq!(second, Debounced::Completed("second"));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_result_discarded_when_newer_call_starts() {
        let debouncer = Arc::new(Debouncer::new(Duration::from_millis(100)));

        let slow = {
            let debouncer = Arc::clone(&debouncer);
            tokio::spawn(async move {
                debouncer
                    .run(|| async {
                        tokio::time::sleep(Duration::from_secs(2)).await;
                        "slow"
                    })
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(500)).await;
        let fast = debouncer.run(|| async { "fast" }).await;

        assert_eq!(fast, Debounced::Completed("fast"));
        assert!(slow.await.unwrap().is_superseded());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_pending() {
        let debouncer = Arc::new(Debouncer::new(Duration::from_millis(500)));

        let pending = {
            let debouncer = Arc::clone(&debouncer);
            tokio::spawn(async move { debouncer.run(|| async { 1 }).await })
        };

        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.cancel_pending();

        assert_eq!(pending.await.unwrap(), Debounced::Superseded);
    }
}
