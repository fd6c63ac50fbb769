//! One-shot cancellation cleanup
//!
//! When the operator interrupts the flow, any browsers spun up on
//! behalf of the in-flight invocation should be torn down before the
//! process exits. The signal can fire more than once and from more
//! than one task, but the cleanup must run at most once, under its own
//! timeout, and every task that waits on it must block until it
//! actually finishes.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

type CleanupFn = Box<dyn FnOnce() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send>;

struct Inner {
    started: AtomicBool,
    timeout: Duration,
    cleanup: Mutex<Option<CleanupFn>>,
    done_tx: watch::Sender<bool>,
    done_rx: watch::Receiver<bool>,
}

/// Guard around a use-once cleanup action.
///
/// [`trigger`](Self::trigger) may be called any number of times from
/// any task; the cleanup future is spawned exactly once. Every task
/// that calls [`settle`](Self::settle) before returning blocks until a
/// triggered cleanup has finished, so none of them can race past a
/// cleanup that is still running.
#[derive(Clone)]
pub struct CleanupGuard {
    inner: Arc<Inner>,
}

impl CleanupGuard {
    /// Create a guard around `cleanup`, bounded by `timeout` once it runs
    pub fn new<F, Fut>(timeout: Duration, cleanup: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (done_tx, done_rx) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                started: AtomicBool::new(false),
                timeout,
                cleanup: Mutex::new(Some(Box::new(move || Box::pin(cleanup())))),
                done_tx,
                done_rx,
            }),
        }
    }

    /// Start the cleanup if it has not started yet. Safe to call from
    /// multiple tasks and multiple times.
    pub fn trigger(&self) {
        if self.inner.started.swap(true, Ordering::SeqCst) {
            debug!("cleanup already started, ignoring repeat trigger");
            return;
        }

        let cleanup = self.inner.cleanup.lock().unwrap_or_else(|e| e.into_inner()).take();
        let inner = self.inner.clone();

        tokio::spawn(async move {
            if let Some(cleanup) = cleanup {
                // a hung cleanup must not block process exit forever
                if tokio::time::timeout(inner.timeout, cleanup()).await.is_err() {
                    debug!("cleanup timed out after {:?}", inner.timeout);
                }
            }
            let _ = inner.done_tx.send(true);
        });
    }

    /// Whether the cleanup has been triggered
    pub fn started(&self) -> bool {
        self.inner.started.load(Ordering::SeqCst)
    }

    /// Wait for the cleanup to finish, but only if it was triggered.
    /// Returns immediately when no cancellation ever fired; otherwise
    /// blocks every caller, no matter how many, until the cleanup task
    /// has completed.
    pub async fn settle(&self) {
        if !self.started() {
            return;
        }
        let mut rx = self.inner.done_rx.clone();
        // the sender lives in `inner`, so this only errs if the guard
        // itself is gone — nothing left to wait for either way
        let _ = rx.wait_for(|done| *done).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test]
    async fn test_cleanup_runs_at_most_once() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let guard = CleanupGuard::new(Duration::from_secs(5), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        let mut handles = Vec::new();
        for _ in 0..3 {
            let guard = guard.clone();
            handles.push(tokio::spawn(async move { guard.trigger() }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        guard.settle().await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_settle_without_trigger_returns_immediately() {
        let guard = CleanupGuard::new(Duration::from_secs(5), || async {
            panic!("cleanup must not run");
        });

        // no trigger: settle must not block or run the cleanup
        guard.settle().await;
        assert!(!guard.started());
    }

    #[tokio::test]
    async fn test_hung_cleanup_is_bounded_by_timeout() {
        let guard = CleanupGuard::new(Duration::from_millis(20), || async {
            tokio::time::sleep(Duration::from_secs(60)).await;
        });

        guard.trigger();
        // settle returns once the timeout cuts the cleanup off
        tokio::time::timeout(Duration::from_secs(5), guard.settle())
            .await
            .expect("settle should not hang on a hung cleanup");
    }

    #[tokio::test]
    async fn test_settle_waits_for_triggered_cleanup() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();
        let guard = CleanupGuard::new(Duration::from_secs(5), move || {
            let flag = flag.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                flag.store(true, Ordering::SeqCst);
            }
        });

        guard.trigger();
        guard.settle().await;
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_settle_blocks_every_waiter_until_cleanup_finishes() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();
        let guard = CleanupGuard::new(Duration::from_secs(5), move || {
            let flag = flag.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                flag.store(true, Ordering::SeqCst);
            }
        });

        guard.trigger();

        // first waiter gets a head start on the completion signal
        let first = {
            let guard = guard.clone();
            let finished = finished.clone();
            tokio::spawn(async move {
                guard.settle().await;
                assert!(
                    finished.load(Ordering::SeqCst),
                    "first waiter returned before the cleanup finished"
                );
            })
        };

        // second waiter joins mid-cleanup and must also block
        tokio::time::sleep(Duration::from_millis(30)).await;
        guard.settle().await;
        assert!(
            finished.load(Ordering::SeqCst),
            "late waiter returned before the cleanup finished"
        );

        first.await.unwrap();
    }
}
