//! Fixed-size worker pool draining a shared queue.

use crate::error::SyncError;
use crate::progress::ProgressReporter;
use crate::types::DownloadOutcome;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, error};

/// Items laid out up front plus the index of the next unclaimed one.
///
/// Claiming is a single `fetch_add`, so every index is handed to exactly one
/// caller.
struct WorkQueue<T> {
    items: Vec<T>,
    next: AtomicUsize,
}

impl<T> WorkQueue<T> {
    fn new(items: Vec<T>) -> Self {
        Self {
            items,
            next: AtomicUsize::new(0),
        }
    }

    fn claim(&self) -> Option<&T> {
        let index = self.next.fetch_add(1, Ordering::Relaxed);
        self.items.get(index)
    }
}

/// Runs `op` once for every item using `concurrency` workers.
///
/// Each worker repeatedly claims the next item from the shared queue, awaits
/// `op` on it and reports the outcome to `progress`, until the queue is
/// drained. Returns after every worker has exited. A `Failed` outcome is
/// counted like any other; only a worker that panics makes this return an
/// error, and only once all remaining workers have finished.
///
/// # Arguments
///
/// * `items` - Work items, processed in no particular order
/// * `concurrency` - Number of workers to spawn
/// * `progress` - Reporter receiving one outcome per item
/// * `op` - Per-item operation
pub async fn run_workers<T, F, Fut>(
    items: Vec<T>,
    concurrency: usize,
    progress: &ProgressReporter,
    op: F,
) -> Result<(), SyncError>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = DownloadOutcome> + Send + 'static,
{
    let queue = Arc::new(WorkQueue::new(items));
    let op = Arc::new(op);

    let workers: Vec<_> = (0..concurrency.max(1))
        .map(|worker_id| {
            let queue = Arc::clone(&queue);
            let op = Arc::clone(&op);
            let progress = progress.clone();

            tokio::spawn(async move {
                let mut processed = 0usize;
                while let Some(item) = queue.claim() {
                    let outcome = (*op)(item.clone()).await;
                    progress.report(outcome);
                    processed += 1;
                }
                debug!("Worker {} finished after {} item(s)", worker_id, processed);
            })
        })
        .collect();

    // Join every worker before reporting so none is left running.
    let mut failure = None;
    for worker in workers {
        if let Err(e) = worker.await {
            error!("Task join error: {}", e);
            failure.get_or_insert_with(|| SyncError::WorkerFailed(e.to_string()));
        }
    }

    match failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    async fn run_counting(n: usize, concurrency: usize) -> (Vec<usize>, ProgressReporter) {
        let calls = Arc::new(Mutex::new(vec![0usize; n]));
        let progress = ProgressReporter::hidden(n as u64);

        let recorded = Arc::clone(&calls);
        run_workers((0..n).collect(), concurrency, &progress, move |i: usize| {
            let recorded = Arc::clone(&recorded);
            async move {
                tokio::time::sleep(Duration::from_millis((i % 3) as u64)).await;
                recorded.lock().unwrap()[i] += 1;
                DownloadOutcome::Downloaded
            }
        })
        .await
        .unwrap();

        let calls = calls.lock().unwrap().clone();
        (calls, progress)
    }

    #[tokio::test]
    async fn test_each_item_processed_once() {
        let n = 25;
        for concurrency in [1, 2, 7, 25, 40] {
            let (calls, progress) = run_counting(n, concurrency).await;
            assert!(
                calls.iter().all(|&c| c == 1),
                "concurrency {concurrency}: {calls:?}"
            );
            assert_eq!(progress.snapshot().completed, n as u64);
        }
    }

    #[tokio::test]
    async fn test_empty_queue() {
        let (calls, progress) = run_counting(0, 4).await;
        assert!(calls.is_empty());
        assert_eq!(progress.snapshot().completed, 0);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let progress = ProgressReporter::hidden(20);

        let (in_flight_op, peak_op) = (Arc::clone(&in_flight), Arc::clone(&peak));
        run_workers((0..20).collect(), 3, &progress, move |_: u32| {
            let in_flight = Arc::clone(&in_flight_op);
            let peak = Arc::clone(&peak_op);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(2)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                DownloadOutcome::Downloaded
            }
        })
        .await
        .unwrap();

        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(progress.snapshot().completed, 20);
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_the_pool() {
        let progress = ProgressReporter::hidden(10);
        run_workers((0..10).collect(), 2, &progress, |i: u32| async move {
            if i % 2 == 0 {
                DownloadOutcome::Failed
            } else {
                DownloadOutcome::Skipped
            }
        })
        .await
        .unwrap();

        let state = progress.snapshot();
        assert_eq!(state.completed, 10);
        assert_eq!(state.failed, 5);
        assert_eq!(state.skipped, 5);
    }

    #[tokio::test]
    async fn test_worker_panic_is_reported_after_drain() {
        let progress = ProgressReporter::hidden(6);
        let result = run_workers((0..6).collect(), 2, &progress, |i: u32| async move {
            if i == 0 {
                panic!("boom");
            }
            DownloadOutcome::Downloaded
        })
        .await;

        assert!(matches!(result, Err(SyncError::WorkerFailed(_))));
        assert_eq!(progress.snapshot().completed, 5);
    }
}
