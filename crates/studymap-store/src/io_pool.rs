//! Bounded worker pool for blocking operations.
//!
//! The async core must never execute a blocking driver call on its own
//! worker threads. Jobs submitted here are bounded by a semaphore sized at
//! configuration time and executed via `spawn_blocking`; completion is
//! signaled back asynchronously. The pool keeps lock-free `active` and
//! `queued` gauges so the status sampler can read occupancy without
//! touching the pool itself.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use studymap_common::{Result, StudymapError};
use studymap_metrics::PoolSample;
use tokio::sync::Semaphore;

/// Fixed-capacity pool for blocking work.
///
/// At most `size` jobs run concurrently; further submissions wait on the
/// semaphore and are counted in the `queued` gauge until a permit frees up.
/// The pool is cheap to clone through an `Arc` and is shared by every
/// adapter that wraps a synchronous driver.
#[derive(Debug)]
pub struct IoPool {
    name: &'static str,
    size: usize,
    permits: Arc<Semaphore>,
    active: Arc<AtomicUsize>,
    queued: Arc<AtomicUsize>,
}

impl IoPool {
    /// Creates a pool allowing `size` concurrently running blocking jobs.
    pub fn new(name: &'static str, size: usize) -> Self {
        Self {
            name,
            size,
            permits: Arc::new(Semaphore::new(size)),
            active: Arc::new(AtomicUsize::new(0)),
            queued: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Runs a blocking job on the pool and awaits its result.
    ///
    /// The job waits for a permit first, so no more than `size` jobs ever
    /// block threads at once. The gauges are guard-backed: a caller that is
    /// cancelled while waiting for a permit does not leak a queued count,
    /// and the active count is released when the job itself finishes.
    ///
    /// # Errors
    ///
    /// [`StudymapError::PoolClosed`] if the pool has been shut down or the
    /// job could not be joined.
    pub async fn run<T, F>(&self, job: F) -> Result<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let permit = {
            let _waiting = GaugeGuard::acquire(&self.queued);
            Arc::clone(&self.permits)
                .acquire_owned()
                .await
                .map_err(|_| StudymapError::PoolClosed)?
        };

        let running = GaugeGuard::acquire(&self.active);
        let handle = tokio::task::spawn_blocking(move || {
            // Both the permit and the gauge live exactly as long as the job:
            // even if the awaiting caller goes away, the counts stay correct
            // until the blocking closure actually returns.
            let _permit = permit;
            let _running = running;
            job()
        });

        handle.await.map_err(|_| StudymapError::PoolClosed)
    }

    /// Non-blocking occupancy read for the status sampler.
    pub fn sample(&self) -> PoolSample {
        PoolSample {
            size: self.size,
            active: self.active.load(Ordering::Relaxed),
            queued: self.queued.load(Ordering::Relaxed),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

/// Increments a gauge on acquire, decrements on drop.
#[derive(Debug)]
struct GaugeGuard {
    gauge: Arc<AtomicUsize>,
}

impl GaugeGuard {
    fn acquire(gauge: &Arc<AtomicUsize>) -> Self {
        gauge.fetch_add(1, Ordering::Relaxed);
        Self {
            gauge: Arc::clone(gauge),
        }
    }
}

impl Drop for GaugeGuard {
    fn drop(&mut self) {
        self.gauge.fetch_sub(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn runs_a_job_and_returns_its_result() {
        let pool = IoPool::new("io-worker", 2);
        let result = pool.run(|| 21 * 2).await.unwrap();
        assert_eq!(result, 42);
    }

    #[tokio::test]
    async fn sample_reports_configured_size() {
        let pool = IoPool::new("io-worker", 4);
        let sample = pool.sample();
        assert_eq!(sample.size, 4);
        assert_eq!(sample.active, 0);
        assert_eq!(sample.queued, 0);
    }

    #[tokio::test]
    async fn concurrency_is_bounded_and_overflow_is_queued() {
        let pool = Arc::new(IoPool::new("io-worker", 2));

        let jobs: Vec<_> = (0..4)
            .map(|_| {
                let pool = Arc::clone(&pool);
                tokio::spawn(async move {
                    pool.run(|| std::thread::sleep(Duration::from_millis(200)))
                        .await
                })
            })
            .collect();

        // Give the jobs time to reach the pool.
        tokio::time::sleep(Duration::from_millis(50)).await;
        let sample = pool.sample();
        assert_eq!(sample.active, 2);
        assert_eq!(sample.queued, 2);

        for job in jobs {
            job.await.unwrap().unwrap();
        }
        let sample = pool.sample();
        assert_eq!(sample.active, 0);
        assert_eq!(sample.queued, 0);
    }

    #[tokio::test]
    async fn gauges_recover_after_jobs_finish() {
        let pool = Arc::new(IoPool::new("io-worker", 1));
        for _ in 0..8 {
            pool.run(|| ()).await.unwrap();
        }
        let sample = pool.sample();
        assert_eq!(sample.active, 0);
        assert_eq!(sample.queued, 0);
    }
}
