use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Thread-safe registry of in-flight request counters.
///
/// Holds one counter for inbound requests being orchestrated and one for
/// calls in flight against the external collaborator. Increment and
/// decrement are paired through [`InFlightGuard`]: the increment happens
/// when a guard is taken and the decrement when it is dropped, so a
/// handler that errors out (or is cancelled mid-await) can never leak an
/// active-request count.
///
/// # Example
///
/// ```
/// use studymap_metrics::MetricsRegistry;
///
/// let registry = MetricsRegistry::new();
/// {
///     let _guard = registry.begin_inbound();
///     assert_eq!(registry.active_inbound(), 1);
/// }
/// assert_eq!(registry.active_inbound(), 0);
/// ```
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    inbound: Arc<AtomicUsize>,
    external: Arc<AtomicUsize>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the beginning of one inbound request.
    ///
    /// The counter is decremented when the returned guard drops.
    pub fn begin_inbound(&self) -> InFlightGuard {
        InFlightGuard::acquire(&self.inbound)
    }

    /// Marks the beginning of one external-collaborator call.
    ///
    /// Independent of the inbound counter; the two may differ whenever a
    /// request is waiting on a backing store rather than the external call.
    pub fn begin_external(&self) -> InFlightGuard {
        InFlightGuard::acquire(&self.external)
    }

    /// Current number of inbound requests being handled. May be stale.
    pub fn active_inbound(&self) -> usize {
        self.inbound.load(Ordering::Relaxed)
    }

    /// Current number of in-flight external calls. May be stale.
    pub fn active_external(&self) -> usize {
        self.external.load(Ordering::Relaxed)
    }
}

/// RAII guard pairing a counter increment with its decrement.
///
/// Created by [`MetricsRegistry::begin_inbound`] and
/// [`MetricsRegistry::begin_external`]. The guard owns a handle to the
/// counter, so it can be moved into spawned tasks and closures and still
/// restore the count when the work finishes, however it finishes.
#[derive(Debug)]
pub struct InFlightGuard {
    counter: Arc<AtomicUsize>,
}

impl InFlightGuard {
    fn acquire(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::Relaxed);
        Self {
            counter: Arc::clone(counter),
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_independent() {
        let registry = MetricsRegistry::new();
        let _inbound = registry.begin_inbound();
        let _external = registry.begin_external();
        let _external2 = registry.begin_external();
        assert_eq!(registry.active_inbound(), 1);
        assert_eq!(registry.active_external(), 2);
    }

    #[test]
    fn guard_restores_count_on_drop() {
        let registry = MetricsRegistry::new();
        let guard = registry.begin_inbound();
        assert_eq!(registry.active_inbound(), 1);
        drop(guard);
        assert_eq!(registry.active_inbound(), 0);
    }

    #[test]
    fn guard_restores_count_when_error_path_unwinds() {
        let registry = MetricsRegistry::new();
        let result: Result<(), &str> = (|| {
            let _guard = registry.begin_inbound();
            Err("boom")
        })();
        assert!(result.is_err());
        assert_eq!(registry.active_inbound(), 0);
    }

    #[tokio::test]
    async fn guard_restores_count_when_task_is_cancelled() {
        let registry = Arc::new(MetricsRegistry::new());
        let reg = Arc::clone(&registry);
        let task = tokio::spawn(async move {
            let _guard = reg.begin_inbound();
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
        });
        // Let the task reach its await point, then cancel it.
        tokio::task::yield_now().await;
        task.abort();
        let _ = task.await;
        assert_eq!(registry.active_inbound(), 0);
    }

    #[test]
    fn concurrent_guards_balance_out() {
        let registry = Arc::new(MetricsRegistry::new());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let reg = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        let _guard = reg.begin_inbound();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.active_inbound(), 0);
    }
}
