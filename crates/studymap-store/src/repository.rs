//! Backing-store adapters.
//!
//! A [`StudyRepository`] wraps one storage technology behind the single
//! capability the router needs: look a numeric value up by key. The two
//! adapters here simulate the execution modes real drivers come in -
//! natively non-blocking ([`MemoryRepository`]) and synchronous/blocking
//! ([`BlockingRepository`], isolated on the [`IoPool`]).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use studymap_common::Result;

use crate::io_pool::IoPool;

/// Uniform lookup capability over one backing store.
///
/// `Ok(None)` means the store was reached but the key has no row - an
/// explicit absence, distinct from both an unknown routing key (handled by
/// the router's fallback) and a store failure (an `Err`).
#[async_trait]
pub trait StudyRepository: Send + Sync {
    async fn find_by_key(&self, key: &str) -> Result<Option<f64>>;
}

/// Natively non-blocking adapter over an in-memory dataset.
///
/// Executes directly on the calling completion chain; the configured
/// latency simulates the round trip of an async driver.
#[derive(Debug, Clone)]
pub struct MemoryRepository {
    data: Arc<HashMap<String, f64>>,
    latency: Duration,
}

impl MemoryRepository {
    pub fn new(data: HashMap<String, f64>, latency: Duration) -> Self {
        Self {
            data: Arc::new(data),
            latency,
        }
    }
}

#[async_trait]
impl StudyRepository for MemoryRepository {
    async fn find_by_key(&self, key: &str) -> Result<Option<f64>> {
        tokio::time::sleep(self.latency).await;
        Ok(self.data.get(key).copied())
    }
}

/// Adapter over a synchronous driver.
///
/// The lookup genuinely blocks its thread (as a classic JDBC-style driver
/// would), so it is handed to the bounded [`IoPool`] and only the async
/// completion is exposed to the caller.
#[derive(Debug, Clone)]
pub struct BlockingRepository {
    data: Arc<HashMap<String, f64>>,
    latency: Duration,
    pool: Arc<IoPool>,
}

impl BlockingRepository {
    pub fn new(data: HashMap<String, f64>, latency: Duration, pool: Arc<IoPool>) -> Self {
        Self {
            data: Arc::new(data),
            latency,
            pool,
        }
    }
}

#[async_trait]
impl StudyRepository for BlockingRepository {
    async fn find_by_key(&self, key: &str) -> Result<Option<f64>> {
        let data = Arc::clone(&self.data);
        let latency = self.latency;
        let key = key.to_string();
        let found = self
            .pool
            .run(move || {
                std::thread::sleep(latency);
                data.get(&key).copied()
            })
            .await?;
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> HashMap<String, f64> {
        HashMap::from([("US".to_string(), 42.0), ("DE".to_string(), 7.5)])
    }

    #[tokio::test]
    async fn memory_repository_finds_known_key() {
        let repo = MemoryRepository::new(dataset(), Duration::from_millis(1));
        assert_eq!(repo.find_by_key("US").await.unwrap(), Some(42.0));
    }

    #[tokio::test]
    async fn memory_repository_reports_absent_key() {
        let repo = MemoryRepository::new(dataset(), Duration::from_millis(1));
        assert_eq!(repo.find_by_key("XX").await.unwrap(), None);
    }

    #[tokio::test]
    async fn blocking_repository_runs_on_the_pool() {
        let pool = Arc::new(IoPool::new("io-worker", 1));
        let repo = BlockingRepository::new(dataset(), Duration::from_millis(20), Arc::clone(&pool));

        let lookup = repo.find_by_key("DE");
        tokio::pin!(lookup);

        // While the lookup sleeps on its blocking thread, the pool shows it
        // as active.
        tokio::select! {
            _ = &mut lookup => panic!("lookup finished before the latency elapsed"),
            _ = tokio::time::sleep(Duration::from_millis(10)) => {
                assert_eq!(pool.sample().active, 1);
            }
        }
        assert_eq!(lookup.await.unwrap(), Some(7.5));
        assert_eq!(pool.sample().active, 0);
    }
}
