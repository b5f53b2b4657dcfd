//! Routing-key dispatch over registered backing-store adapters.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use studymap_common::{Result, StudyRequest};
use tracing::{debug, info, warn};

use crate::repository::StudyRepository;

/// Default simulated latency of the no-datasource fallback path.
pub const DEFAULT_FALLBACK_LATENCY: Duration = Duration::from_secs(2);

/// One registered adapter with its log label.
struct Route {
    label: &'static str,
    repository: Arc<dyn StudyRepository>,
}

/// Dispatches a study request to the backing store configured for its
/// routing key.
///
/// The mapping is total: studies without a configured adapter wait the
/// fallback latency (a representative slow path) and then resolve to a
/// synthetic random value, so an unknown study is a handled case rather
/// than an error. A reached adapter that finds no row yields `Ok(None)`,
/// which downstream rendering turns into an empty pin.
pub struct StoreRouter {
    routes: HashMap<String, Route>,
    fallback_latency: Duration,
}

impl StoreRouter {
    pub fn new() -> Self {
        Self::with_fallback_latency(DEFAULT_FALLBACK_LATENCY)
    }

    pub fn with_fallback_latency(fallback_latency: Duration) -> Self {
        Self {
            routes: HashMap::new(),
            fallback_latency,
        }
    }

    /// Registers an adapter for one study. Re-registering a study replaces
    /// its adapter.
    pub fn register(
        &mut self,
        study: impl Into<String>,
        label: &'static str,
        repository: Arc<dyn StudyRepository>,
    ) -> &mut Self {
        self.routes.insert(study.into(), Route { label, repository });
        self
    }

    /// Number of studies with a configured adapter.
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Resolves the persisted value for one request.
    ///
    /// # Errors
    ///
    /// Propagates adapter failures (`StoreUnavailable` and friends) to the
    /// caller; unknown studies and absent keys are not errors.
    pub async fn resolve(&self, request: &StudyRequest) -> Result<Option<f64>> {
        match self.routes.get(&request.study) {
            Some(route) => {
                let start = Instant::now();
                let result = route.repository.find_by_key(&request.region).await;
                match &result {
                    Ok(_) => debug!(
                        "{} request finished, took: {:?}",
                        route.label,
                        start.elapsed()
                    ),
                    Err(e) => warn!("{} request failed: {}", route.label, e),
                }
                result
            }
            None => {
                info!(
                    "Have no datasource for study '{}', returning random data",
                    request.study
                );
                tokio::time::sleep(self.fallback_latency).await;
                Ok(Some(rand::thread_rng().gen_range(0.0..1000.0)))
            }
        }
    }
}

impl Default for StoreRouter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryRepository;
    use async_trait::async_trait;
    use studymap_common::StudymapError;

    struct FailingRepository;

    #[async_trait]
    impl StudyRepository for FailingRepository {
        async fn find_by_key(&self, _key: &str) -> Result<Option<f64>> {
            Err(StudymapError::StoreUnavailable("connection refused".into()))
        }
    }

    fn router() -> StoreRouter {
        let mut router = StoreRouter::with_fallback_latency(Duration::from_millis(50));
        router.register(
            "world-gdp",
            "Cassandra",
            Arc::new(MemoryRepository::new(
                HashMap::from([("UA".to_string(), 112.0)]),
                Duration::from_millis(1),
            )),
        );
        router
    }

    #[tokio::test]
    async fn known_study_resolves_through_its_adapter() {
        let request = StudyRequest::new("world-gdp", "UA", None);
        assert_eq!(router().resolve(&request).await.unwrap(), Some(112.0));
    }

    #[tokio::test]
    async fn known_study_with_absent_key_is_explicitly_absent() {
        let request = StudyRequest::new("world-gdp", "XX", None);
        assert_eq!(router().resolve(&request).await.unwrap(), None);
    }

    #[tokio::test]
    async fn unknown_study_resolves_to_synthetic_value_within_fallback_window() {
        let request = StudyRequest::new("foo", "bar", None);
        let start = Instant::now();
        let value = router().resolve(&request).await.unwrap();
        let elapsed = start.elapsed();

        let value = value.expect("fallback always produces a value");
        assert!((0.0..1000.0).contains(&value));
        assert!(elapsed >= Duration::from_millis(50));
        assert!(elapsed < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn adapter_failure_propagates() {
        let mut router = router();
        router.register("europe-pop", "Mongo", Arc::new(FailingRepository));
        let request = StudyRequest::new("europe-pop", "DE", None);
        let err = router.resolve(&request).await.unwrap_err();
        assert!(matches!(err, StudymapError::StoreUnavailable(_)));
    }
}
