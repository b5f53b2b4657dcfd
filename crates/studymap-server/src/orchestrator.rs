use std::sync::Arc;
use std::time::Duration;

use futures::Stream;
use studymap_client::{ExternalClient, StatusFeedPump};
use studymap_common::{ExternalStatus, Result, StudyRequest, StudyResult};
use studymap_metrics::{MetricsRegistry, StatusSnapshot};
use studymap_store::{IoPool, StoreRouter};
use tokio::sync::watch;
use tracing::debug;

use crate::merge::MergeRule;
use crate::status;

/// How long the status-feed pump waits before re-subscribing after the
/// external feed goes silent.
const FEED_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Per-request fan-out/merge coordinator.
///
/// Constructed once at process start and threaded through by `Arc` handle;
/// the metrics registry, the worker pool and the status-feed watch channel
/// are the only process-wide shared state it touches.
///
/// A request moves through: accepted (inbound guard taken), dispatching
/// (study classified external-only vs external+persisted), branch
/// execution (concurrent join for dual routes, first error short-circuits),
/// merging, and completion. The inbound guard drops on every exit path -
/// success, failure, or cancelled connection - so the active-request count
/// never leaks.
pub struct Orchestrator {
    metrics: Arc<MetricsRegistry>,
    external: Arc<ExternalClient>,
    store: Arc<StoreRouter>,
    io_pool: Arc<IoPool>,
    feed: watch::Receiver<Option<ExternalStatus>>,
    _pump: StatusFeedPump,
}

impl Orchestrator {
    /// Wires the orchestrator and spawns the background status-feed pump.
    pub fn new(
        metrics: Arc<MetricsRegistry>,
        external: Arc<ExternalClient>,
        store: Arc<StoreRouter>,
        io_pool: Arc<IoPool>,
    ) -> Self {
        let pump = StatusFeedPump::spawn(Arc::clone(&external), FEED_RETRY_DELAY);
        let feed = pump.subscribe();
        Self {
            metrics,
            external,
            store,
            io_pool,
            feed,
            _pump: pump,
        }
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Handles one request on the non-blocking path.
    ///
    /// Dual-branch studies dispatch the external call and the persistence
    /// resolution concurrently and wait for both; the first branch error
    /// cancels the join and propagates. No partial result is returned when
    /// one branch fails.
    pub async fn process(&self, request: StudyRequest) -> Result<StudyResult> {
        let _guard = self.metrics.begin_inbound();
        let rule = MergeRule::for_study(&request.study);

        if rule.external_only() {
            let external = self.external.fetch(&request).await?;
            Ok(rule.apply(external.value, None))
        } else {
            let (external, persisted) = tokio::try_join!(
                self.external.fetch(&request),
                self.store.resolve(&request)
            )?;
            Ok(rule.apply(external.value, persisted))
        }
    }

    /// Handles one request on the blocking path.
    ///
    /// Identical contract to [`process`](Self::process); the external call
    /// is executed as a blocking job on the bounded worker pool instead of
    /// the async core, mirroring classic synchronous-client deployments.
    pub async fn process_blocking(&self, request: StudyRequest) -> Result<StudyResult> {
        let _guard = self.metrics.begin_inbound();
        let rule = MergeRule::for_study(&request.study);

        let client = Arc::clone(&self.external);
        let blocking_request = request.clone();
        let external_call = async {
            self.io_pool
                .run(move || client.fetch_blocking(&blocking_request))
                .await?
        };

        if rule.external_only() {
            let external = external_call.await?;
            Ok(rule.apply(external.value, None))
        } else {
            let (external, persisted) =
                tokio::try_join!(external_call, self.store.resolve(&request))?;
            Ok(rule.apply(external.value, persisted))
        }
    }

    /// One status snapshot from the current gauges and the latest external
    /// status element.
    pub fn sample_status(&self) -> StatusSnapshot {
        StatusSnapshot::assemble(
            self.io_pool.sample(),
            self.metrics.active_inbound(),
            *self.feed.borrow(),
        )
    }

    /// The live status stream: a snapshot whenever the local ticker or the
    /// external feed advances. Independent of request handling; sampling
    /// has no request-counting side effects.
    pub fn status_stream(&self, period: Duration) -> impl Stream<Item = StatusSnapshot> + Send {
        status::status_stream(
            Arc::clone(&self.metrics),
            Arc::clone(&self.io_pool),
            self.feed.clone(),
            period,
        )
    }

    /// Once-per-second operational log line.
    pub fn log_status(&self) {
        let pool = self.io_pool.sample();
        debug!(
            "[{} status] active req: {}, external req: {}, run/max: {}/{}, queued tasks: {}",
            self.io_pool.name(),
            self.metrics.active_inbound(),
            self.metrics.active_external(),
            pool.active,
            pool.size,
            pool.queued,
        );
    }
}
