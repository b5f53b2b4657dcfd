use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::response::sse::{Event, Sse};
use axum::routing::get;
use axum::{Json, Router};
use futures::Stream;
use rand::Rng;
use serde::Deserialize;
use studymap_common::{ExternalStatus, ExternalStudy, Result, StudymapError};
use studymap_metrics::MetricsRegistry;
use tokio::net::TcpListener;
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;
use tower_http::cors::CorsLayer;
use tracing::{debug, info};

use crate::data::study_data;
use crate::{DEFAULT_TIMEOUT_MS, STATUS_PERIOD_MS};

/// The simulated external study service.
///
/// Tracks its own in-flight request count with the same RAII-guard
/// discipline as the orchestrator, and broadcasts it on `/status`.
pub struct ExternalApp {
    metrics: Arc<MetricsRegistry>,
    data: HashMap<&'static str, HashMap<&'static str, f64>>,
    default_delay: Duration,
}

impl ExternalApp {
    pub fn new() -> Self {
        Self::with_default_delay(Duration::from_millis(DEFAULT_TIMEOUT_MS))
    }

    /// Constructor with a custom default delay; tests use a short one.
    pub fn with_default_delay(default_delay: Duration) -> Self {
        Self {
            metrics: Arc::new(MetricsRegistry::new()),
            data: study_data(),
            default_delay,
        }
    }

    /// Builds the axum router serving this app.
    pub fn into_router(self: Arc<Self>) -> Router {
        Router::new()
            .route("/service/:study/:region", get(service))
            .route("/status", get(status))
            .layer(CorsLayer::permissive())
            .with_state(self)
    }

    /// Binds `addr` and serves until shutdown.
    pub async fn run(self, addr: SocketAddr) -> Result<()> {
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Serves on an already-bound listener. Tests bind an ephemeral port
    /// first and hand it over here.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        info!(
            "External service listening on {}",
            listener.local_addr()?
        );
        axum::serve(listener, Arc::new(self).into_router())
            .await
            .map_err(|e| StudymapError::Transport(format!("Server error: {e}")))?;
        Ok(())
    }

    /// Delay for one request: the parsed timeout hint, or the default when
    /// the hint is missing or unparsable.
    fn delay_for(&self, hint: Option<&str>) -> Duration {
        hint.and_then(|raw| raw.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(self.default_delay)
    }

    /// Value for one study/region pair: dataset value when known, random
    /// otherwise.
    fn value_for(&self, study: &str, region: &str) -> f64 {
        match self.data.get(study).and_then(|regions| regions.get(region)) {
            Some(value) => {
                info!("Study: {}, region: {}, value: {}", study, region, value);
                *value
            }
            None => rand::thread_rng().gen_range(0.0..1000.0),
        }
    }
}

impl Default for ExternalApp {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct TimeoutQuery {
    timeout: Option<String>,
}

async fn service(
    State(app): State<Arc<ExternalApp>>,
    Path((study, region)): Path<(String, String)>,
    Query(query): Query<TimeoutQuery>,
) -> Json<ExternalStudy> {
    let _guard = app.metrics.begin_inbound();
    debug!("Starting request processing");
    tokio::time::sleep(app.delay_for(query.timeout.as_deref())).await;
    let value = app.value_for(&study, &region);
    debug!("Request processing finished");
    Json(ExternalStudy { value })
}

async fn status(
    State(app): State<Arc<ExternalApp>>,
) -> Sse<impl Stream<Item = std::result::Result<Event, axum::Error>>> {
    let metrics = Arc::clone(&app.metrics);
    let ticks = IntervalStream::new(tokio::time::interval(Duration::from_millis(
        STATUS_PERIOD_MS,
    )));
    let events = ticks.map(move |_| {
        Event::default().json_data(ExternalStatus {
            active_requests: metrics.active_inbound() as u32,
        })
    });
    Sse::new(events)
}
