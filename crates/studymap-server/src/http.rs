//! HTTP surface of the orchestrator service.
//!
//! GET-only, mirroring what the map UI calls:
//!
//! - `/service/{study}/{region}?timeout=` - blocking orchestration path
//! - `/nio/service/{study}/{region}?timeout=` - non-blocking path,
//!   identical contract
//! - `/status` - server-sent events, one [`StatusSnapshot`] per
//!   combine-latest emission
//! - `/__health` - liveness probe
//!
//! Per-request failures map to a generic 500; the internal cause is logged
//! and never exposed to the caller.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use futures::Stream;
use futures::StreamExt;
use serde::Deserialize;
use studymap_common::{Result, StudyRequest, StudymapError};
use studymap_metrics::StatusSnapshot;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::orchestrator::Orchestrator;

/// Cadence of the local status sampler.
const STATUS_PERIOD: Duration = Duration::from_millis(250);

/// HTTP server for the orchestrator.
pub struct HttpServer {
    orchestrator: Arc<Orchestrator>,
}

impl HttpServer {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self { orchestrator }
    }

    /// Builds the axum router. Exposed separately so tests can serve it on
    /// an ephemeral listener.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/service/:study/:region", get(service_blocking))
            .route("/nio/service/:study/:region", get(service_reactive))
            .route("/status", get(status))
            .route("/__health", get(health))
            .layer(CorsLayer::permissive())
            .with_state(Arc::clone(&self.orchestrator))
    }

    /// Binds `addr` and serves until shutdown.
    ///
    /// Also runs the once-per-second operational log line for the lifetime
    /// of the server.
    pub async fn run(self, addr: SocketAddr) -> Result<()> {
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Serves on an already-bound listener. Tests bind an ephemeral port
    /// first and hand it over here.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        info!("Orchestrator listening on {}", listener.local_addr()?);

        let log_task = {
            let orchestrator = Arc::clone(&self.orchestrator);
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(Duration::from_secs(1));
                loop {
                    ticker.tick().await;
                    orchestrator.log_status();
                }
            })
        };

        let served = axum::serve(listener, self.router())
            .await
            .map_err(|e| StudymapError::Transport(format!("Server error: {e}")));
        log_task.abort();
        served
    }
}

#[derive(Debug, Deserialize)]
struct TimeoutQuery {
    timeout: Option<String>,
}

/// Wrapper turning an orchestration failure into a generic 500.
struct AppError(StudymapError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        warn!("Error: {}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, "request failed").into_response()
    }
}

async fn service_blocking(
    State(orchestrator): State<Arc<Orchestrator>>,
    Path((study, region)): Path<(String, String)>,
    Query(query): Query<TimeoutQuery>,
) -> std::result::Result<Response, AppError> {
    let request = StudyRequest::new(study, region, query.timeout);
    let result = orchestrator
        .process_blocking(request)
        .await
        .map_err(AppError)?;
    Ok(Json(result).into_response())
}

async fn service_reactive(
    State(orchestrator): State<Arc<Orchestrator>>,
    Path((study, region)): Path<(String, String)>,
    Query(query): Query<TimeoutQuery>,
) -> std::result::Result<Response, AppError> {
    let request = StudyRequest::new(study, region, query.timeout);
    let result = orchestrator.process(request).await.map_err(AppError)?;
    Ok(Json(result).into_response())
}

async fn status(
    State(orchestrator): State<Arc<Orchestrator>>,
) -> Sse<impl Stream<Item = std::result::Result<Event, axum::Error>>> {
    let snapshots = orchestrator.status_stream(STATUS_PERIOD);
    Sse::new(snapshots.map(|snapshot: StatusSnapshot| Event::default().json_data(snapshot)))
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
