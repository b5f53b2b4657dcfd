use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use futures::future;
use futures::stream::{self, Stream, StreamExt};
use http_body_util::{BodyExt, BodyStream, Full};
use hyper::Request;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use studymap_common::{ExternalStatus, ExternalStudy, Result, StudyRequest, StudymapError};
use studymap_metrics::MetricsRegistry;
use tracing::{debug, warn};

/// Client for the external study service.
///
/// One instance is constructed at startup and shared. Every fetch holds an
/// external in-flight guard from the [`MetricsRegistry`] for its full
/// duration, so the registry's external counter mirrors actual outbound
/// concurrency.
pub struct ExternalClient {
    base_url: String,
    client: Client<HttpConnector, Full<Bytes>>,
    metrics: Arc<MetricsRegistry>,
    handle: tokio::runtime::Handle,
}

impl ExternalClient {
    /// Creates a client for the service at `base_url`.
    ///
    /// Captures the current runtime handle for
    /// [`fetch_blocking`](Self::fetch_blocking).
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn new(base_url: impl Into<String>, metrics: Arc<MetricsRegistry>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: Client::builder(TokioExecutor::new()).build_http(),
            metrics,
            handle: tokio::runtime::Handle::current(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn service_uri(&self, request: &StudyRequest) -> String {
        let mut uri = format!(
            "{}/service/{}/{}",
            self.base_url, request.study, request.region
        );
        if let Some(timeout) = &request.timeout {
            uri.push_str("?timeout=");
            uri.push_str(timeout);
        }
        uri
    }

    /// Issues one request against the external service.
    ///
    /// # Errors
    ///
    /// Any transport failure, non-success status or malformed payload is
    /// surfaced as [`StudymapError::ExternalUnavailable`]. A single
    /// external hiccup fails the whole orchestrated request; no retry.
    pub async fn fetch(&self, request: &StudyRequest) -> Result<ExternalStudy> {
        let _guard = self.metrics.begin_external();
        let uri = self.service_uri(request);
        let start = Instant::now();
        debug!("Starting external call: {}", uri);

        let http_request = Request::get(&uri)
            .body(Full::new(Bytes::new()))
            .map_err(|e| StudymapError::Transport(format!("Failed to build request: {e}")))?;

        let response = self
            .client
            .request(http_request)
            .await
            .map_err(|e| StudymapError::ExternalUnavailable(format!("{uri}: {e}")))?;

        if !response.status().is_success() {
            return Err(StudymapError::ExternalUnavailable(format!(
                "{uri}: status {}",
                response.status()
            )));
        }

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| StudymapError::ExternalUnavailable(format!("{uri}: {e}")))?
            .to_bytes();

        let study: ExternalStudy = serde_json::from_slice(&body)
            .map_err(|e| StudymapError::ExternalUnavailable(format!("malformed payload: {e}")))?;

        debug!("External call finished in {:?}", start.elapsed());
        Ok(study)
    }

    /// Blocking variant of [`fetch`](Self::fetch): drives the same request
    /// to completion on the calling thread.
    ///
    /// Intended for worker-pool threads only - it must never run on one of
    /// the async core's own threads.
    ///
    /// # Panics
    ///
    /// Panics if called from within an async execution context.
    pub fn fetch_blocking(&self, request: &StudyRequest) -> Result<ExternalStudy> {
        self.handle.block_on(self.fetch(request))
    }

    /// Subscribes to the external service's status broadcast.
    ///
    /// Yields one [`ExternalStatus`] per server-sent event; each element
    /// supersedes the previous one for display purposes. A broken
    /// connection is logged and ends the stream - callers treat feed
    /// silence as "unknown external state", not as a hard error. A new
    /// call re-establishes the connection from scratch.
    pub async fn status_feed(&self) -> Result<impl Stream<Item = ExternalStatus> + Send> {
        let uri = format!("{}/status", self.base_url);
        let http_request = Request::get(&uri)
            .header("accept", "text/event-stream")
            .body(Full::new(Bytes::new()))
            .map_err(|e| StudymapError::Transport(format!("Failed to build request: {e}")))?;

        let response = self
            .client
            .request(http_request)
            .await
            .map_err(|e| StudymapError::ExternalUnavailable(format!("{uri}: {e}")))?;

        if !response.status().is_success() {
            return Err(StudymapError::ExternalUnavailable(format!(
                "{uri}: status {}",
                response.status()
            )));
        }

        let frames = BodyStream::new(response.into_body());
        let events = frames
            .scan(String::new(), |buffer, frame| {
                let drained = match frame {
                    Ok(frame) => match frame.into_data() {
                        Ok(data) => {
                            buffer.push_str(&String::from_utf8_lossy(&data));
                            Some(drain_events(buffer))
                        }
                        // Trailer frame; nothing to decode.
                        Err(_) => Some(Vec::new()),
                    },
                    Err(e) => {
                        warn!("External status feed terminated: {}", e);
                        None
                    }
                };
                future::ready(drained)
            })
            .flat_map(stream::iter);

        Ok(events)
    }
}

/// Decodes every complete SSE `data:` line buffered so far, keeping any
/// trailing partial line for the next frame.
fn drain_events(buffer: &mut String) -> Vec<ExternalStatus> {
    let mut events = Vec::new();
    while let Some(newline) = buffer.find('\n') {
        let line: String = buffer.drain(..=newline).collect();
        if let Some(payload) = line.trim().strip_prefix("data:") {
            match serde_json::from_str(payload.trim()) {
                Ok(status) => events.push(status),
                Err(e) => debug!("Skipping undecodable status event: {}", e),
            }
        }
    }
    events
}
