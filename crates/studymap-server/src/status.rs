//! Latest-value-wins status stream.
//!
//! Two independent producers feed the `/status` stream: the local sampling
//! ticker and the external collaborator's own status feed (already reduced
//! to a latest-element watch channel by the feed pump). They are combined
//! the way a combine-latest operator would: whenever either side advances,
//! the current local gauges are paired with the latest external element
//! and pushed as one [`StatusSnapshot`]. Nothing here blocks and no
//! history is retained - only the latest value matters to subscribers.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, Stream, StreamExt};
use studymap_common::ExternalStatus;
use studymap_metrics::{MetricsRegistry, StatusSnapshot};
use studymap_store::IoPool;
use tokio::sync::watch;
use tokio_stream::wrappers::{IntervalStream, WatchStream};

/// Builds the combined status stream. The stream is infinite; it is
/// dropped with its SSE subscriber.
pub fn status_stream(
    metrics: Arc<MetricsRegistry>,
    io_pool: Arc<IoPool>,
    feed: watch::Receiver<Option<ExternalStatus>>,
    period: Duration,
) -> impl Stream<Item = StatusSnapshot> + Send {
    let ticks = IntervalStream::new(tokio::time::interval(period)).map(|_| ());
    let feed_changes = WatchStream::new(feed.clone()).map(|_| ());

    stream::select(ticks, feed_changes).map(move |_| {
        StatusSnapshot::assemble(io_pool.sample(), metrics.active_inbound(), *feed.borrow())
    })
}
