//! Background subscription to the external status broadcast.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use studymap_common::ExternalStatus;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::client::ExternalClient;

/// Owns the long-lived status-feed subscription.
///
/// A background task pumps the feed into a watch channel holding the
/// latest element - the natural shape for a latest-value-wins merge with
/// the local sampling tick. While no subscription is live (startup,
/// connection lost) the channel holds `None`, which downstream reporting
/// renders as "unknown external state".
///
/// One subscription follows the log-and-stop policy of the feed itself;
/// the pump then re-establishes a fresh subscription after `retry_delay`.
/// The task is aborted when the pump is dropped.
pub struct StatusFeedPump {
    rx: watch::Receiver<Option<ExternalStatus>>,
    task: JoinHandle<()>,
}

impl StatusFeedPump {
    /// Spawns the pump task on the current runtime.
    pub fn spawn(client: Arc<ExternalClient>, retry_delay: Duration) -> Self {
        let (tx, rx) = watch::channel(None);
        let task = tokio::spawn(async move {
            loop {
                match client.status_feed().await {
                    Ok(feed) => {
                        debug!("Subscribed to external status feed");
                        let mut feed = std::pin::pin!(feed);
                        while let Some(status) = feed.next().await {
                            let _ = tx.send(Some(status));
                        }
                    }
                    Err(e) => warn!("Could not subscribe to external status feed: {}", e),
                }
                // Feed went silent; external state is unknown until a new
                // subscription delivers the next element.
                let _ = tx.send(None);
                tokio::time::sleep(retry_delay).await;
            }
        });
        Self { rx, task }
    }

    /// Hands out a receiver of the latest external status element.
    pub fn subscribe(&self) -> watch::Receiver<Option<ExternalStatus>> {
        self.rx.clone()
    }
}

impl Drop for StatusFeedPump {
    fn drop(&mut self) {
        self.task.abort();
    }
}
