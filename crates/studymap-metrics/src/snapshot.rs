use serde::{Deserialize, Serialize};
use studymap_common::ExternalStatus;

/// Point-in-time reading of the bounded blocking worker pool.
///
/// `size` is fixed at configuration time; `active` and `queued` are
/// non-blocking gauge reads and may be stale by the time they are
/// serialized, which is fine for a monitoring feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSample {
    pub size: usize,
    pub active: usize,
    pub queued: usize,
}

/// One element of the application's `/status` push stream.
///
/// Recomputed on every sampling tick from the worker-pool gauges, the
/// inbound counter and the latest element of the external collaborator's
/// own status feed. `external_service_active_requests` is `null` while the
/// external state is unknown (feed not yet connected, or connection lost).
///
/// Wire shape matches what the map UI polls for:
/// `{"poolSize":4,"poolUsed":1,"poolQueueSize":0,"activeRequests":2,
///   "externalServiceActiveRequests":1}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub pool_size: usize,
    pub pool_used: usize,
    pub pool_queue_size: usize,
    pub active_requests: usize,
    pub external_service_active_requests: Option<u32>,
}

impl StatusSnapshot {
    /// Assembles a snapshot from the current pool sample, the inbound
    /// counter and the latest external status element (if any).
    pub fn assemble(
        pool: PoolSample,
        active_requests: usize,
        external: Option<ExternalStatus>,
    ) -> Self {
        Self {
            pool_size: pool.size,
            pool_used: pool.active,
            pool_queue_size: pool.queued,
            active_requests,
            external_service_active_requests: external.map(|s| s.active_requests),
        }
    }
}
