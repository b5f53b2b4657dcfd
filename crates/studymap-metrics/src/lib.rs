//! Studymap Metrics Registry
//!
//! Lock-free concurrency metrics for the studymap orchestrator.
//!
//! # Overview
//!
//! The registry tracks two independent in-flight counters:
//!
//! - **inbound**: requests currently being orchestrated
//! - **external**: calls currently in flight against the external collaborator
//!
//! Both counters use RAII guards so the decrement fires on every exit path:
//! success, error, and task cancellation alike. Reads are relaxed atomic
//! loads and may be momentarily stale, which is acceptable for a monitoring
//! feed (eventually-consistent snapshot semantics).
//!
//! The registry is an explicit instance threaded through the orchestrator and
//! the status sampler by `Arc` handle. There are no ambient singletons.
//!
//! # Components
//!
//! - [`MetricsRegistry`] - the counters and their guards
//! - [`StatusSnapshot`] - the per-tick status document pushed to subscribers
//! - [`PoolSample`] - a point-in-time reading of the blocking worker pool

pub mod registry;
pub mod snapshot;

pub use registry::{InFlightGuard, MetricsRegistry};
pub use snapshot::{PoolSample, StatusSnapshot};
