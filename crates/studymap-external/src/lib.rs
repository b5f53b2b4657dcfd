//! Simulated External Study Service
//!
//! Stand-in for the external collaborator the orchestrator fans out to.
//! Runnable standalone (`studymap external`) and embedded by the
//! integration tests on an ephemeral port.
//!
//! # HTTP surface
//!
//! - `GET /service/{study}/{region}?timeout=` - sleeps `timeout`
//!   milliseconds (default 1000; malformed values fall back to the
//!   default), then answers `{"value": n}`. Known study/region pairs get
//!   their dataset value, everything else a random value in `[0, 1000)`.
//! - `GET /status` - server-sent events every 250 ms carrying
//!   `{"activeRequests": n}` from the service's own in-flight counter.

pub mod app;
mod data;

pub use app::ExternalApp;

/// Delay applied when the request carries no (or a malformed) timeout hint.
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;

/// Cadence of the `/status` push stream.
pub const STATUS_PERIOD_MS: u64 = 250;
