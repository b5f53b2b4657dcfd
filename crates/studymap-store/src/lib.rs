//! Studymap Persistence Router
//!
//! Uniform lookup over heterogeneous backing stores, plus the bounded
//! worker pool that keeps inherently blocking drivers off the async core.
//!
//! # Architecture
//!
//! Every backing store is wrapped in a [`StudyRepository`] adapter exposing
//! one capability: `find_by_key(key) -> Option<f64>`. The [`StoreRouter`]
//! maps each study (the routing key) to one adapter; adding a backing store
//! means registering one adapter, not editing a dispatch branch.
//!
//! Adapters backed by synchronous drivers run their lookups on the
//! [`IoPool`], a fixed-size pool reserved for blocking work. Natively
//! non-blocking adapters execute directly on the calling task. Either way
//! the contract returned to the caller is identical.
//!
//! Routing is total: a study with no configured adapter resolves to a
//! synthetic value after a fixed fallback latency instead of failing.
//!
//! # Components
//!
//! - [`IoPool`] - bounded pool for blocking work, with occupancy gauges
//! - [`StudyRepository`] - the adapter capability
//! - [`MemoryRepository`] / [`BlockingRepository`] - simulated adapters
//! - [`StoreRouter`] - routing-key dispatch with the unknown-study fallback
//! - [`demo_router`] - the demo datasets wired to their adapters

pub mod datasets;
pub mod io_pool;
pub mod repository;
pub mod router;

pub use datasets::demo_router;
pub use io_pool::IoPool;
pub use repository::{BlockingRepository, MemoryRepository, StudyRepository};
pub use router::StoreRouter;
