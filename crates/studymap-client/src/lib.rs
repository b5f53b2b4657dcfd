//! External Collaborator Client
//!
//! HTTP client for the external study service and its status broadcast.
//!
//! # Overview
//!
//! The external service answers `GET /service/{study}/{region}?timeout=`
//! with a single `{"value": n}` payload and pushes its own in-flight count
//! on `GET /status` as an unbounded server-sent-event stream.
//!
//! [`ExternalClient`] offers the call in both execution modes the
//! orchestrator needs - a non-blocking [`fetch`](ExternalClient::fetch)
//! and a [`fetch_blocking`](ExternalClient::fetch_blocking) variant that
//! drives the same request to completion on the calling (worker-pool)
//! thread. Either way a failed call fails the orchestrated request; there
//! is no retry.
//!
//! [`StatusFeedPump`] keeps the latest status element available through a
//! watch channel so the status sampler can pair it with local metrics
//! without ever blocking on the feed.

pub mod client;
pub mod feed;

pub use client::ExternalClient;
pub use feed::StatusFeedPump;
