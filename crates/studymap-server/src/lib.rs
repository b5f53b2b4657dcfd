//! Studymap Orchestrator Service
//!
//! The root of the fan-out/merge pipeline: accepts a study request,
//! dispatches it to the external collaborator and (for most studies) the
//! persistence router - concurrently when both are needed - merges the two
//! answers under the study's rule, and serves a live status stream of
//! in-flight counts and worker-pool occupancy.
//!
//! # Components
//!
//! - [`Orchestrator`] - per-request fan-out/merge with lifecycle counters
//! - [`merge`] - the per-study merge-rule table
//! - [`status`] - the latest-value-wins status stream
//! - [`HttpServer`] - the axum HTTP surface (`/service`, `/nio/service`,
//!   `/status`)

pub mod http;
pub mod merge;
pub mod orchestrator;
pub mod status;

pub use http::HttpServer;
pub use merge::MergeRule;
pub use orchestrator::Orchestrator;
