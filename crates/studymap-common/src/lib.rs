//! Studymap Common Types
//!
//! Shared model and error types for the studymap fan-out/merge service.
//!
//! # Overview
//!
//! Studymap answers map-study requests by fanning a single inbound request out
//! to an external HTTP collaborator and (for most studies) a backing store,
//! then merging both answers into one [`StudyResult`]. This crate contains the
//! types every other studymap crate speaks:
//!
//! - [`model`] - request/response DTOs and their wire (JSON) shapes
//! - [`error`] - the [`StudymapError`] taxonomy and `Result` alias
//!
//! The wire field names are camelCase (`colorSchema`, `activeRequests`, ...)
//! because the map UI consuming the service expects them that way.

pub mod error;
pub mod model;

pub use error::{Result, StudymapError};
pub use model::{ExternalStatus, ExternalStudy, StudyRequest, StudyResult};
