use thiserror::Error;

/// Error taxonomy for the studymap service.
///
/// Only two conditions cross the orchestrator boundary as request failures:
/// [`StudymapError::ExternalUnavailable`] and
/// [`StudymapError::StoreUnavailable`]. Everything else the orchestration
/// layer absorbs into a valid result (unknown studies get a synthetic value,
/// absent lookup keys become an empty pin, malformed timeout hints fall back
/// to the default delay).
#[derive(Error, Debug)]
pub enum StudymapError {
    #[error("External service unavailable: {0}")]
    ExternalUnavailable(String),

    #[error("Backing store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Blocking worker pool is closed")]
    PoolClosed,
}

pub type Result<T> = std::result::Result<T, StudymapError>;
