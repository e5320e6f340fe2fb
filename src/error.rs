//! Error types for the listener
//!
//! Catalog-stage and session-stage failures are kept apart so callers can tell
//! "nothing to play yet" from "the engine refused".

use thiserror::Error;

/// Failures while fetching or normalizing the track catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Transport failure or non-success HTTP status
    #[error("Network error: {0}")]
    Network(String),

    /// Response could not be mapped to the track shape
    #[error("Malformed catalog data: {0}")]
    MalformedData(String),
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        CatalogError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::MalformedData(err.to_string())
    }
}

/// Raw failure reported by a playback engine implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{operation} failed: {message}")]
pub struct EngineError {
    pub operation: &'static str,
    pub message: String,
}

impl EngineError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

/// Failures of session actions and engine adapter calls
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Playback engine is not initialized")]
    NotInitialized,

    #[error("Playback engine is already initialized")]
    AlreadyInitialized,

    #[error("Track index {index} is out of range (queue has {len} tracks)")]
    IndexOutOfRange { index: usize, len: usize },

    /// Catalog or engine setup has not finished
    #[error("Session is not ready yet")]
    NotReady,

    #[error("Catalog is empty, nothing to play")]
    EmptyCatalog,

    #[error("Session has been closed")]
    Closed,

    #[error("Engine transport error: {0}")]
    EngineTransport(#[from] EngineError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Convenience Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_error_converts_into_transport_error() {
        let err: SessionError = EngineError::new("play", "device lost").into();
        assert!(matches!(err, SessionError::EngineTransport(_)));
        assert_eq!(err.to_string(), "Engine transport error: play failed: device lost");
    }

    #[test]
    fn json_errors_are_malformed_data() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json");
        let err: CatalogError = parse.unwrap_err().into();
        assert!(matches!(err, CatalogError::MalformedData(_)));
    }

    #[test]
    fn out_of_range_message_names_index_and_length() {
        let err = SessionError::IndexOutOfRange { index: 7, len: 3 };
        assert_eq!(err.to_string(), "Track index 7 is out of range (queue has 3 tracks)");
    }
}
