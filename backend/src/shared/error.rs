use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard error response payload
/// Contains stable machine-readable error code, human-readable message, and request ID
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable machine-readable error code (e.g., "INVALID_VALUE", "NOT_FOUND")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Request ID for tracing and debugging
    pub request_id: String,
}

impl ErrorResponse {
    pub fn new(
        error: impl Into<String>,
        message: impl Into<String>,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            request_id: request_id.into(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Common error codes used across the API and in ingestion logs
pub mod error_codes {
    // Validation errors
    pub const INVALID_VALUE: &str = "INVALID_VALUE";

    // Routing errors
    pub const NOT_FOUND: &str = "NOT_FOUND";

    // Ingestion failures (absorbed into fallback snapshots)
    pub const FETCH_FAILED: &str = "FETCH_FAILED";
    pub const SCHEMA_MISMATCH: &str = "SCHEMA_MISMATCH";
    pub const NO_VALID_DATA: &str = "NO_VALID_DATA";

    // Internal errors
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Reasons real feed data could not be used
///
/// These never reach the caller of `ingest`; the display string becomes the
/// `error` field of the fallback snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    #[error("Failed to fetch sensor feed: {0}")]
    Fetch(String),

    #[error("Sensor feed is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<&'static str>),

    #[error("Sensor feed is empty")]
    EmptyDocument,

    #[error("Sensor feed could not be parsed: {0}")]
    Unparseable(String),

    #[error("No valid data found")]
    NoValidRows,
}

impl IngestError {
    /// Stable code for the failure category (transport, schema, or empty data)
    pub fn error_code(&self) -> &'static str {
        match self {
            IngestError::Fetch(_) => error_codes::FETCH_FAILED,
            IngestError::MissingColumns(_)
            | IngestError::EmptyDocument
            | IngestError::Unparseable(_) => error_codes::SCHEMA_MISMATCH,
            IngestError::NoValidRows => error_codes::NO_VALID_DATA,
        }
    }
}
