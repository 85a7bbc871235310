//! Typed errors for the engagement library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

/// Errors that can occur in the engagement pipeline.
#[derive(Debug, Error)]
pub enum EngagementError {
    /// Campaign or product lookup failed in transit. A 404 is not an
    /// error; absence is an `Ok(None)` outcome.
    #[error("context lookup failed: {0}")]
    Context(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Generative-text provider unavailable or failed
    #[error("text generation failed: {0}")]
    Generation(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Storage operation failed
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Publishing to an event stream failed
    #[error("stream publish failed: {0}")]
    Publish(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

/// Errors from the link-shortening provider. Always recovered locally by
/// the resolver's fallback path, never surfaced to pipeline callers.
#[derive(Debug, Error)]
pub enum ShortenError {
    /// HTTP request to the provider failed (timeout, auth, quota)
    #[error("shortener HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Provider answered but without a usable short URL
    #[error("shortener returned unusable response: {0}")]
    BadResponse(String),
}

/// Result type alias for engagement operations.
pub type Result<T> = std::result::Result<T, EngagementError>;
