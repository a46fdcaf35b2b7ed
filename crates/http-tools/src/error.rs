//! Error types for `mcp-rest-http-tools`.

use thiserror::Error;

/// Failure classes of the REST request pipeline.
///
/// `Config` is fatal at startup. The other variants are scoped to a single call and never affect
/// process state. A non-2xx HTTP status is not an error: it is returned as response data.
#[derive(Error, Debug)]
pub enum RestError {
    /// Missing or invalid environment configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed request descriptor; the request was not attempted.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// DNS, connection, or TLS failure (or the body stream broke mid-read).
    #[error("Network error: {0}")]
    Network(String),

    /// The request exceeded the configured timeout and was abandoned.
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, RestError>;
