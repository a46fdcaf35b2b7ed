//! Error types for the MCP REST adapter.

use mcp_rest_http_tools::RestError;
use std::process::ExitCode;
use thiserror::Error;

/// Exit status for configuration errors (`EX_CONFIG` from sysexits).
const EXIT_CONFIG: u8 = 78;

/// Main error type for the adapter.
#[derive(Error, Debug)]
pub enum AdapterError {
    /// Configuration errors (missing/invalid environment values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Startup errors (transport failed to start)
    #[error("Startup error: {0}")]
    Startup(String),

    /// Runtime errors (transport stopped abnormally)
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AdapterError {
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Config(_) => ExitCode::from(EXIT_CONFIG),
            _ => ExitCode::FAILURE,
        }
    }
}

impl From<RestError> for AdapterError {
    fn from(e: RestError) -> Self {
        match e {
            RestError::Config(s) => Self::Config(s),
            other => Self::Runtime(other.to_string()),
        }
    }
}

/// Result type alias for adapter operations.
pub type Result<T> = std::result::Result<T, AdapterError>;
