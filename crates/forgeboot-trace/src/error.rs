//! Error types for request tracing

use forgeboot_core::ConfigError;
use thiserror::Error;

/// Errors raised at the fallible edges of request tracing.
///
/// The context slot operations themselves never fail; only adopting an
/// external identifier, building settings and installing the logger can.
#[derive(Error, Debug)]
pub enum TraceError {
    /// An externally supplied request identifier was rejected
    #[error("Invalid request id: {0}")]
    InvalidRequestId(String),

    /// Trace settings could not be built from the bound properties
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The global log subscriber could not be installed
    #[error("Logging initialization failed: {0}")]
    Logging(String),
}

impl TraceError {
    /// Create an invalid request id error
    pub fn invalid_request_id(reason: impl Into<String>) -> Self {
        TraceError::InvalidRequestId(reason.into())
    }
}

/// Result type alias for tracing operations
pub type Result<T> = std::result::Result<T, TraceError>;
