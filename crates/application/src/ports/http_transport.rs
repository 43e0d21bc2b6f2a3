//! HTTP transport port

use async_trait::async_trait;
use cardlink_domain::{ApiRequest, ApiResponse};
use thiserror::Error;

/// Port for dispatching HTTP requests against the service.
///
/// Implementations resolve the request path against their configured base
/// URL and return whatever the server answered, without interpreting the
/// status code. Classification (including auth failures) belongs to the
/// coordinator.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Executes a request and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns an error only when no HTTP response was obtained at all:
    /// connection failures, timeouts, malformed requests.
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// Failures below the HTTP status level.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The request URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The request body could not be encoded.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// The request exceeded its transport-level timeout.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// Configured timeout in milliseconds.
        timeout_ms: u64,
    },

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Any other transport failure.
    #[error("transport error: {0}")]
    Other(String),
}
