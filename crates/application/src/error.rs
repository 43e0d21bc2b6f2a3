//! Application error taxonomy.
//!
//! Every failure the request layer can hand a caller falls into one of
//! these buckets. Recovery is only ever attempted for an expired access
//! token; everything else is surfaced immediately.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::ports::TransportError;

/// Errors surfaced by the request layer and the endpoint services.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The token refresh itself failed. The session has been cleared;
    /// callers should treat this as a forced logout.
    #[error("session expired: {message}")]
    AuthExpired {
        /// Description of the refresh failure.
        message: String,
    },

    /// The server answered 403. Never retried. The raw payload is kept so
    /// callers can show whatever the server said.
    #[error("access forbidden")]
    Forbidden {
        /// Server-provided error payload.
        payload: serde_json::Value,
    },

    /// A 4xx carrying a structured field-error payload, surfaced for form
    /// display.
    #[error("validation failed: {message}")]
    Validation {
        /// Summary message.
        message: String,
        /// Per-field error messages.
        fields: BTreeMap<String, Vec<String>>,
    },

    /// Any other non-2xx response, including a 401 on a request that was
    /// already replayed once.
    #[error("HTTP {status}: {message}")]
    Http {
        /// Response status code.
        status: u16,
        /// Server message or reason phrase.
        message: String,
    },

    /// No HTTP response was obtained at all.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A 2xx body that does not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// A request body that cannot be encoded.
    #[error("failed to encode request: {0}")]
    Encode(String),

    /// Client-side rejection before any dispatch (e.g. a non-image upload).
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ApiError {
    /// True when the caller should drop its session and re-authenticate.
    #[must_use]
    pub const fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthExpired { .. })
    }

    /// The HTTP status carried by this error, when there is one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Forbidden { .. } => Some(403),
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for request-layer operations.
pub type ApiResult<T> = Result<T, ApiError>;
