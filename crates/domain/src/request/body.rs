//! Request body kinds.

use serde::{Deserialize, Serialize};

/// Body of an outgoing request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum RequestBody {
    /// No body.
    #[default]
    None,
    /// JSON body, sent as `application/json`.
    Json(serde_json::Value),
    /// A single-file multipart form, sent as `multipart/form-data`.
    Multipart {
        /// Form field name (the upload endpoint expects `image`).
        field: String,
        /// File name reported to the server.
        file_name: String,
        /// MIME type of the file.
        content_type: String,
        /// Raw file contents.
        data: Vec<u8>,
    },
}

impl RequestBody {
    /// Builds a JSON body from any serializable payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be represented as JSON.
    pub fn json<T: Serialize>(payload: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::Json(serde_json::to_value(payload)?))
    }

    /// True when there is nothing to send.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}
