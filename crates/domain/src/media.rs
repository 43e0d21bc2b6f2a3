//! Upload endpoint payloads.

use serde::{Deserialize, Serialize};

/// Response of `POST /upload/upload-image`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    /// Public URL of the stored image.
    pub url: String,
}
