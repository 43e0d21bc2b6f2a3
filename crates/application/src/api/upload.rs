//! Image upload endpoint.
//!
//! The upload collaborator accepts a single `image` form field and rejects
//! anything that is not an image; we enforce the same rule client-side
//! before touching the network. Unlike the rest of the API, its responses
//! are not wrapped in a `data` envelope.

use std::sync::Arc;

use cardlink_domain::{ApiRequest, RequestBody, UploadedImage};

use crate::coordinator::RequestCoordinator;
use crate::error::{ApiError, ApiResult};

const UPLOAD_PATH: &str = "/upload/upload-image";

/// Upload images for avatars and social icons.
#[derive(Debug, Clone)]
pub struct UploadApi {
    coordinator: Arc<RequestCoordinator>,
}

impl UploadApi {
    /// Creates the service over a shared coordinator.
    #[must_use]
    pub const fn new(coordinator: Arc<RequestCoordinator>) -> Self {
        Self { coordinator }
    }

    /// Uploads one image and returns its public URL.
    ///
    /// # Errors
    ///
    /// `InvalidInput` when the file name does not look like an image;
    /// otherwise the classified server outcome.
    pub async fn upload_image(&self, file_name: &str, data: Vec<u8>) -> ApiResult<UploadedImage> {
        let mime = mime_guess::from_path(file_name)
            .first()
            .ok_or_else(|| ApiError::InvalidInput(format!("unknown file type: {file_name}")))?;
        if mime.type_() != mime::IMAGE {
            return Err(ApiError::InvalidInput(format!(
                "only image files allowed, got {mime}"
            )));
        }

        let body = RequestBody::Multipart {
            field: "image".to_string(),
            file_name: file_name.to_string(),
            content_type: mime.to_string(),
            data,
        };
        let response = self
            .coordinator
            .dispatch(ApiRequest::post(UPLOAD_PATH, body))
            .await?;
        response
            .json()
            .map_err(|err| ApiError::Decode(err.to_string()))
    }
}
