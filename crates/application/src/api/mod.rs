//! Typed endpoint services.
//!
//! Thin wrappers over the coordinator, one per area of the service API.
//! They own payload encoding and response decoding; everything about
//! credentials and retries is the coordinator's business.

mod auth;
mod card;
mod upload;
mod user;

pub use auth::AuthApi;
pub use card::CardApi;
pub use upload::UploadApi;
pub use user::UserApi;

use cardlink_domain::{ApiResponse, Envelope};
use serde::de::DeserializeOwned;

use crate::error::{ApiError, ApiResult};

/// Unwraps the service's `{ "data": ... }` envelope.
fn decode<T: DeserializeOwned>(response: &ApiResponse) -> ApiResult<T> {
    let envelope: Envelope<T> = response
        .json()
        .map_err(|err| ApiError::Decode(err.to_string()))?;
    Ok(envelope.data)
}
