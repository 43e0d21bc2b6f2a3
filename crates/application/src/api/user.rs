//! Profile endpoint.

use std::sync::Arc;

use cardlink_domain::{ApiRequest, Profile};

use crate::coordinator::RequestCoordinator;
use crate::error::ApiResult;

/// The signed-in user's profile.
#[derive(Debug, Clone)]
pub struct UserApi {
    coordinator: Arc<RequestCoordinator>,
}

impl UserApi {
    /// Creates the service over a shared coordinator.
    #[must_use]
    pub const fn new(coordinator: Arc<RequestCoordinator>) -> Self {
        Self { coordinator }
    }

    /// Fetches the profile and attached cards of the current user.
    ///
    /// # Errors
    ///
    /// `AuthExpired` when the session could not be refreshed; any other
    /// classified failure otherwise.
    pub async fn me(&self) -> ApiResult<Profile> {
        let response = self.coordinator.dispatch(ApiRequest::get("/user/me")).await?;
        super::decode(&response)
    }
}
