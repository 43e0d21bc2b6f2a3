//! Authentication endpoints.

use std::sync::Arc;

use cardlink_domain::{ApiRequest, AuthSession, LoginRequest, RegisterRequest, RequestBody};

use crate::coordinator::RequestCoordinator;
use crate::error::{ApiError, ApiResult};

/// Register, login and logout.
#[derive(Debug, Clone)]
pub struct AuthApi {
    coordinator: Arc<RequestCoordinator>,
}

impl AuthApi {
    /// Creates the service over a shared coordinator.
    #[must_use]
    pub const fn new(coordinator: Arc<RequestCoordinator>) -> Self {
        Self { coordinator }
    }

    /// Creates an account and signs it in; the returned tokens are stored.
    ///
    /// # Errors
    ///
    /// Surfaces validation failures (taken user name, weak password, ...)
    /// and any transport error.
    pub async fn register(&self, payload: &RegisterRequest) -> ApiResult<AuthSession> {
        self.authenticate("/auth/register", RequestBody::json(payload)).await
    }

    /// Signs in with user name and password; the returned tokens are stored.
    ///
    /// # Errors
    ///
    /// Surfaces bad-credential and transport errors.
    pub async fn login(&self, payload: &LoginRequest) -> ApiResult<AuthSession> {
        self.authenticate("/auth/login", RequestBody::json(payload)).await
    }

    /// Signs out. The local session is cleared even when the server call
    /// fails; the server outcome is still reported.
    ///
    /// # Errors
    ///
    /// Returns the server-side failure, if any, after the local clear.
    pub async fn logout(&self) -> ApiResult<()> {
        let result = self
            .coordinator
            .dispatch(ApiRequest::post("/auth/logout", RequestBody::None))
            .await;
        self.coordinator.credentials().logout().await;
        result.map(|_| ())
    }

    async fn authenticate(
        &self,
        path: &str,
        body: Result<RequestBody, serde_json::Error>,
    ) -> ApiResult<AuthSession> {
        let body = body.map_err(|err| ApiError::Encode(err.to_string()))?;
        let response = self.coordinator.dispatch(ApiRequest::post(path, body)).await?;
        let session: AuthSession = super::decode(&response)?;

        self.coordinator
            .credentials()
            .set_tokens(
                session.access_token.clone(),
                session.refresh_token.clone(),
                Some(session.user.id.clone()),
            )
            .await;
        Ok(session)
    }
}
