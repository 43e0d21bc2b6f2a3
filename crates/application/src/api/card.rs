//! Card CRUD endpoints.

use std::sync::Arc;

use cardlink_domain::{ApiRequest, Card, CardDraft, RequestBody};

use crate::coordinator::RequestCoordinator;
use crate::error::{ApiError, ApiResult};

/// Create and update business cards.
#[derive(Debug, Clone)]
pub struct CardApi {
    coordinator: Arc<RequestCoordinator>,
}

impl CardApi {
    /// Creates the service over a shared coordinator.
    #[must_use]
    pub const fn new(coordinator: Arc<RequestCoordinator>) -> Self {
        Self { coordinator }
    }

    /// Creates a card on the current profile.
    ///
    /// # Errors
    ///
    /// `Validation` with field messages when the draft is rejected.
    pub async fn create_card(&self, draft: &CardDraft) -> ApiResult<Card> {
        let body = Self::encode(draft)?;
        let response = self
            .coordinator
            .dispatch(ApiRequest::post("/card/create-card", body))
            .await?;
        super::decode(&response)
    }

    /// Replaces the fields of an existing card.
    ///
    /// # Errors
    ///
    /// `Http { status: 404, .. }` when the card does not exist;
    /// `Validation` when the draft is rejected.
    pub async fn update_card(&self, card_id: &str, draft: &CardDraft) -> ApiResult<Card> {
        let body = Self::encode(draft)?;
        let response = self
            .coordinator
            .dispatch(ApiRequest::put(format!("/card/update-card/{card_id}"), body))
            .await?;
        super::decode(&response)
    }

    fn encode(draft: &CardDraft) -> ApiResult<RequestBody> {
        RequestBody::json(draft).map_err(|err| ApiError::Encode(err.to_string()))
    }
}
