//! User and profile types.

use serde::{Deserialize, Serialize};

use crate::card::Card;

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned identifier.
    pub id: String,
    /// Unique user name.
    pub user_name: String,
    /// Display name.
    pub full_name: String,
    /// Contact email.
    pub email: String,
    /// Avatar image URL, if set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Profile returned by `GET /user/me`: the user plus their cards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// The account itself.
    #[serde(flatten)]
    pub user: User,
    /// Business cards attached to this profile.
    #[serde(default)]
    pub cards: Vec<Card>,
}
