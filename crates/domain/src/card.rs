//! Digital business card types.

use serde::{Deserialize, Serialize};

/// A business card attached to a profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    /// Server-assigned identifier.
    pub id: String,
    /// Visual style of the card (e.g. "modern").
    #[serde(default)]
    pub card_type: String,
    /// Job title shown on the card.
    #[serde(default)]
    pub job: String,
    /// Company name.
    #[serde(default)]
    pub company: String,
    /// Short biography.
    #[serde(default)]
    pub bio: String,
    /// Contact phone number.
    #[serde(default)]
    pub phone: String,
    /// Personal or company website.
    #[serde(default)]
    pub web_site: String,
    /// Postal address.
    #[serde(default)]
    pub address: String,
    /// Social media links.
    #[serde(default)]
    pub social: Vec<SocialLink>,
}

/// A social media link shown on a card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLink {
    /// Platform name (e.g. "instagram").
    pub platform: String,
    /// Icon URL for the platform.
    #[serde(default)]
    pub icon: String,
    /// Link target.
    pub url: String,
}

/// Create/update payload for a card: every field except the id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardDraft {
    /// Visual style of the card.
    pub card_type: String,
    /// Job title.
    pub job: String,
    /// Company name.
    #[serde(default)]
    pub company: String,
    /// Short biography.
    #[serde(default)]
    pub bio: String,
    /// Contact phone number.
    #[serde(default)]
    pub phone: String,
    /// Personal or company website.
    #[serde(default)]
    pub web_site: String,
    /// Postal address.
    #[serde(default)]
    pub address: String,
    /// Social media links.
    #[serde(default)]
    pub social: Vec<SocialLink>,
}
