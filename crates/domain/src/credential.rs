//! Credential state held for the current session.
//!
//! A [`Credential`] is owned exclusively by the credential store in the
//! application layer; everything else reads snapshots of it.

use serde::{Deserialize, Serialize};

/// The current session credential.
///
/// Starts out empty and hydrating; becomes populated after a successful
/// login/register call or after persisted cookies have been loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Bearer token attached to authenticated requests.
    pub access_token: Option<String>,
    /// Token presented to the refresh endpoint when the access token expires.
    pub refresh_token: Option<String>,
    /// Identifier of the signed-in user, when known.
    pub user_id: Option<String>,
    /// True only before the store has attempted to load persisted tokens.
    /// Once false it never reverts to true within a process.
    pub is_hydrating: bool,
}

impl Credential {
    /// An empty credential that has not yet been hydrated.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            access_token: None,
            refresh_token: None,
            user_id: None,
            is_hydrating: true,
        }
    }

    /// True iff an access token is present and hydration has finished.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.access_token.is_some() && !self.is_hydrating
    }

    /// True once the store has attempted to load persisted tokens.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        !self.is_hydrating
    }

    /// Status summary for display purposes.
    #[must_use]
    pub const fn status(&self) -> CredentialStatus {
        if self.is_hydrating {
            CredentialStatus::Hydrating
        } else if self.access_token.is_some() {
            CredentialStatus::Authenticated
        } else {
            CredentialStatus::NotAuthenticated
        }
    }

    /// The persistable portion of this credential.
    #[must_use]
    pub fn to_cookies(&self) -> SessionCookies {
        SessionCookies {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
            user_id: self.user_id.clone(),
        }
    }
}

impl Default for Credential {
    fn default() -> Self {
        Self::empty()
    }
}

/// Session state for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialStatus {
    /// Persisted tokens have not been loaded yet.
    Hydrating,
    /// No access token is held.
    NotAuthenticated,
    /// An access token is held and ready to use.
    Authenticated,
}

impl CredentialStatus {
    /// Get a user-friendly display message.
    #[must_use]
    pub const fn display_message(&self) -> &'static str {
        match self {
            Self::Hydrating => "Loading session...",
            Self::NotAuthenticated => "Not signed in",
            Self::Authenticated => "Signed in",
        }
    }
}

/// The two named cookie values (plus user id) persisted between runs.
///
/// Mirrors what the service keeps in its `access_token` / `refresh_token`
/// cookies: cleared on logout, read back on hydrate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCookies {
    /// Persisted access token, if any.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Persisted refresh token, if any.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Persisted user id, if any.
    #[serde(default)]
    pub user_id: Option<String>,
}

impl SessionCookies {
    /// True when no values are held.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.user_id.is_none()
    }
}
