//! Authentication request and response payloads.

use serde::{Deserialize, Serialize};

use crate::user::User;

/// Payload for `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Account user name.
    pub user_name: String,
    /// Account password.
    pub password: String,
}

/// Payload for `POST /auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Desired user name.
    pub user_name: String,
    /// Display name.
    pub full_name: String,
    /// Contact email.
    pub email: String,
    /// Account password.
    pub password: String,
    /// Metadata about the device performing the registration.
    #[serde(flatten)]
    pub device: DeviceInfo,
}

/// Device metadata captured at registration time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Human-readable device name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    /// Device category (desktop, mobile, cli, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
    /// Operating system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    /// Browser or client name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,
    /// Public IP address, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

/// Access/refresh token pair returned by the refresh endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Fresh access token.
    #[serde(rename = "accessToken")]
    pub access_token: String,
    /// Fresh refresh token.
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

/// Successful login/register response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    /// Access token for the new session.
    #[serde(rename = "accessToken")]
    pub access_token: String,
    /// Refresh token for the new session.
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    /// The signed-in user.
    pub user: User,
}

impl AuthSession {
    /// The token pair carried by this session.
    #[must_use]
    pub fn token_pair(&self) -> TokenPair {
        TokenPair {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }
}
