//! Cardlink Domain - Core business types
//!
//! This crate defines the domain model for the Cardlink API client.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod card;
pub mod credential;
pub mod media;
pub mod request;
pub mod response;
pub mod user;

pub use auth::{AuthSession, DeviceInfo, LoginRequest, RegisterRequest, TokenPair};
pub use card::{Card, CardDraft, SocialLink};
pub use credential::{Credential, CredentialStatus, SessionCookies};
pub use media::UploadedImage;
pub use request::{ApiRequest, Header, HttpMethod, RequestBody};
pub use response::{ApiResponse, Envelope};
pub use user::{Profile, User};
