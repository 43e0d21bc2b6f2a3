//! Credential persistence port

use async_trait::async_trait;
use cardlink_domain::SessionCookies;
use thiserror::Error;

/// Port for persisting the session's named cookie values between runs.
///
/// The credential store writes through this port on every token change and
/// reads from it once, during hydration.
#[async_trait]
pub trait CredentialCache: Send + Sync {
    /// Loads the persisted cookie values. Missing state is an empty set,
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store exists but cannot be read.
    async fn load(&self) -> Result<SessionCookies, CacheError>;

    /// Persists the given cookie values, replacing whatever was stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the values cannot be written.
    async fn store(&self, cookies: &SessionCookies) -> Result<(), CacheError>;

    /// Removes all persisted values.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be cleared.
    async fn clear(&self) -> Result<(), CacheError>;
}

/// Failures of the credential cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Underlying I/O failure.
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted state could not be (de)serialized.
    #[error("cache serialization error: {0}")]
    Serialization(String),
}
