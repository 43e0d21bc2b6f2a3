//! File-based credential cache.
//!
//! Stands in for the browser's cookie jar: the two named token values
//! (plus the user id) are kept as a small JSON document, read on hydrate
//! and removed on logout.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use cardlink_application::ports::{CacheError, CredentialCache};
use cardlink_domain::SessionCookies;

/// File-backed cookie cache.
///
/// Stores the session as JSON:
/// ```json
/// {
///   "access_token": "eyJ...",
///   "refresh_token": "eyJ...",
///   "user_id": "u1"
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileCookieCache {
    path: PathBuf,
}

impl FileCookieCache {
    /// Creates a cache at the given file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The conventional per-user location, `~/.cardlink/session.json`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".cardlink").join("session.json"))
    }

    /// The file this cache reads and writes.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CredentialCache for FileCookieCache {
    async fn load(&self) -> Result<SessionCookies, CacheError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|err| CacheError::Serialization(err.to_string())),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Ok(SessionCookies::default())
            }
            Err(err) => Err(CacheError::Io(err)),
        }
    }

    async fn store(&self, cookies: &SessionCookies) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_vec_pretty(cookies)
            .map_err(|err| CacheError::Serialization(err.to_string()))?;
        tokio::fs::write(&self.path, content).await?;
        tracing::trace!(path = %self.path.display(), "session persisted");
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(CacheError::Io(err)),
        }
    }
}
